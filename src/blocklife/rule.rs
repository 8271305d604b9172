//! Birth/survival rules for Life-like automata.
//!
//! Neighbor counts are stored as 9-bit masks: bit `n` is set when a cell with
//! `n` live neighbors is born (birth mask) or stays alive (survival mask).

use std::fmt;
use std::str::FromStr;

use super::error::{ConfigError, RuleParseError};

type NeighborMask = u16;

const MAX_NEIGHBORS: u8 = 8;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rule {
    birth: NeighborMask,
    survival: NeighborMask,
}

impl Rule {
    /// Build a rule from birth and survival neighbor counts.
    ///
    /// Duplicates are ignored; any count above 8 is rejected.
    pub fn new<B, S>(birth: B, survival: S) -> Result<Self, ConfigError>
    where
        B: IntoIterator<Item = u8>,
        S: IntoIterator<Item = u8>,
    {
        Ok(Self {
            birth: mask_of(birth)?,
            survival: mask_of(survival)?,
        })
    }

    /// Conway's Game of Life, B3/S23.
    pub const fn conway() -> Self {
        Self {
            birth: 1 << 3,
            survival: (1 << 2) | (1 << 3),
        }
    }

    /// HighLife, B36/S23.
    pub const fn highlife() -> Self {
        Self {
            birth: (1 << 3) | (1 << 6),
            survival: (1 << 2) | (1 << 3),
        }
    }

    #[inline(always)]
    pub fn is_birth(&self, neighbors: u32) -> bool {
        (self.birth >> neighbors) & 1 == 1
    }

    #[inline(always)]
    pub fn survives(&self, neighbors: u32) -> bool {
        (self.survival >> neighbors) & 1 == 1
    }

    /// State of a cell after one generation.
    #[inline(always)]
    pub fn next_state(&self, alive: bool, neighbors: u32) -> bool {
        if alive {
            self.survives(neighbors)
        } else {
            self.is_birth(neighbors)
        }
    }

    pub fn birth_counts(&self) -> impl Iterator<Item = u8> + '_ {
        counts_of(self.birth)
    }

    pub fn survival_counts(&self) -> impl Iterator<Item = u8> + '_ {
        counts_of(self.survival)
    }
}

impl Default for Rule {
    fn default() -> Self {
        Self::conway()
    }
}

fn mask_of<I: IntoIterator<Item = u8>>(counts: I) -> Result<NeighborMask, ConfigError> {
    let mut mask = 0;
    for n in counts {
        if n > MAX_NEIGHBORS {
            return Err(ConfigError::NeighborCount(n));
        }
        mask |= 1 << n;
    }
    Ok(mask)
}

fn counts_of(mask: NeighborMask) -> impl Iterator<Item = u8> {
    (0..=MAX_NEIGHBORS).filter(move |n| (mask >> n) & 1 == 1)
}

fn parse_counts(section: &str) -> Result<NeighborMask, RuleParseError> {
    let mut mask = 0;
    for c in section.chars() {
        let n = c.to_digit(10).ok_or(RuleParseError::InvalidChar(c))? as u8;
        if n > MAX_NEIGHBORS {
            return Err(RuleParseError::CountOutOfRange(n));
        }
        mask |= 1 << n;
    }
    Ok(mask)
}

impl FromStr for Rule {
    type Err = RuleParseError;

    /// Accepts `B3/S23` (either order, any case) and the legacy
    /// survival/birth form `23/3`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(RuleParseError::Empty);
        }
        let mut parts = s.split('/');
        let (Some(first), Some(second), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(RuleParseError::Separator(s.to_string()));
        };

        fn tagged(part: &str) -> Option<(char, &str)> {
            let mut chars = part.chars();
            match chars.next().map(|c| c.to_ascii_uppercase()) {
                Some('B') => Some(('B', chars.as_str())),
                Some('S') => Some(('S', chars.as_str())),
                _ => None,
            }
        }

        match (tagged(first), tagged(second)) {
            (Some((a, a_counts)), Some((b, b_counts))) => {
                let (birth, survival) = match (a, b) {
                    ('B', 'S') => (a_counts, b_counts),
                    ('S', 'B') => (b_counts, a_counts),
                    ('B', _) => return Err(RuleParseError::MissingSection("survival")),
                    _ => return Err(RuleParseError::MissingSection("birth")),
                };
                Ok(Self {
                    birth: parse_counts(birth)?,
                    survival: parse_counts(survival)?,
                })
            }
            (None, None) => Ok(Self {
                birth: parse_counts(second)?,
                survival: parse_counts(first)?,
            }),
            _ => Err(RuleParseError::MixedNotation(s.to_string())),
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "B")?;
        for n in self.birth_counts() {
            write!(f, "{n}")?;
        }
        write!(f, "/S")?;
        for n in self.survival_counts() {
            write!(f, "{n}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conway_matches_b3_s23() {
        let rule = Rule::conway();
        assert!(rule.is_birth(3));
        assert!(!rule.is_birth(2));
        assert!(rule.survives(2));
        assert!(rule.survives(3));
        assert!(!rule.survives(4));
        assert_eq!(rule, Rule::new([3], [2, 3]).unwrap());
    }

    #[test]
    fn new_rejects_counts_above_eight() {
        assert!(matches!(
            Rule::new([9], [2]),
            Err(ConfigError::NeighborCount(9))
        ));
    }

    #[test]
    fn parses_standard_and_legacy_notation() {
        assert_eq!("B3/S23".parse::<Rule>().unwrap(), Rule::conway());
        assert_eq!("b3/s23".parse::<Rule>().unwrap(), Rule::conway());
        assert_eq!("S23/B3".parse::<Rule>().unwrap(), Rule::conway());
        assert_eq!("23/3".parse::<Rule>().unwrap(), Rule::conway());
        assert_eq!("B36/S23".parse::<Rule>().unwrap(), Rule::highlife());
        assert_eq!(
            "B/S012345678".parse::<Rule>().unwrap(),
            Rule::new([], 0..=8).unwrap()
        );
    }

    #[test]
    fn parse_errors() {
        assert_eq!("".parse::<Rule>(), Err(RuleParseError::Empty));
        assert_eq!(
            "B3S23".parse::<Rule>(),
            Err(RuleParseError::Separator("B3S23".into()))
        );
        assert_eq!("B9/S23".parse::<Rule>(), Err(RuleParseError::CountOutOfRange(9)));
        assert_eq!("B3/Sx".parse::<Rule>(), Err(RuleParseError::InvalidChar('x')));
        assert_eq!(
            "B3/B23".parse::<Rule>(),
            Err(RuleParseError::MissingSection("survival"))
        );
    }

    #[test]
    fn display_round_trips_through_parse() {
        for text in ["B3/S23", "B36/S23", "B3678/S34678", "B/S"] {
            let rule: Rule = text.parse().unwrap();
            assert_eq!(rule.to_string(), text);
        }
    }
}
