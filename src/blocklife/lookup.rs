//! Transition table for 4x4 neighborhoods.
//!
//! A 16-bit code packs a 2x2 core together with the 12 cells around it:
//!
//! ```text
//!  4  5  6  7
//!  8  0  1  9
//! 10  2  3 11
//! 12 13 14 15
//! ```
//!
//! Entry `code` holds the next state of the core in bits 0..3 (same core
//! order as the code itself). Upper bits are always zero.

use std::fmt;

use tracing::debug;

use super::rule::Rule;

pub const TABLE_SIZE: usize = 1 << 16;

/// Cell offset of each code bit, relative to the top-left core cell.
#[rustfmt::skip]
pub const CODE_OFFSETS: [(i32, i32); 16] = [
    (0, 0), (1, 0), (0, 1), (1, 1),
    (-1, -1), (0, -1), (1, -1), (2, -1),
    (-1, 0), (2, 0), (-1, 1), (2, 1),
    (-1, 2), (0, 2), (1, 2), (2, 2),
];

/// For each core bit, the code bits of its eight neighbors.
const NEIGHBOR_MASKS: [u16; 4] = build_neighbor_masks();

const fn build_neighbor_masks() -> [u16; 4] {
    let mut masks = [0u16; 4];
    let mut core = 0;
    while core < 4 {
        let (cx, cy) = CODE_OFFSETS[core];
        let mut bit = 0;
        while bit < 16 {
            let (x, y) = CODE_OFFSETS[bit];
            if bit != core && (x - cx).abs() <= 1 && (y - cy).abs() <= 1 {
                masks[core] |= 1 << bit;
            }
            bit += 1;
        }
        core += 1;
    }
    masks
}

fn next_core(rule: &Rule, code: u16) -> u8 {
    let mut out = 0u8;
    for (core, mask) in NEIGHBOR_MASKS.iter().enumerate() {
        let alive = (code >> core) & 1 == 1;
        let neighbors = (code & mask).count_ones();
        if rule.next_state(alive, neighbors) {
            out |= 1 << core;
        }
    }
    out
}

/// Next-core lookup for every possible 4x4 neighborhood under one rule.
///
/// Built once and shared (`Arc`) by every engine that runs the same rule.
pub struct TransitionTable {
    rule: Rule,
    table: Box<[u8]>,
}

impl TransitionTable {
    pub fn new(rule: Rule) -> Self {
        let table: Box<[u8]> = (0..TABLE_SIZE)
            .map(|code| next_core(&rule, code as u16))
            .collect();
        debug_assert_eq!(table.len(), TABLE_SIZE);
        debug!(%rule, entries = TABLE_SIZE, "built transition table");
        Self { rule, table }
    }

    #[inline(always)]
    pub fn lookup(&self, code: u16) -> u8 {
        self.table[code as usize]
    }

    pub fn rule(&self) -> Rule {
        self.rule
    }
}

impl fmt::Debug for TransitionTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransitionTable")
            .field("rule", &self.rule.to_string())
            .field("entries", &self.table.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bits(list: &[u32]) -> u16 {
        list.iter().fold(0u16, |m, &b| m | (1 << b))
    }

    /// Unpack a code into a 4x4 grid indexed `[y][x]`, origin at the top-left
    /// border cell.
    fn grid_of(code: u16) -> [[bool; 4]; 4] {
        let mut grid = [[false; 4]; 4];
        for (bit, &(dx, dy)) in CODE_OFFSETS.iter().enumerate() {
            grid[(dy + 1) as usize][(dx + 1) as usize] = (code >> bit) & 1 == 1;
        }
        grid
    }

    fn expected_output(rule: &Rule, code: u16) -> u8 {
        let grid = grid_of(code);
        let mut out = 0u8;
        for (core, (cx, cy)) in [(1usize, 1usize), (2, 1), (1, 2), (2, 2)].into_iter().enumerate() {
            let mut neighbors = 0;
            for ny in cy - 1..=cy + 1 {
                for nx in cx - 1..=cx + 1 {
                    if (nx, ny) != (cx, cy) && grid[ny][nx] {
                        neighbors += 1;
                    }
                }
            }
            if rule.next_state(grid[cy][cx], neighbors) {
                out |= 1 << core;
            }
        }
        out
    }

    #[test]
    fn neighbor_masks_match_layout() {
        assert_eq!(NEIGHBOR_MASKS[0], bits(&[4, 5, 6, 8, 1, 10, 2, 3]));
        assert_eq!(NEIGHBOR_MASKS[1], bits(&[5, 6, 7, 0, 9, 2, 3, 11]));
        assert_eq!(NEIGHBOR_MASKS[2], bits(&[8, 0, 1, 10, 3, 12, 13, 14]));
        assert_eq!(NEIGHBOR_MASKS[3], bits(&[0, 1, 9, 2, 11, 13, 14, 15]));
    }

    #[test]
    fn code_offsets_cover_the_4x4_window() {
        let mut seen = [[false; 4]; 4];
        for &(dx, dy) in CODE_OFFSETS.iter() {
            let cell = &mut seen[(dy + 1) as usize][(dx + 1) as usize];
            assert!(!*cell, "offset ({dx}, {dy}) repeated");
            *cell = true;
        }
    }

    #[test]
    fn conway_table_matches_reference() {
        let rule = Rule::conway();
        let table = TransitionTable::new(rule);
        for code in 0u16..=u16::MAX {
            let expected = expected_output(&rule, code);
            let got = table.lookup(code);
            assert_eq!(
                got, expected,
                "code {:04x} expected {:x} got {:x}",
                code, expected, got
            );
        }
    }

    #[test]
    fn highlife_table_matches_reference() {
        let rule = Rule::highlife();
        let table = TransitionTable::new(rule);
        for code in (0u16..=u16::MAX).step_by(7) {
            assert_eq!(table.lookup(code), expected_output(&rule, code));
        }
    }

    #[test]
    fn entries_hold_only_core_bits() {
        let table = TransitionTable::new(Rule::conway());
        assert!((0u16..=u16::MAX).all(|code| table.lookup(code) & 0xF0 == 0));
    }

    #[test]
    fn known_neighborhoods() {
        let table = TransitionTable::new(Rule::conway());
        // Empty stays empty.
        assert_eq!(table.lookup(0), 0);
        // A lone core cell dies.
        assert_eq!(table.lookup(bits(&[0])), 0);
        // A full 2x2 core is a still life.
        assert_eq!(table.lookup(bits(&[0, 1, 2, 3])), 0b1111);
        // Three cells in the top border give birth to the top-left and
        // top-right core cells.
        assert_eq!(table.lookup(bits(&[4, 5, 6])), 0b0001);
        assert_eq!(table.lookup(bits(&[5, 6, 7])), 0b0010);
    }
}
