//! Built-in seed patterns as cell lists, `y` growing downward.

/// A named set of live cells anchored at `(0, 0)`.
#[derive(Clone, Copy, Debug)]
pub struct Pattern {
    pub name: &'static str,
    pub cells: &'static [(i32, i32)],
}

impl Pattern {
    /// Cells shifted by `(dx, dy)`.
    pub fn translated(&self, dx: i32, dy: i32) -> impl Iterator<Item = (i32, i32)> + '_ {
        self.cells.iter().map(move |&(x, y)| (x + dx, y + dy))
    }
}

pub const BLOCK: Pattern = Pattern {
    name: "block",
    cells: &[(0, 0), (1, 0), (0, 1), (1, 1)],
};

pub const BLINKER: Pattern = Pattern {
    name: "blinker",
    cells: &[(0, 0), (1, 0), (2, 0)],
};

/// Travels `(+1, +1)` every 4 generations.
pub const GLIDER: Pattern = Pattern {
    name: "glider",
    cells: &[(1, 0), (2, 1), (0, 2), (1, 2), (2, 2)],
};

/// Lightweight spaceship, travelling `-x`.
#[rustfmt::skip]
pub const LWSS: Pattern = Pattern {
    name: "lwss",
    cells: &[
        (1, 0), (4, 0),
        (0, 1),
        (0, 2), (4, 2),
        (0, 3), (1, 3), (2, 3), (3, 3),
    ],
};

pub const R_PENTOMINO: Pattern = Pattern {
    name: "r-pentomino",
    cells: &[(1, 0), (2, 0), (0, 1), (1, 1), (1, 2)],
};

/// Gosper glider gun: period 30, emits gliders toward `(+1, +1)`.
#[rustfmt::skip]
pub const GOSPER_GLIDER_GUN: Pattern = Pattern {
    name: "gosper-gun",
    cells: &[
        (24, 0),
        (22, 1), (24, 1),
        (12, 2), (13, 2), (20, 2), (21, 2), (34, 2), (35, 2),
        (11, 3), (15, 3), (20, 3), (21, 3), (34, 3), (35, 3),
        (0, 4), (1, 4), (10, 4), (16, 4), (20, 4), (21, 4),
        (0, 5), (1, 5), (10, 5), (14, 5), (16, 5), (17, 5), (22, 5), (24, 5),
        (10, 6), (16, 6), (24, 6),
        (11, 7), (15, 7),
        (12, 8), (13, 8),
    ],
};

pub const ALL: [Pattern; 6] = [BLOCK, BLINKER, GLIDER, LWSS, R_PENTOMINO, GOSPER_GLIDER_GUN];

pub fn by_name(name: &str) -> Option<Pattern> {
    ALL.iter().copied().find(|p| p.name.eq_ignore_ascii_case(name))
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn cells_are_distinct() {
        for pattern in ALL {
            let unique: HashSet<_> = pattern.cells.iter().collect();
            assert_eq!(unique.len(), pattern.cells.len(), "{}", pattern.name);
        }
        assert_eq!(GOSPER_GLIDER_GUN.cells.len(), 36);
    }

    #[test]
    fn lookup_by_name() {
        assert_eq!(by_name("Glider").map(|p| p.cells.len()), Some(5));
        assert!(by_name("pulsar").is_none());
    }

    #[test]
    fn translated_shifts_every_cell() {
        let moved: Vec<_> = BLINKER.translated(-1, 4).collect();
        assert_eq!(moved, vec![(-1, 4), (0, 4), (1, 4)]);
    }
}
