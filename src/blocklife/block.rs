//! 8x8 bit-packed blocks.
//!
//! A block stores its 64 cells in a permuted order: the grid is split into
//! four 4x4 quadrants, each split into four 2x2 sub-blocks, and every 2x2
//! sub-block occupies four consecutive bits in transition-table core order
//! (top-left, top-right, bottom-left, bottom-right).
//!
//! ```text
//! 00 01 04 05 16 17 20 21
//! 02 03 06 07 18 19 22 23
//! 08 09 12 13 24 25 28 29
//! 10 11 14 15 26 27 30 31
//! 32 33 36 37 48 49 52 53
//! 34 35 38 39 50 51 54 55
//! 40 41 44 45 56 57 60 61
//! 42 43 46 47 58 59 62 63
//! ```
//!
//! Row 0 is the top of the block (smallest y).

use std::fmt;

pub const BLOCK_SIZE: usize = 8;
pub const BLOCK_SIZE_I32: i32 = BLOCK_SIZE as i32;

/// Bit index of local cell `(x, y)` at `SHIFT[x + y * 8]`.
pub const SHIFT: [u8; 64] = build_shift();

const fn build_shift() -> [u8; 64] {
    let mut shift = [0u8; 64];
    let mut y = 0;
    while y < BLOCK_SIZE {
        let mut x = 0;
        while x < BLOCK_SIZE {
            let quadrant = (y / 4) * 2 + x / 4;
            let sub = ((y % 4) / 2) * 2 + (x % 4) / 2;
            let core = (y % 2) * 2 + x % 2;
            shift[x + y * BLOCK_SIZE] = (quadrant * 16 + sub * 4 + core) as u8;
            x += 1;
        }
        y += 1;
    }
    shift
}

/// Local `(x, y)` of bit `b` at `UNSHIFT[b]`, packed as `x + y * 8`.
pub const UNSHIFT: [u8; 64] = build_unshift();

const fn build_unshift() -> [u8; 64] {
    let mut unshift = [0u8; 64];
    let mut i = 0;
    while i < 64 {
        unshift[SHIFT[i] as usize] = i as u8;
        i += 1;
    }
    unshift
}

const fn row_mask(y: usize) -> u64 {
    let mut mask = 0u64;
    let mut x = 0;
    while x < BLOCK_SIZE {
        mask |= 1 << SHIFT[x + y * BLOCK_SIZE];
        x += 1;
    }
    mask
}

const fn column_mask(x: usize) -> u64 {
    let mut mask = 0u64;
    let mut y = 0;
    while y < BLOCK_SIZE {
        mask |= 1 << SHIFT[x + y * BLOCK_SIZE];
        y += 1;
    }
    mask
}

const fn cell_mask(x: usize, y: usize) -> u64 {
    1 << SHIFT[x + y * BLOCK_SIZE]
}

pub const TOP_MASK: u64 = row_mask(0);
pub const BOTTOM_MASK: u64 = row_mask(BLOCK_SIZE - 1);
pub const LEFT_MASK: u64 = column_mask(0);
pub const RIGHT_MASK: u64 = column_mask(BLOCK_SIZE - 1);
pub const TOP_LEFT_MASK: u64 = cell_mask(0, 0);
pub const TOP_RIGHT_MASK: u64 = cell_mask(BLOCK_SIZE - 1, 0);
pub const BOTTOM_LEFT_MASK: u64 = cell_mask(0, BLOCK_SIZE - 1);
pub const BOTTOM_RIGHT_MASK: u64 = cell_mask(BLOCK_SIZE - 1, BLOCK_SIZE - 1);
pub const BORDER_MASK: u64 = TOP_MASK | BOTTOM_MASK | LEFT_MASK | RIGHT_MASK;

/// Position of a block in the registry arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BlockIdx(pub u32);

impl BlockIdx {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// The 8 neighbor directions in block space. `y` grows downward.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum Direction {
    NW = 0, // (x-1, y-1)
    N  = 1, // (x,   y-1)
    NE = 2, // (x+1, y-1)
    W  = 3, // (x-1, y)
    E  = 4, // (x+1, y)
    SW = 5, // (x-1, y+1)
    S  = 6, // (x,   y+1)
    SE = 7, // (x+1, y+1)
}

impl Direction {
    pub const ALL: [Direction; 8] = [
        Direction::NW, Direction::N,  Direction::NE,
        Direction::W,                 Direction::E,
        Direction::SW, Direction::S,  Direction::SE,
    ];

    #[inline]
    pub const fn offset(self) -> (i32, i32) {
        match self {
            Direction::NW => (-1, -1),
            Direction::N  => (0, -1),
            Direction::NE => (1, -1),
            Direction::W  => (-1, 0),
            Direction::E  => (1, 0),
            Direction::SW => (-1, 1),
            Direction::S  => (0, 1),
            Direction::SE => (1, 1),
        }
    }

    /// Cells of a block that touch the neighbor in this direction.
    #[inline]
    pub const fn border_mask(self) -> u64 {
        match self {
            Direction::NW => TOP_LEFT_MASK,
            Direction::N  => TOP_MASK,
            Direction::NE => TOP_RIGHT_MASK,
            Direction::W  => LEFT_MASK,
            Direction::E  => RIGHT_MASK,
            Direction::SW => BOTTOM_LEFT_MASK,
            Direction::S  => BOTTOM_MASK,
            Direction::SE => BOTTOM_RIGHT_MASK,
        }
    }
}

/// An 8x8 cell block with a double-buffered bitboard.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Block {
    x: i32,
    y: i32,
    pub current: u64,
    pub next: u64,
}

/// Stand-in for any neighbor that is not registered or is off-grid.
/// Never registered, never written.
pub const EMPTY_BLOCK: Block = Block {
    x: 0,
    y: 0,
    current: 0,
    next: 0,
};

impl Block {
    pub const fn new(x: i32, y: i32) -> Self {
        Self {
            x,
            y,
            current: 0,
            next: 0,
        }
    }

    /// Block at `(x, y)` holding the grid `view`, indexed `[y][x]`.
    pub fn from_view(x: i32, y: i32, view: &[[bool; BLOCK_SIZE]; BLOCK_SIZE]) -> Self {
        Self {
            current: encode(view),
            ..Self::new(x, y)
        }
    }

    #[inline(always)]
    pub fn x(&self) -> i32 {
        self.x
    }

    #[inline(always)]
    pub fn y(&self) -> i32 {
        self.y
    }

    #[inline(always)]
    pub fn coord(&self) -> (i32, i32) {
        (self.x, self.y)
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.current == 0
    }

    #[inline(always)]
    pub fn population(&self) -> u32 {
        self.current.count_ones()
    }

    #[inline]
    pub fn set(&mut self, local_x: usize, local_y: usize) {
        debug_assert!(local_x < BLOCK_SIZE && local_y < BLOCK_SIZE);
        self.current |= 1 << SHIFT[local_x + local_y * BLOCK_SIZE];
    }

    #[inline]
    pub fn get(&self, local_x: usize, local_y: usize) -> bool {
        debug_assert!(local_x < BLOCK_SIZE && local_y < BLOCK_SIZE);
        (self.current >> SHIFT[local_x + local_y * BLOCK_SIZE]) & 1 == 1
    }

    /// Copy `next` into `current`.
    #[inline(always)]
    pub fn commit(&mut self) {
        self.current = self.next;
    }

    /// Call `f(local_x, local_y)` for every live cell.
    #[inline]
    pub fn for_each_live<F: FnMut(usize, usize)>(&self, mut f: F) {
        let mut bits = self.current;
        while bits != 0 {
            let local = UNSHIFT[bits.trailing_zeros() as usize] as usize;
            f(local % BLOCK_SIZE, local / BLOCK_SIZE);
            bits &= bits - 1;
        }
    }

    /// Decode the current bitboard, indexed `[y][x]`.
    pub fn get_view(&self) -> [[bool; BLOCK_SIZE]; BLOCK_SIZE] {
        decode(self.current)
    }

    /// Absolute cell coordinate of local `(0, 0)`. Blocks stay within
    /// `[MIN_BLOCK, MAX_BLOCK]`, so this never overflows.
    #[inline]
    pub fn origin(&self) -> (i32, i32) {
        (self.x * BLOCK_SIZE_I32, self.y * BLOCK_SIZE_I32)
    }
}

pub fn decode(bits: u64) -> [[bool; BLOCK_SIZE]; BLOCK_SIZE] {
    let mut view = [[false; BLOCK_SIZE]; BLOCK_SIZE];
    for (y, row) in view.iter_mut().enumerate() {
        for (x, cell) in row.iter_mut().enumerate() {
            *cell = (bits >> SHIFT[x + y * BLOCK_SIZE]) & 1 == 1;
        }
    }
    view
}

/// Pack an 8x8 grid (indexed `[y][x]`) into the block bit order.
pub fn encode(view: &[[bool; BLOCK_SIZE]; BLOCK_SIZE]) -> u64 {
    let mut bits = 0u64;
    for (y, row) in view.iter().enumerate() {
        for (x, &alive) in row.iter().enumerate() {
            bits |= (alive as u64) << SHIFT[x + y * BLOCK_SIZE];
        }
    }
    bits
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.get_view() {
            for alive in row {
                f.write_str(if alive { "1" } else { "0" })?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shift_table_matches_documented_layout() {
        #[rustfmt::skip]
        let expected: [u8; 64] = [
            0,  1,  4,  5,  16, 17, 20, 21,
            2,  3,  6,  7,  18, 19, 22, 23,
            8,  9,  12, 13, 24, 25, 28, 29,
            10, 11, 14, 15, 26, 27, 30, 31,
            32, 33, 36, 37, 48, 49, 52, 53,
            34, 35, 38, 39, 50, 51, 54, 55,
            40, 41, 44, 45, 56, 57, 60, 61,
            42, 43, 46, 47, 58, 59, 62, 63,
        ];
        assert_eq!(SHIFT, expected);
    }

    #[test]
    fn shift_table_is_a_permutation() {
        let mut seen = 0u64;
        for &s in SHIFT.iter() {
            seen |= 1 << s;
        }
        assert_eq!(seen, u64::MAX);
    }

    #[test]
    fn unshift_inverts_shift() {
        for (cell, &bit) in SHIFT.iter().enumerate() {
            assert_eq!(UNSHIFT[bit as usize] as usize, cell);
        }
    }

    #[test]
    fn for_each_live_visits_set_cells() {
        let mut block = Block::new(0, 0);
        block.set(6, 1);
        block.set(0, 7);
        let mut seen = Vec::new();
        block.for_each_live(|x, y| seen.push((x, y)));
        seen.sort_unstable();
        assert_eq!(seen, vec![(0, 7), (6, 1)]);
    }

    #[test]
    fn border_masks() {
        assert_eq!(TOP_MASK.count_ones(), 8);
        assert_eq!(LEFT_MASK.count_ones(), 8);
        let bits = |list: &[u32]| list.iter().fold(0u64, |m, &b| m | (1u64 << b));
        assert_eq!(TOP_MASK, bits(&[0, 1, 4, 5, 16, 17, 20, 21]));
        assert_eq!(BOTTOM_MASK, bits(&[42, 43, 46, 47, 58, 59, 62, 63]));
        assert_eq!(LEFT_MASK, bits(&[0, 2, 8, 10, 32, 34, 40, 42]));
        assert_eq!(RIGHT_MASK, bits(&[21, 23, 29, 31, 53, 55, 61, 63]));
        assert_eq!(TOP_LEFT_MASK, bits(&[0]));
        assert_eq!(TOP_RIGHT_MASK, bits(&[21]));
        assert_eq!(BOTTOM_LEFT_MASK, bits(&[42]));
        assert_eq!(BOTTOM_RIGHT_MASK, bits(&[63]));
        assert_eq!(BORDER_MASK.count_ones(), 28);
    }

    #[test]
    fn set_get_and_view_agree() {
        let mut block = Block::new(3, -2);
        block.set(0, 0);
        block.set(7, 3);
        block.set(2, 6);
        assert!(block.get(7, 3));
        assert!(!block.get(3, 7));
        assert_eq!(block.population(), 3);

        let view = block.get_view();
        assert!(view[0][0] && view[3][7] && view[6][2]);
        assert_eq!(view.iter().flatten().filter(|&&c| c).count(), 3);
        assert_eq!(encode(&view), block.current);
        assert_eq!(Block::from_view(3, -2, &view), block);
        assert_eq!(block.origin(), (24, -16));
    }

    #[test]
    fn commit_moves_next_into_current() {
        let mut block = Block::new(0, 0);
        block.set(1, 1);
        block.next = 0;
        block.commit();
        assert!(block.is_empty());
    }

    #[test]
    fn display_prints_rows_top_down() {
        let mut block = Block::new(0, 0);
        block.set(1, 0);
        let text = block.to_string();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("01000000"));
        assert_eq!(lines.next(), Some("00000000"));
        assert_eq!(text.lines().count(), 8);
    }

    #[test]
    fn empty_block_is_empty() {
        assert!(EMPTY_BLOCK.is_empty());
        assert_eq!(EMPTY_BLOCK.next, 0);
    }
}
