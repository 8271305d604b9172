//! Rectangular snapshots of the grid.

use std::fmt;

/// A `width x height` boolean snapshot, row-major, anchored at `origin`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CellView {
    origin: (i32, i32),
    width: usize,
    height: usize,
    cells: Vec<bool>,
}

impl CellView {
    /// All-dead view covering `[min_x, max_x] x [min_y, max_y]`.
    /// An inverted rectangle yields a zero-sized view.
    pub fn new(min_x: i32, min_y: i32, max_x: i32, max_y: i32) -> Self {
        let span = |lo: i32, hi: i32| (hi as i64 - lo as i64 + 1).max(0) as usize;
        let width = span(min_x, max_x);
        let height = span(min_y, max_y);
        Self {
            origin: (min_x, min_y),
            width,
            height,
            cells: vec![false; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Absolute coordinate of the cell at view position `(0, 0)`.
    pub fn origin(&self) -> (i32, i32) {
        self.origin
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Cell at view position `(col, row)`; out-of-range reads are dead.
    #[inline]
    pub fn get(&self, col: usize, row: usize) -> bool {
        col < self.width && row < self.height && self.cells[row * self.width + col]
    }

    /// Mark the absolute cell `(x, y)` alive if it falls inside the view.
    pub(crate) fn mark(&mut self, x: i32, y: i32) {
        let col = x as i64 - self.origin.0 as i64;
        let row = y as i64 - self.origin.1 as i64;
        if col < 0 || row < 0 || col >= self.width as i64 || row >= self.height as i64 {
            return;
        }
        self.cells[row as usize * self.width + col as usize] = true;
    }

    pub fn rows(&self) -> impl Iterator<Item = &[bool]> {
        // chunks(0) panics, and a zero-width view has no rows.
        self.cells.chunks(self.width.max(1)).take(self.height)
    }

    pub fn live_count(&self) -> usize {
        self.cells.iter().filter(|&&alive| alive).count()
    }
}

impl fmt::Display for CellView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.rows() {
            for &alive in row {
                f.write_str(if alive { "*" } else { "." })?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
