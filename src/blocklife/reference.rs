//! Brute-force per-cell evaluator.
//!
//! Tracks live cells in a hash set and counts neighbors cell by cell. It
//! honors the same [`Rule`] and [`Boundary`] as the block engine, applied at
//! cell granularity, and serves as the oracle for parity checks.

use std::collections::{HashMap, HashSet};

use super::block::BLOCK_SIZE_I32;
use super::boundary::{Boundary, Extent};
use super::rule::Rule;

#[derive(Clone, Debug)]
pub struct ReferenceLife {
    rule: Rule,
    boundary: Boundary,
    live: HashSet<(i32, i32)>,
    generation: u64,
}

/// Cell-space modulo into the cells covered by a block extent.
fn wrap_cell(extent: &Extent, v: i64) -> i32 {
    let low = extent.low() as i64 * BLOCK_SIZE_I32 as i64;
    let width = extent.width() * BLOCK_SIZE_I32 as i64;
    (low + (v - low).rem_euclid(width)) as i32
}

impl ReferenceLife {
    pub fn new(rule: Rule, boundary: Boundary) -> Self {
        Self {
            rule,
            boundary,
            live: HashSet::new(),
            generation: 0,
        }
    }

    /// Resolve a cell coordinate under the boundary, `None` when off-grid.
    fn resolve(&self, x: i64, y: i64) -> Option<(i32, i32)> {
        match &self.boundary {
            Boundary::Toroidal { x: ex, y: ey } => Some((wrap_cell(ex, x), wrap_cell(ey, y))),
            Boundary::Unbounded | Boundary::Fixed { .. } => {
                let (x, y) = (i32::try_from(x).ok()?, i32::try_from(y).ok()?);
                self.boundary.contains_cell(x, y).then_some((x, y))
            }
        }
    }

    pub fn set(&mut self, x: i32, y: i32) {
        if let Some(cell) = self.resolve(x as i64, y as i64) {
            self.live.insert(cell);
        }
    }

    pub fn get(&self, x: i32, y: i32) -> bool {
        self.resolve(x as i64, y as i64)
            .is_some_and(|cell| self.live.contains(&cell))
    }

    pub fn population(&self) -> u64 {
        self.live.len() as u64
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn step(&mut self) {
        let mut counts: HashMap<(i32, i32), u32> = HashMap::with_capacity(self.live.len() * 8);
        for &(x, y) in &self.live {
            for dy in -1..=1i64 {
                for dx in -1..=1i64 {
                    if dx == 0 && dy == 0 {
                        continue;
                    }
                    if let Some(cell) = self.resolve(x as i64 + dx, y as i64 + dy) {
                        *counts.entry(cell).or_insert(0) += 1;
                    }
                }
            }
        }

        let mut next = HashSet::with_capacity(self.live.len());
        for (&cell, &n) in &counts {
            if self.rule.next_state(self.live.contains(&cell), n) {
                next.insert(cell);
            }
        }
        self.live = next;
        self.generation += 1;
    }

    pub fn step_n(&mut self, n: u64) {
        for _ in 0..n {
            self.step();
        }
    }

    /// Live cells in `(y, x)` order.
    pub fn live_cells(&self) -> Vec<(i32, i32)> {
        let mut cells: Vec<(i32, i32)> = self.live.iter().copied().collect();
        cells.sort_unstable_by_key(|&(x, y)| (y, x));
        cells
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blinker_oscillates() {
        let mut life = ReferenceLife::new(Rule::conway(), Boundary::Unbounded);
        for x in -1..=1 {
            life.set(x, 0);
        }
        life.step();
        assert_eq!(life.live_cells(), vec![(0, -1), (0, 0), (0, 1)]);
        life.step();
        assert_eq!(life.live_cells(), vec![(-1, 0), (0, 0), (1, 0)]);
        assert_eq!(life.generation(), 2);
    }

    #[test]
    fn toroidal_cells_wrap_at_block_extent() {
        // One block wide: cells 0..=7 on each axis.
        let mut life = ReferenceLife::new(Rule::conway(), Boundary::toroidal(0, 0, 0, 0).unwrap());
        life.set(8, -1);
        assert!(life.get(0, 7));
        assert!(life.get(8, -1));
        assert!(life.get(-8, 15));
        assert!(!life.get(9, -1));
        // Vertical blinker straddling the top/bottom seam.
        life.set(3, 0);
        life.set(3, 1);
        life.set(3, 7);
        life.step();
        assert!(life.get(2, 0) && life.get(3, 0) && life.get(4, 0));
    }

    #[test]
    fn fixed_boundary_drops_outside_cells() {
        let mut life = ReferenceLife::new(Rule::conway(), Boundary::fixed(0, 0, 0, 0).unwrap());
        life.set(-1, 0);
        life.set(8, 8);
        assert_eq!(life.population(), 0);
        // A blinker against the left wall loses its off-grid births.
        life.set(0, 3);
        life.set(0, 4);
        life.set(0, 5);
        life.step();
        assert_eq!(life.live_cells(), vec![(0, 4), (1, 4)]);
    }

    #[test]
    fn unbounded_edge_does_not_wrap() {
        let mut life = ReferenceLife::new(Rule::conway(), Boundary::Unbounded);
        for y in -1..=1 {
            life.set(i32::MAX, y);
        }
        life.step();
        // The birth past `i32::MAX` is dropped rather than wrapping to `i32::MIN`.
        assert_eq!(life.live_cells(), vec![(i32::MAX - 1, 0), (i32::MAX, 0)]);
        assert!(!life.get(i32::MIN, 0));
    }
}
