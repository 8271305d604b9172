//! Sparse block registry.
//!
//! Blocks live contiguously in a `Vec` arena; a two-level map
//! (row `y` -> column `x` -> slot) resolves grid coordinates. Removal is a
//! `swap_remove` followed by a fix-up of the moved block's slot, so the arena
//! stays dense and iteration never skips holes.

use std::collections::HashMap;

use super::block::{Block, BlockIdx};

#[derive(Clone, Debug, Default)]
pub struct BlockRegistry {
    blocks: Vec<Block>,
    rows: HashMap<i32, HashMap<i32, BlockIdx>>,
}

impl BlockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Number of rows holding at least one block.
    #[cfg(test)]
    pub(crate) fn row_count(&self) -> usize {
        self.rows.len()
    }

    #[inline]
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    #[inline]
    pub fn blocks_mut(&mut self) -> &mut [Block] {
        &mut self.blocks
    }

    pub fn iter(&self) -> impl Iterator<Item = &Block> {
        self.blocks.iter()
    }

    #[inline]
    pub fn index_of(&self, x: i32, y: i32) -> Option<BlockIdx> {
        self.rows.get(&y)?.get(&x).copied()
    }

    #[inline]
    pub fn contains(&self, x: i32, y: i32) -> bool {
        self.index_of(x, y).is_some()
    }

    #[inline]
    pub fn get(&self, x: i32, y: i32) -> Option<&Block> {
        self.index_of(x, y).map(|idx| &self.blocks[idx.index()])
    }

    #[cfg(test)]
    pub(crate) fn get_mut(&mut self, x: i32, y: i32) -> Option<&mut Block> {
        let idx = self.index_of(x, y)?;
        Some(&mut self.blocks[idx.index()])
    }

    /// Current word of the block at `(x, y)`, or 0 when none is registered.
    #[inline]
    pub fn current_at(&self, x: i32, y: i32) -> u64 {
        self.get(x, y).map_or(0, |block| block.current)
    }

    /// Slot of the block at `(x, y)`, registering an empty one if needed.
    /// The flag is true when the block was created by this call.
    pub fn ensure(&mut self, x: i32, y: i32) -> (BlockIdx, bool) {
        let row = self.rows.entry(y).or_default();
        if let Some(&idx) = row.get(&x) {
            return (idx, false);
        }
        let idx = BlockIdx(self.blocks.len() as u32);
        self.blocks.push(Block::new(x, y));
        row.insert(x, idx);
        (idx, true)
    }

    pub fn remove(&mut self, x: i32, y: i32) -> Option<Block> {
        let row = self.rows.get_mut(&y)?;
        let idx = row.remove(&x)?;
        if row.is_empty() {
            self.rows.remove(&y);
        }

        let removed = self.blocks.swap_remove(idx.index());
        debug_assert_eq!(removed.coord(), (x, y));
        if let Some(moved) = self.blocks.get(idx.index()) {
            let (mx, my) = moved.coord();
            if let Some(slot) = self.rows.get_mut(&my).and_then(|row| row.get_mut(&mx)) {
                *slot = idx;
            }
        }
        Some(removed)
    }

    pub fn clear(&mut self) {
        self.blocks.clear();
        self.rows.clear();
    }

    /// Check that every map entry points at a block with matching coordinates
    /// and that every block is reachable.
    #[cfg(test)]
    pub(crate) fn assert_consistent(&self) {
        let mut mapped = 0;
        for (&y, row) in &self.rows {
            assert!(!row.is_empty(), "row {y} is empty");
            for (&x, &idx) in row {
                assert_eq!(self.blocks[idx.index()].coord(), (x, y));
                mapped += 1;
            }
        }
        assert_eq!(mapped, self.blocks.len());
    }
}
