//! Per-generation evaluation, spawn and prune logic.
//!
//! Evaluation reads only `current` words, so it runs over the block slice in
//! parallel chunks once the registry is large enough. Every block produces its
//! next word plus the unregistered neighbor coordinates its new border touches
//! (spawn candidates). Results come back in slice order and are written into
//! `next` sequentially.
//!
//! After commit, a block is pruned when it is empty and no valid registered
//! neighbor holds a live cell. Spawn candidates are merged last, so a block
//! is never created and evaluated in the same pass.

use rayon::prelude::*;

use super::block::{BORDER_MASK, Block, Direction, EMPTY_BLOCK};
use super::boundary::Boundary;
use super::kernel::{CENTER, Neighborhood, advance_block};
use super::lookup::TransitionTable;
use super::registry::BlockRegistry;

/// Blocks per rayon task.
const EVAL_CHUNK: usize = 256;

/// Counters for one generation, reported through `tracing`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StepStats {
    pub evaluated: usize,
    pub spawned: usize,
    pub pruned: usize,
}

/// Where an evaluation pass runs.
#[derive(Clone, Copy)]
pub enum Schedule<'a> {
    Serial,
    Parallel {
        pool: &'a rayon::ThreadPool,
        threshold: usize,
    },
}

/// Current words of `block` and its 8 neighbors. Missing and off-grid
/// neighbors read as [`EMPTY_BLOCK`].
#[inline]
pub fn gather_neighborhood(
    registry: &BlockRegistry,
    boundary: &Boundary,
    block: &Block,
) -> Neighborhood {
    let (x, y) = block.coord();
    let mut words = [0u64; 9];
    for dir in Direction::ALL {
        let (dx, dy) = dir.offset();
        let neighbor = boundary
            .neighbor(x, y, dx, dy)
            .and_then(|(nx, ny)| registry.get(nx, ny))
            .unwrap_or(&EMPTY_BLOCK);
        words[neighborhood_slot(dx, dy)] = neighbor.current;
    }
    words[CENTER] = block.current;
    words
}

#[inline(always)]
fn neighborhood_slot(dx: i32, dy: i32) -> usize {
    ((dy + 1) * 3 + (dx + 1)) as usize
}

/// Push the valid, unregistered neighbors of `(x, y)` whose shared border
/// `bits` touches.
#[inline]
pub fn push_spawn_candidates(
    registry: &BlockRegistry,
    boundary: &Boundary,
    x: i32,
    y: i32,
    bits: u64,
    out: &mut Vec<(i32, i32)>,
) {
    if bits & BORDER_MASK == 0 {
        return;
    }
    for dir in Direction::ALL {
        if bits & dir.border_mask() == 0 {
            continue;
        }
        let (dx, dy) = dir.offset();
        if let Some(coord) = boundary.neighbor(x, y, dx, dy) {
            if !registry.contains(coord.0, coord.1) {
                out.push(coord);
            }
        }
    }
}

/// Whether any valid registered neighbor of `(x, y)` holds a live cell.
#[inline]
pub fn has_live_neighbor(registry: &BlockRegistry, boundary: &Boundary, x: i32, y: i32) -> bool {
    Direction::ALL.iter().any(|dir| {
        let (dx, dy) = dir.offset();
        boundary
            .neighbor(x, y, dx, dy)
            .is_some_and(|(nx, ny)| registry.current_at(nx, ny) != 0)
    })
}

fn evaluate_chunk(
    chunk: &[Block],
    registry: &BlockRegistry,
    boundary: &Boundary,
    table: &TransitionTable,
    next: &mut Vec<u64>,
    spawn: &mut Vec<(i32, i32)>,
) {
    for block in chunk {
        let words = gather_neighborhood(registry, boundary, block);
        let bits = advance_block(&words, table);
        if bits != 0 {
            push_spawn_candidates(registry, boundary, block.x(), block.y(), bits, spawn);
        }
        next.push(bits);
    }
}

/// Next word for every registered block, in slice order, plus spawn
/// candidates (may contain duplicates).
pub fn evaluate_blocks(
    registry: &BlockRegistry,
    boundary: &Boundary,
    table: &TransitionTable,
    schedule: Schedule<'_>,
) -> (Vec<u64>, Vec<(i32, i32)>) {
    let blocks = registry.blocks();
    let mut next = Vec::with_capacity(blocks.len());
    let mut spawn = Vec::new();

    match schedule {
        Schedule::Parallel { pool, threshold } if blocks.len() >= threshold => {
            let results: Vec<(Vec<u64>, Vec<(i32, i32)>)> = pool.install(|| {
                blocks
                    .par_chunks(EVAL_CHUNK)
                    .map(|chunk| {
                        let mut chunk_next = Vec::with_capacity(chunk.len());
                        let mut chunk_spawn = Vec::new();
                        evaluate_chunk(
                            chunk,
                            registry,
                            boundary,
                            table,
                            &mut chunk_next,
                            &mut chunk_spawn,
                        );
                        (chunk_next, chunk_spawn)
                    })
                    .collect()
            });
            for (chunk_next, chunk_spawn) in results {
                next.extend(chunk_next);
                spawn.extend(chunk_spawn);
            }
        }
        _ => evaluate_chunk(blocks, registry, boundary, table, &mut next, &mut spawn),
    }

    debug_assert_eq!(next.len(), blocks.len());
    (next, spawn)
}

/// Coordinates of blocks that are empty and have no live neighbor.
pub fn collect_prunable(
    registry: &BlockRegistry,
    boundary: &Boundary,
    schedule: Schedule<'_>,
) -> Vec<(i32, i32)> {
    let prunable = |block: &Block| {
        block.is_empty() && !has_live_neighbor(registry, boundary, block.x(), block.y())
    };
    let blocks = registry.blocks();
    match schedule {
        Schedule::Parallel { pool, threshold } if blocks.len() >= threshold => {
            pool.install(|| {
                blocks
                    .par_iter()
                    .filter(|block| prunable(block))
                    .map(Block::coord)
                    .collect()
            })
        }
        _ => blocks
            .iter()
            .filter(|block| prunable(block))
            .map(Block::coord)
            .collect(),
    }
}

/// Run one generation over `registry`: evaluate, commit, prune, spawn.
pub fn advance_generation(
    registry: &mut BlockRegistry,
    boundary: &Boundary,
    table: &TransitionTable,
    schedule: Schedule<'_>,
) -> StepStats {
    let mut stats = StepStats {
        evaluated: registry.len(),
        ..StepStats::default()
    };
    if registry.is_empty() {
        return stats;
    }

    let (next, mut spawn) = evaluate_blocks(registry, boundary, table, schedule);
    for (block, bits) in registry.blocks_mut().iter_mut().zip(next) {
        block.next = bits;
        block.commit();
    }

    let prunable = collect_prunable(registry, boundary, schedule);
    for &(x, y) in &prunable {
        if registry.remove(x, y).is_some() {
            tracing::trace!(x, y, "incinerate block");
            stats.pruned += 1;
        }
    }

    if spawn.len() > 1 {
        spawn.sort_unstable();
        spawn.dedup();
    }
    for (x, y) in spawn {
        if registry.ensure(x, y).1 {
            tracing::trace!(x, y, "spawn block");
            stats.spawned += 1;
        }
    }

    stats
}
