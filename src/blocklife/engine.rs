use std::sync::Arc;

use tracing::{debug, trace};

use super::activity::{Schedule, StepStats, advance_generation, push_spawn_candidates};
use super::block::BLOCK_SIZE_I32;
use super::boundary::Boundary;
use super::error::ConfigError;
use super::lookup::TransitionTable;
use super::registry::BlockRegistry;
use super::rule::Rule;
use super::view::CellView;

/// Minimum registered blocks before a generation is evaluated on the pool.
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 256;

#[inline]
fn physical_core_count() -> usize {
    num_cpus::get_physical().max(1)
}

/// Resolve the thread count from a config, falling back to auto-detect.
fn resolve_thread_count(config: &BlockLifeConfig) -> usize {
    let mut threads = config.thread_count.unwrap_or_else(physical_core_count);
    if let Some(cap) = config.max_threads {
        threads = threads.min(cap);
    }
    threads.max(1)
}

/// Configuration for a BlockLife engine instance.
///
/// `rule` and `boundary` are required; the remaining knobs fall back to
/// auto-tuned defaults when left as `None`.
#[derive(Clone, Debug, Default)]
pub struct BlockLifeConfig {
    pub rule: Option<Rule>,
    pub boundary: Option<Boundary>,
    /// Number of threads for the evaluation pool.
    /// `None` means one per physical core. A count of 1 runs without a pool.
    pub thread_count: Option<usize>,
    /// Hard upper bound on threads regardless of auto-detection.
    pub max_threads: Option<usize>,
    /// Registered-block count at which evaluation goes parallel.
    /// `None` means [`DEFAULT_PARALLEL_THRESHOLD`].
    pub parallel_threshold: Option<usize>,
}

impl BlockLifeConfig {
    pub fn new(rule: Rule, boundary: Boundary) -> Self {
        Self::default().rule(rule).boundary(boundary)
    }

    pub fn rule(mut self, rule: Rule) -> Self {
        self.rule = Some(rule);
        self
    }

    pub fn boundary(mut self, boundary: Boundary) -> Self {
        self.boundary = Some(boundary);
        self
    }

    /// Set an explicit thread count for the evaluation pool.
    pub fn thread_count(mut self, n: usize) -> Self {
        self.thread_count = Some(n.max(1));
        self
    }

    /// Set a hard upper bound on threads.
    pub fn max_threads(mut self, n: usize) -> Self {
        self.max_threads = Some(n.max(1));
        self
    }

    pub fn parallel_threshold(mut self, blocks: usize) -> Self {
        self.parallel_threshold = Some(blocks);
        self
    }
}

/// Sparse Life-like engine over 8x8 bit-packed blocks.
///
/// Only blocks that hold live cells, or border one that does, are
/// registered. Each generation evaluates every registered block through the
/// shared [`TransitionTable`], commits, prunes dead regions and materializes
/// the blocks new border cells reach.
pub struct BlockLife {
    table: Arc<TransitionTable>,
    boundary: Boundary,
    registry: BlockRegistry,
    generation: u64,
    pool: Option<rayon::ThreadPool>,
    parallel_threshold: usize,
    last_stats: StepStats,
}

impl BlockLife {
    /// Single-threaded engine with a freshly built table.
    pub fn new(rule: Rule, boundary: Boundary) -> Self {
        Self::with_table(Arc::new(TransitionTable::new(rule)), boundary)
    }

    /// Single-threaded engine that shares an existing table.
    pub fn with_table(table: Arc<TransitionTable>, boundary: Boundary) -> Self {
        Self {
            table,
            boundary,
            registry: BlockRegistry::new(),
            generation: 0,
            pool: None,
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
            last_stats: StepStats::default(),
        }
    }

    /// Create an engine with explicit configuration.
    pub fn with_config(config: BlockLifeConfig) -> Result<Self, ConfigError> {
        let rule = config.rule.ok_or(ConfigError::MissingRule)?;
        let boundary = config.boundary.ok_or(ConfigError::MissingBoundary)?;
        let threads = resolve_thread_count(&config);
        let pool = if threads > 1 {
            Some(rayon::ThreadPoolBuilder::new().num_threads(threads).build()?)
        } else {
            None
        };
        debug!(%rule, ?boundary, threads, "configured block engine");

        let mut engine = Self::new(rule, boundary);
        engine.pool = pool;
        engine.parallel_threshold = config
            .parallel_threshold
            .unwrap_or(DEFAULT_PARALLEL_THRESHOLD);
        Ok(engine)
    }

    /// Block coordinate and local offset of cell `(x, y)`, or `None` when
    /// the boundary rejects it.
    #[inline]
    fn locate(&self, x: i32, y: i32) -> Option<((i32, i32), (usize, usize))> {
        let bx = x.div_euclid(BLOCK_SIZE_I32);
        let by = y.div_euclid(BLOCK_SIZE_I32);
        if !self.boundary.is_valid_x(bx) || !self.boundary.is_valid_y(by) {
            return None;
        }
        let local = (
            x.rem_euclid(BLOCK_SIZE_I32) as usize,
            y.rem_euclid(BLOCK_SIZE_I32) as usize,
        );
        Some(((self.boundary.wrap_x(bx), self.boundary.wrap_y(by)), local))
    }

    /// Make cell `(x, y)` alive. Cells outside a fixed boundary are ignored;
    /// under a toroidal boundary the cell lands on its wrapped position.
    pub fn set(&mut self, x: i32, y: i32) {
        let Some(((bx, by), (lx, ly))) = self.locate(x, y) else {
            trace!(x, y, "set outside boundary ignored");
            return;
        };

        let (idx, _) = self.registry.ensure(bx, by);
        let block = &mut self.registry.blocks_mut()[idx.index()];
        block.set(lx, ly);
        let current = block.current;

        let mut spawn = Vec::new();
        push_spawn_candidates(&self.registry, &self.boundary, bx, by, current, &mut spawn);
        for (sx, sy) in spawn {
            if self.registry.ensure(sx, sy).1 {
                trace!(x = sx, y = sy, "spawn block");
            }
        }
        trace!(x, y, "set cell");
    }

    pub fn set_cells_alive<I>(&mut self, cells: I)
    where
        I: IntoIterator<Item = (i32, i32)>,
    {
        for (x, y) in cells {
            self.set(x, y);
        }
    }

    /// Whether cell `(x, y)` is alive, resolved the same way as [`set`](Self::set).
    pub fn get(&self, x: i32, y: i32) -> bool {
        self.locate(x, y).is_some_and(|((bx, by), (lx, ly))| {
            self.registry.get(bx, by).is_some_and(|block| block.get(lx, ly))
        })
    }

    /// Drop every block and rewind the generation counter.
    pub fn reset(&mut self) {
        self.registry.clear();
        self.generation = 0;
        self.last_stats = StepStats::default();
    }

    pub fn next_generation(&mut self) {
        let schedule = match &self.pool {
            Some(pool) => Schedule::Parallel {
                pool,
                threshold: self.parallel_threshold,
            },
            None => Schedule::Serial,
        };
        let stats = advance_generation(&mut self.registry, &self.boundary, &self.table, schedule);
        self.generation += 1;
        self.last_stats = stats;
        debug!(
            generation = self.generation,
            evaluated = stats.evaluated,
            spawned = stats.spawned,
            pruned = stats.pruned,
            blocks = self.registry.len(),
            "generation advanced"
        );
    }

    pub fn step_n(&mut self, n: u64) {
        for _ in 0..n {
            self.next_generation();
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn population(&self) -> u64 {
        self.registry.iter().map(|block| block.population() as u64).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.iter().all(|block| block.is_empty())
    }

    /// Registered blocks, including empty border blocks.
    pub fn block_count(&self) -> usize {
        self.registry.len()
    }

    /// Block-granular extent of the live cells as inclusive cell coordinates
    /// `(min_x, min_y, max_x, max_y)`, or `None` when nothing is alive.
    pub fn bounding_box(&self) -> Option<(i32, i32, i32, i32)> {
        let mut live = self.registry.iter().filter(|block| !block.is_empty());
        let first = live.next()?;
        let (mut min_x, mut min_y) = first.coord();
        let (mut max_x, mut max_y) = (min_x, min_y);
        for block in live {
            let (x, y) = block.coord();
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);
        }
        Some((
            min_x * BLOCK_SIZE_I32,
            min_y * BLOCK_SIZE_I32,
            max_x * BLOCK_SIZE_I32 + (BLOCK_SIZE_I32 - 1),
            max_y * BLOCK_SIZE_I32 + (BLOCK_SIZE_I32 - 1),
        ))
    }

    /// Exact extent of the live cells.
    pub fn live_bounds(&self) -> Option<(i32, i32, i32, i32)> {
        let mut min_x = i32::MAX;
        let mut min_y = i32::MAX;
        let mut max_x = i32::MIN;
        let mut max_y = i32::MIN;
        let mut seen = false;

        self.for_each_live(|x, y| {
            seen = true;
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);
        });

        seen.then_some((min_x, min_y, max_x, max_y))
    }

    pub fn for_each_live<F: FnMut(i32, i32)>(&self, mut f: F) {
        for block in self.registry.iter().filter(|block| !block.is_empty()) {
            let (base_x, base_y) = block.origin();
            block.for_each_live(|lx, ly| f(base_x + lx as i32, base_y + ly as i32));
        }
    }

    /// Snapshot of `[min_x, max_x] x [min_y, max_y]`.
    pub fn view(&self, min_x: i32, min_y: i32, max_x: i32, max_y: i32) -> CellView {
        let mut view = CellView::new(min_x, min_y, max_x, max_y);
        if view.is_empty() {
            return view;
        }
        for block in self.registry.iter() {
            if block.is_empty() {
                continue;
            }
            let (base_x, base_y) = block.origin();
            let outside = base_x > max_x
                || base_y > max_y
                || base_x + (BLOCK_SIZE_I32 - 1) < min_x
                || base_y + (BLOCK_SIZE_I32 - 1) < min_y;
            if outside {
                continue;
            }
            block.for_each_live(|lx, ly| view.mark(base_x + lx as i32, base_y + ly as i32));
        }
        view
    }

    pub fn rule(&self) -> Rule {
        self.table.rule()
    }

    pub fn boundary(&self) -> &Boundary {
        &self.boundary
    }

    pub fn table(&self) -> &Arc<TransitionTable> {
        &self.table
    }

    /// Threads available to evaluation; 1 when running without a pool.
    pub fn thread_count(&self) -> usize {
        self.pool
            .as_ref()
            .map_or(1, rayon::ThreadPool::current_num_threads)
    }

    /// Counters from the most recent generation.
    pub fn last_step_stats(&self) -> StepStats {
        self.last_stats
    }

    #[cfg(test)]
    pub(crate) fn registry(&self) -> &BlockRegistry {
        &self.registry
    }
}
