//! BlockLife engine internals and public API.

mod activity;
mod block;
mod boundary;
mod engine;
mod error;
mod kernel;
mod lookup;
pub mod patterns;
mod reference;
mod registry;
mod rule;
mod view;

pub use activity::StepStats;
pub use block::{BLOCK_SIZE, Block};
pub use boundary::{Boundary, Extent};
pub use engine::{BlockLife, BlockLifeConfig, DEFAULT_PARALLEL_THRESHOLD};
pub use error::{ConfigError, RuleParseError};
pub use lookup::TransitionTable;
pub use reference::ReferenceLife;
pub use rule::Rule;
pub use view::CellView;
