//! Sparse Life-like cellular automaton engine over 8x8 bit-packed blocks.

pub mod blocklife;
pub use blocklife::{
    BlockLife, BlockLifeConfig, Boundary, CellView, ConfigError, ReferenceLife, Rule,
    RuleParseError, TransitionTable,
};
