//! Error types for engine construction and rule parsing.

use thiserror::Error;

/// Errors that reject an engine configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No rule was supplied to the config.
    #[error("missing rule")]
    MissingRule,

    /// No boundary was supplied to the config.
    #[error("missing boundary")]
    MissingBoundary,

    /// A birth or survival count outside `0..=8`.
    #[error("neighbor count {0} is out of range (expected 0..=8)")]
    NeighborCount(u8),

    /// Boundary extent with `low > high`, or reaching past the blocks
    /// addressable with `i32` cells.
    #[error("invalid boundary extent: [{low}, {high}]")]
    InvalidExtent { low: i32, high: i32 },

    /// The evaluation thread pool could not be created.
    #[error("failed to build thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Errors from parsing rule notation such as `B3/S23`.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RuleParseError {
    #[error("rule string is empty")]
    Empty,

    #[error("expected exactly one '/' separator in {0:?}")]
    Separator(String),

    #[error("unexpected character {0:?} in rule")]
    InvalidChar(char),

    #[error("neighbor count {0} is out of range (expected 0..=8)")]
    CountOutOfRange(u8),

    #[error("cannot mix tagged and untagged sections in {0:?}")]
    MixedNotation(String),

    #[error("missing {0} section")]
    MissingSection(&'static str),
}
