//! Error types for frequency extraction.

use thiserror::Error;

/// Errors surfaced by the extraction engine.
///
/// Only input problems abort a call. Optimizer excursions, iteration caps and
/// degenerate normalisation are absorbed inside the peeling loop and show up
/// in the result quality instead.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// Fewer than two samples were supplied.
    #[error("at least 2 points are required, got {points}")]
    TooFewPoints {
        /// Number of samples received.
        points: usize,
    },

    /// The sample buffer does not match the engine's planned length.
    #[error("engine planned for {expected} points, got {actual}")]
    LengthMismatch {
        /// Length the engine was built for.
        expected: usize,
        /// Length of the buffer passed in.
        actual: usize,
    },

    /// A configuration value is out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Convenience result type for analysis operations.
pub type Result<T> = std::result::Result<T, Error>;
