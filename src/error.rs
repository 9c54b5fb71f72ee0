//! Error types for clipping operations.

use thiserror::Error;

/// Errors that can occur while executing a clipping operation.
///
/// An errored execute discards all partial output; the engine remains in a
/// cleanable state and may be re-used after `clear`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ClipError {
    /// Coordinate arithmetic overflowed while computing an edge crossing.
    ///
    /// Callers may re-attempt with inputs scaled to a smaller range.
    #[error("coordinate arithmetic overflowed while computing an intersection")]
    ArithmeticOverflow,

    /// An internal sweep invariant was violated (e.g. an output ring ended
    /// the sweep with unpaired edges). This indicates a bug, not bad input.
    #[error("internal invariant violated: {0}")]
    InvariantViolation(&'static str),
}
