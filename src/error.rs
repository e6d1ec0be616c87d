use derive_more::Display;

use crate::graph::VInt;

/// Result alias used across the detection pipeline.
pub type Result<T> = std::result::Result<T, LouvainError>;

/// Failures raised by graph construction, partition updates and the detector.
///
/// `UnknownNode`, `InvalidInput`, `SizeMismatch` and `OutOfRange` are caller
/// errors and go away once the input is fixed. `Invariant` means an internal
/// consistency check failed; the graph that raised it must not be used again.
#[derive(Debug, Display, Clone, PartialEq, Eq)]
pub enum LouvainError {
    #[display(fmt = "node {} does not exist in the graph", _0)]
    UnknownNode(VInt),

    #[display(fmt = "index {} out of range for graph of order {}", index, order)]
    OutOfRange { index: VInt, order: usize },

    #[display(fmt = "partitioning size mismatch: graph order {} != {}", expected, found)]
    SizeMismatch { expected: usize, found: usize },

    #[display(fmt = "invalid input: {}", _0)]
    InvalidInput(String),

    #[display(fmt = "invariant violated: {}", _0)]
    Invariant(String),
}

impl LouvainError {
    /// Whether the failure was caused by the caller's input rather than a bug.
    pub fn is_invalid_input(&self) -> bool {
        !matches!(self, LouvainError::Invariant(_))
    }
}

impl std::error::Error for LouvainError {}
