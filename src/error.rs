//! Error types for the suffix array index.

use thiserror::Error;

/// Errors surfaced by index building, querying and the host-facing adapter.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IndexError {
    /// The query kind is not answered by this index.
    #[error("unsupported query: {kind}")]
    UnsupportedQuery { kind: String },

    /// A mutation entrypoint was called on an immutable index.
    #[error("index is read-only: {operation} requires a full rebuild")]
    ImmutabilityViolation { operation: &'static str },

    /// A shard task failed; the whole build is discarded.
    #[error("build failed in shard {shard}: {reason}")]
    BuildFailure { shard: usize, reason: String },

    /// Input does not fit the compact suffix representation.
    #[error("capacity exceeded: {what} (limit {limit})")]
    CapacityExceeded { what: &'static str, limit: u64 },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The worker pool could not be created.
    #[error("worker pool error: {0}")]
    WorkerPool(String),
}

/// Result type for index operations.
pub type Result<T> = std::result::Result<T, IndexError>;

impl IndexError {
    pub(crate) fn unsupported(kind: impl std::fmt::Display) -> Self {
        IndexError::UnsupportedQuery {
            kind: kind.to_string(),
        }
    }

    /// True for errors raised by the build path rather than by a query.
    pub fn is_build_error(&self) -> bool {
        matches!(
            self,
            IndexError::BuildFailure { .. }
                | IndexError::CapacityExceeded { .. }
                | IndexError::WorkerPool(_)
        )
    }
}
