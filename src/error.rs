//! Error types for pagealloc
//!
//! Provides a unified error type for all allocator operations.
//!
//! Running out of space is not an error: `allocate` reports it as `None`.

use thiserror::Error;

/// Result type alias using AllocError
pub type Result<T> = std::result::Result<T, AllocError>;

/// Unified error type for pagealloc operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AllocError {
    // -------------------------------------------------------------------------
    // Addressing Errors
    // -------------------------------------------------------------------------
    /// The offset (or the byte range starting at it) falls outside the
    /// region the allocator accepts for the requested operation.
    #[error("Offset {offset} out of bounds for buffer of {len} bytes")]
    OutOfBounds { offset: usize, len: usize },

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}
