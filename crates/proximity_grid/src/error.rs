//! Error types for grid construction.
//!
//! Only configuration can fail. Rebuilds skip bad objects individually and
//! queries with degenerate parameters return empty results.

use crate::types::Axis;

/// Errors raised while validating a grid configuration or setting up its
/// worker pool.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GridError {
    #[error("Invalid cell size: {0} (must be finite and greater than zero)")]
    InvalidCellSize(f64),

    #[error("World bounds are not finite on the {axis} axis")]
    NonFiniteBounds { axis: Axis },

    #[error("Degenerate world bounds: {axis} extent is {size}, must be greater than zero")]
    DegenerateBounds { axis: Axis, size: f64 },

    #[error("All axes are disabled; at least one axis must stay indexed")]
    AllAxesDisabled,

    #[error("Grid of {x}x{y}x{z} cells exceeds the addressable cell count")]
    TooManyCells { x: f64, y: f64, z: f64 },

    #[error("Rebuild batch size must be greater than zero")]
    InvalidBatchSize,

    #[error("Worker pool error: {0}")]
    WorkerPool(String),
}

/// Convenience alias used throughout the crate.
pub type GridResult<T> = Result<T, GridError>;
