//! # Proximity Grid
//!
//! Broad-phase proximity index for large populations of moving point
//! entities. Every tick the caller hands the grid a full snapshot of
//! `{id, position}` pairs; the grid buckets them into a uniform cell grid in
//! parallel and then answers "who is near X" queries until the next snapshot.
//!
//! ## Core Features
//!
//! - **Parallel Rebuild**: snapshot classification runs on rayon in fixed-size
//!   batches, merged into a sharded concurrent cell map
//! - **Sphere and Box Queries**: clamped cell-range scan followed by an exact,
//!   inclusive membership test with per-query deduplication
//! - **Axis Collapse**: any one or two axes can be disabled, turning the grid
//!   into a 2D or 1D index without touching the other coordinates
//! - **Deterministic Results**: hits come back in snapshot order regardless
//!   of how the rebuild was scheduled
//! - **No Domain Filtering**: callers map ids back to their own objects and
//!   apply alive/faction/layer checks themselves
//!
//! ## Quick Start
//!
//! ```rust
//! use proximity_grid::{Axis, EntityId, GridConfigBuilder, ProximityGrid, TrackedObject, Vec3};
//!
//! let config = GridConfigBuilder::new()
//!     .with_world_bounds(Vec3::zero(), Vec3::new(1000.0, 50.0, 1000.0))
//!     .with_cell_size(25.0)
//!     .disable_axis(Axis::Y)
//!     .with_expected_objects(10_000)
//!     .build()?;
//! let mut grid: ProximityGrid<EntityId> = ProximityGrid::new(config)?;
//!
//! let hero = EntityId::new();
//! let snapshot = vec![TrackedObject::new(hero, Vec3::new(120.0, 12.0, 80.0))];
//!
//! // Once per tick
//! grid.rebuild(&snapshot);
//!
//! // Any number of read-only queries before the next rebuild
//! let nearby = grid.query_sphere(Vec3::new(100.0, 0.0, 100.0), 40.0);
//! assert_eq!(nearby[0].id, hero);
//! # Ok::<(), proximity_grid::GridError>(())
//! ```

pub mod cell_index;
pub mod config;
pub mod coords;
pub mod error;
pub mod grid;
pub mod query;
pub mod stats;
pub mod types;

#[cfg(test)]
mod tests;

pub use cell_index::CellIndex;
pub use config::{GridConfig, GridConfigBuilder, GridSettings, DEFAULT_BATCH_SIZE};
pub use coords::{flatten_cell_index, world_to_cell, CellCoord, CellRange};
pub use error::{GridError, GridResult};
pub use grid::ProximityGrid;
pub use query::QueryScratch;
pub use stats::{GridStats, RebuildSummary};
pub use types::{Axis, AxisFlags, EntityId, IndexedObject, ObjectId, TrackedObject, Vec3, WorldBounds};
