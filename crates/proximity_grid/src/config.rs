//! Grid configuration.
//!
//! [`GridSettings`] is the serializable, user-facing description of a grid.
//! [`GridConfig`] is the validated, immutable form derived from it once at
//! construction and shared by the rebuild and query paths.

use crate::coords::{self, CellCoord};
use crate::error::{GridError, GridResult};
use crate::types::{Axis, AxisFlags, Vec3, WorldBounds};
use serde::{Deserialize, Serialize};

/// Default number of snapshot entries classified per worker task.
pub const DEFAULT_BATCH_SIZE: usize = 64;

/// Largest cell count accepted on a single axis.
pub const MAX_CELLS_PER_AXIS: f64 = u32::MAX as f64;

fn default_cell_size() -> f64 {
    10.0
}
fn default_expected_objects() -> usize {
    1024
}
fn default_batch_size() -> usize {
    DEFAULT_BATCH_SIZE
}

/// User-facing grid parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridSettings {
    /// Region covered by the grid
    #[serde(default)]
    pub world_bounds: WorldBounds,
    /// Side length of a cell on every enabled axis
    #[serde(default = "default_cell_size")]
    pub cell_size: f64,
    /// Axes collapsed out of the index (2D / 1D grids)
    #[serde(default)]
    pub disabled_axes: AxisFlags,
    /// Sizing hint for the number of tracked objects; not a capacity limit
    #[serde(default = "default_expected_objects")]
    pub expected_objects: usize,
    /// Snapshot entries classified per worker task during rebuild
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// Dedicated rebuild worker count; `None` or `0` uses the global rayon pool
    #[serde(default)]
    pub worker_threads: Option<usize>,
}

impl Default for GridSettings {
    fn default() -> Self {
        Self {
            world_bounds: WorldBounds::default(),
            cell_size: default_cell_size(),
            disabled_axes: AxisFlags::NONE,
            expected_objects: default_expected_objects(),
            batch_size: default_batch_size(),
            worker_threads: None,
        }
    }
}

/// Validated, immutable grid parameters.
///
/// A disabled axis always has dimension 1 and its origin component is 0, so
/// every coordinate on it maps to cell 0.
#[derive(Debug, Clone, PartialEq)]
pub struct GridConfig {
    origin: Vec3,
    cell_size: f64,
    dims: [usize; 3],
    disabled_axes: AxisFlags,
    expected_objects: usize,
    batch_size: usize,
    worker_threads: Option<usize>,
}

impl GridConfig {
    /// Validates `settings` and derives the per-axis cell counts.
    ///
    /// # Errors
    ///
    /// * [`GridError::InvalidCellSize`] - cell size is not a positive finite number
    /// * [`GridError::AllAxesDisabled`] - nothing left to index
    /// * [`GridError::NonFiniteBounds`] / [`GridError::DegenerateBounds`] - an
    ///   enabled axis has a NaN/infinite origin or a non-positive extent
    /// * [`GridError::TooManyCells`] - the cell counts cannot be addressed
    /// * [`GridError::InvalidBatchSize`] - batch size is zero
    pub fn from_settings(settings: &GridSettings) -> GridResult<Self> {
        let cell_size = settings.cell_size;
        if !cell_size.is_finite() || cell_size <= 0.0 {
            return Err(GridError::InvalidCellSize(cell_size));
        }
        if settings.disabled_axes.count() == Axis::ALL.len() {
            return Err(GridError::AllAxesDisabled);
        }
        if settings.batch_size == 0 {
            return Err(GridError::InvalidBatchSize);
        }

        let bounds = &settings.world_bounds;
        let mut origin = Vec3::zero();
        let mut counts = [1.0_f64; 3];

        for axis in Axis::ALL {
            if settings.disabled_axes.get(axis) {
                continue;
            }
            let axis_origin = bounds.origin.get(axis);
            let size = bounds.size.get(axis);
            if !axis_origin.is_finite() || !size.is_finite() {
                return Err(GridError::NonFiniteBounds { axis });
            }
            if size <= 0.0 {
                return Err(GridError::DegenerateBounds { axis, size });
            }
            origin = origin.with(axis, axis_origin);
            counts[axis.index()] = (size / cell_size).ceil().max(1.0);
        }

        let too_many = || GridError::TooManyCells {
            x: counts[0],
            y: counts[1],
            z: counts[2],
        };
        if counts.iter().any(|&n| n > MAX_CELLS_PER_AXIS) {
            return Err(too_many());
        }
        let dims = [counts[0] as usize, counts[1] as usize, counts[2] as usize];
        dims[0]
            .checked_mul(dims[1])
            .and_then(|xy| xy.checked_mul(dims[2]))
            .ok_or_else(too_many)?;

        Ok(Self {
            origin,
            cell_size,
            dims,
            disabled_axes: settings.disabled_axes,
            expected_objects: settings.expected_objects,
            batch_size: settings.batch_size,
            worker_threads: settings.worker_threads.filter(|&n| n > 0),
        })
    }

    /// Minimum corner of the grid (0 on disabled axes).
    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    /// Cell counts along x, y and z.
    pub fn dims(&self) -> [usize; 3] {
        self.dims
    }

    /// Total number of addressable cells.
    pub fn total_cells(&self) -> usize {
        self.dims[0] * self.dims[1] * self.dims[2]
    }

    pub fn disabled_axes(&self) -> AxisFlags {
        self.disabled_axes
    }

    #[inline]
    pub fn is_axis_disabled(&self, axis: Axis) -> bool {
        self.disabled_axes.get(axis)
    }

    pub fn expected_objects(&self) -> usize {
        self.expected_objects
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn worker_threads(&self) -> Option<usize> {
        self.worker_threads
    }

    /// Cell coordinate of `position`, clamped into the grid.
    #[inline]
    pub fn clamped_cell(&self, position: Vec3) -> CellCoord {
        coords::world_to_cell(position, self).clamp_to(self.dims)
    }

    /// Flattened key of the cell `position` is indexed under.
    #[inline]
    pub fn cell_key(&self, position: Vec3) -> usize {
        coords::flatten_cell_index(self.clamped_cell(position), self.dims)
    }
}

/// Fluent builder for [`GridConfig`].
///
/// # Examples
///
/// ```rust
/// use proximity_grid::{Axis, GridConfigBuilder, Vec3};
///
/// let config = GridConfigBuilder::new()
///     .with_world_bounds(Vec3::zero(), Vec3::new(512.0, 64.0, 512.0))
///     .with_cell_size(16.0)
///     .disable_axis(Axis::Y)
///     .build()?;
/// assert_eq!(config.dims(), [32, 1, 32]);
/// # Ok::<(), proximity_grid::GridError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct GridConfigBuilder {
    settings: GridSettings,
}

impl GridConfigBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from existing settings.
    pub fn from_settings(settings: GridSettings) -> Self {
        Self { settings }
    }

    /// Sets the indexed region from its minimum corner and size.
    pub fn with_world_bounds(mut self, origin: Vec3, size: Vec3) -> Self {
        self.settings.world_bounds = WorldBounds::new(origin, size);
        self
    }

    pub fn with_cell_size(mut self, cell_size: f64) -> Self {
        self.settings.cell_size = cell_size;
        self
    }

    /// Collapses `axis` out of the grid.
    pub fn disable_axis(mut self, axis: Axis) -> Self {
        self.settings.disabled_axes = self.settings.disabled_axes.with(axis, true);
        self
    }

    pub fn with_disabled_axes(mut self, axes: AxisFlags) -> Self {
        self.settings.disabled_axes = axes;
        self
    }

    pub fn with_expected_objects(mut self, expected_objects: usize) -> Self {
        self.settings.expected_objects = expected_objects;
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.settings.batch_size = batch_size;
        self
    }

    /// Gives the grid its own rebuild pool with `threads` workers.
    pub fn with_worker_threads(mut self, threads: usize) -> Self {
        self.settings.worker_threads = Some(threads);
        self
    }

    /// Returns the accumulated settings without validating them.
    pub fn settings(&self) -> &GridSettings {
        &self.settings
    }

    /// Validates the settings and builds the configuration.
    pub fn build(self) -> GridResult<GridConfig> {
        GridConfig::from_settings(&self.settings)
    }
}
