//! World-to-cell coordinate mapping.
//!
//! The rebuild path and both query paths go through these functions so they
//! agree on the key space. Raw cell coordinates are signed and may fall
//! outside the grid; callers clamp with [`CellCoord::clamp_to`] before
//! flattening.

use crate::config::GridConfig;
use crate::types::{Axis, Vec3};

/// Integer cell coordinate. Unclamped values may be negative or past the
/// last cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CellCoord {
    pub x: i64,
    pub y: i64,
    pub z: i64,
}

impl CellCoord {
    pub const fn new(x: i64, y: i64, z: i64) -> Self {
        Self { x, y, z }
    }

    #[inline]
    pub fn get(&self, axis: Axis) -> i64 {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
            Axis::Z => self.z,
        }
    }

    /// Pins every component into `[0, dims - 1]`.
    #[inline]
    pub fn clamp_to(self, dims: [usize; 3]) -> Self {
        let clamp = |v: i64, n: usize| v.clamp(0, n.saturating_sub(1) as i64);
        Self::new(
            clamp(self.x, dims[0]),
            clamp(self.y, dims[1]),
            clamp(self.z, dims[2]),
        )
    }

    /// True when every component is a valid cell index for `dims`.
    pub fn is_within(&self, dims: [usize; 3]) -> bool {
        Axis::ALL.iter().all(|&axis| {
            let v = self.get(axis);
            v >= 0 && (v as u64) < dims[axis.index()] as u64
        })
    }
}

/// Maps a world position to its (unclamped) cell coordinate.
///
/// `floor((position - origin) / cell_size)` per axis, 0 on disabled axes.
/// Values beyond the `i64` range saturate; NaN maps to 0, so callers should
/// reject non-finite positions first.
#[inline]
pub fn world_to_cell(position: Vec3, config: &GridConfig) -> CellCoord {
    let origin = config.origin();
    let cell_size = config.cell_size();
    let axis_cell = |axis: Axis| -> i64 {
        if config.is_axis_disabled(axis) {
            0
        } else {
            ((position.get(axis) - origin.get(axis)) / cell_size).floor() as i64
        }
    };
    CellCoord::new(axis_cell(Axis::X), axis_cell(Axis::Y), axis_cell(Axis::Z))
}

/// Row-major flattening: `x + nx * (y + ny * z)`.
///
/// `cell` must already be clamped into `dims`.
#[inline]
pub fn flatten_cell_index(cell: CellCoord, dims: [usize; 3]) -> usize {
    debug_assert!(cell.is_within(dims), "unclamped cell {cell:?} for dims {dims:?}");
    cell.x as usize + dims[0] * (cell.y as usize + dims[1] * cell.z as usize)
}

/// Inclusive, clamped block of cells covered by a query region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRange {
    pub min: CellCoord,
    pub max: CellCoord,
}

impl CellRange {
    /// Cells overlapping the box spanned by `min_corner..=max_corner`,
    /// clamped to the grid.
    pub fn covering(min_corner: Vec3, max_corner: Vec3, config: &GridConfig) -> Self {
        Self {
            min: config.clamped_cell(min_corner),
            max: config.clamped_cell(max_corner),
        }
    }

    /// Number of cells in the range.
    pub fn cell_count(&self) -> usize {
        Axis::ALL
            .iter()
            .map(|&axis| (self.max.get(axis) - self.min.get(axis) + 1).max(0) as usize)
            .product()
    }

    /// Flattened keys of every cell in the range, x fastest.
    pub fn keys(&self, dims: [usize; 3]) -> impl Iterator<Item = usize> + '_ {
        (self.min.z..=self.max.z).flat_map(move |z| {
            (self.min.y..=self.max.y).flat_map(move |y| {
                (self.min.x..=self.max.x)
                    .map(move |x| flatten_cell_index(CellCoord::new(x, y, z), dims))
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GridConfigBuilder;

    fn config_100() -> GridConfig {
        GridConfigBuilder::new()
            .with_world_bounds(Vec3::zero(), Vec3::splat(100.0))
            .with_cell_size(10.0)
            .build()
            .unwrap()
    }

    #[test]
    fn world_to_cell_floors_relative_to_origin() {
        let config = GridConfigBuilder::new()
            .with_world_bounds(Vec3::new(-50.0, 0.0, 0.0), Vec3::splat(100.0))
            .with_cell_size(10.0)
            .build()
            .unwrap();
        assert_eq!(world_to_cell(Vec3::new(-50.0, 0.0, 0.0), &config), CellCoord::new(0, 0, 0));
        assert_eq!(world_to_cell(Vec3::new(-41.0, 9.99, 10.0), &config), CellCoord::new(0, 0, 1));
        assert_eq!(world_to_cell(Vec3::new(-51.0, -0.5, 0.0), &config), CellCoord::new(-1, -1, 0));
    }

    #[test]
    fn disabled_axis_always_maps_to_zero() {
        let config = GridConfigBuilder::new()
            .with_world_bounds(Vec3::zero(), Vec3::splat(100.0))
            .with_cell_size(10.0)
            .disable_axis(Axis::Y)
            .build()
            .unwrap();
        assert_eq!(world_to_cell(Vec3::new(15.0, 9000.0, 25.0), &config), CellCoord::new(1, 0, 2));
        assert_eq!(world_to_cell(Vec3::new(15.0, -9000.0, 25.0), &config), CellCoord::new(1, 0, 2));
    }

    #[test]
    fn clamp_pins_to_edge_cells() {
        let dims = [10, 10, 10];
        assert_eq!(CellCoord::new(-100, 5, 42).clamp_to(dims), CellCoord::new(0, 5, 9));
        assert!(CellCoord::new(9, 0, 9).is_within(dims));
        assert!(!CellCoord::new(10, 0, 0).is_within(dims));
        assert!(!CellCoord::new(0, -1, 0).is_within(dims));
    }

    #[test]
    fn huge_coordinates_saturate_instead_of_overflowing() {
        let config = config_100();
        let cell = world_to_cell(Vec3::new(1.0e300, -1.0e300, 5.0), &config);
        assert_eq!(cell.x, i64::MAX);
        assert_eq!(cell.y, i64::MIN);
        assert_eq!(cell.clamp_to(config.dims()), CellCoord::new(9, 0, 0));
    }

    #[test]
    fn flatten_is_row_major() {
        let dims = [4, 3, 2];
        assert_eq!(flatten_cell_index(CellCoord::new(0, 0, 0), dims), 0);
        assert_eq!(flatten_cell_index(CellCoord::new(1, 0, 0), dims), 1);
        assert_eq!(flatten_cell_index(CellCoord::new(0, 1, 0), dims), 4);
        assert_eq!(flatten_cell_index(CellCoord::new(0, 0, 1), dims), 12);
        assert_eq!(flatten_cell_index(CellCoord::new(3, 2, 1), dims), 23);
    }

    #[test]
    fn range_is_clamped_and_inclusive() {
        let config = config_100();
        let range = CellRange::covering(Vec3::splat(-500.0), Vec3::new(15.0, 5.0, 5.0), &config);
        assert_eq!(range.min, CellCoord::new(0, 0, 0));
        assert_eq!(range.max, CellCoord::new(1, 0, 0));
        assert_eq!(range.cell_count(), 2);
        assert_eq!(range.keys(config.dims()).collect::<Vec<_>>(), vec![0, 1]);
    }

    #[test]
    fn range_keys_are_unique() {
        let config = config_100();
        let range = CellRange::covering(Vec3::splat(12.0), Vec3::splat(38.0), &config);
        let mut keys: Vec<usize> = range.keys(config.dims()).collect();
        assert_eq!(keys.len(), range.cell_count());
        assert_eq!(keys.len(), 27);
        keys.sort_unstable();
        keys.dedup();
        assert_eq!(keys.len(), 27);
    }
}
