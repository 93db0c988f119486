//! Sphere and box membership queries.
//!
//! Both queries derive the block of cells overlapped by the query's bounding
//! cube, clamp it to the grid, then run an exact test on every candidate in
//! those cells. Results are deduplicated by slot and returned in slot order,
//! so identical snapshots give identical answers whatever the rebuild
//! scheduling was.

use crate::coords::CellRange;
use crate::grid::ProximityGrid;
use crate::types::{Axis, IndexedObject, ObjectId, Vec3};
use std::collections::HashSet;
use tracing::trace;

/// Reusable buffers for queries.
///
/// Keep one per worker or per system and pass it to the `_into` query
/// variants to avoid allocating on every call.
#[derive(Debug, Clone)]
pub struct QueryScratch<I> {
    results: Vec<IndexedObject<I>>,
    seen: HashSet<usize>,
}

impl<I> QueryScratch<I> {
    pub fn new() -> Self {
        Self {
            results: Vec::new(),
            seen: HashSet::new(),
        }
    }

    /// Pre-sizes the buffers for about `capacity` hits.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            results: Vec::with_capacity(capacity),
            seen: HashSet::with_capacity(capacity),
        }
    }

    /// Hits of the last query run with this scratch.
    pub fn results(&self) -> &[IndexedObject<I>] {
        &self.results
    }

    /// Takes ownership of the last query's hits.
    pub fn into_results(self) -> Vec<IndexedObject<I>> {
        self.results
    }

    fn reset(&mut self) {
        self.results.clear();
        self.seen.clear();
    }
}

impl<I> Default for QueryScratch<I> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I: ObjectId> ProximityGrid<I> {
    /// Objects within `radius` of `center` (inclusive).
    ///
    /// A negative or NaN radius, or a center that is non-finite on an enabled
    /// axis, matches nothing. Disabled-axis components of the center are
    /// ignored.
    pub fn query_sphere(&self, center: Vec3, radius: f64) -> Vec<IndexedObject<I>> {
        let mut scratch = QueryScratch::new();
        self.query_sphere_into(center, radius, &mut scratch);
        scratch.into_results()
    }

    /// [`query_sphere`](Self::query_sphere) writing into caller-owned buffers.
    pub fn query_sphere_into<'s>(
        &self,
        center: Vec3,
        radius: f64,
        scratch: &'s mut QueryScratch<I>,
    ) -> &'s [IndexedObject<I>] {
        scratch.reset();
        self.counters.record_query();
        let center = self.config.disabled_axes().project(center);
        if radius.is_nan() || radius < 0.0 || !center.is_finite() {
            return scratch.results();
        }

        let reach = Vec3::splat(radius);
        let range = CellRange::covering(center - reach, center + reach, &self.config);
        let radius_sq = radius * radius;

        self.scan(range, scratch, |position| {
            within_radius(center, position, radius, radius_sq)
        });
        trace!(
            cells = range.cell_count(),
            hits = scratch.results.len(),
            "sphere query"
        );
        scratch.results()
    }

    /// Objects inside the axis-aligned box `center ± extents` (inclusive).
    ///
    /// Extents are half-sizes. A zero, negative or NaN extent on an enabled
    /// axis matches nothing; extents on disabled axes are ignored.
    pub fn query_box(&self, center: Vec3, extents: Vec3) -> Vec<IndexedObject<I>> {
        let mut scratch = QueryScratch::new();
        self.query_box_into(center, extents, &mut scratch);
        scratch.into_results()
    }

    /// [`query_box`](Self::query_box) writing into caller-owned buffers.
    pub fn query_box_into<'s>(
        &self,
        center: Vec3,
        extents: Vec3,
        scratch: &'s mut QueryScratch<I>,
    ) -> &'s [IndexedObject<I>] {
        scratch.reset();
        self.counters.record_query();
        let disabled = self.config.disabled_axes();
        let center = disabled.project(center);
        if !center.is_finite() || !self.box_extents_usable(extents) {
            return scratch.results();
        }

        let extents = disabled.project(extents);
        let min = center - extents;
        let max = center + extents;
        let range = CellRange::covering(min, max, &self.config);

        self.scan(range, scratch, |p| {
            p.x >= min.x && p.x <= max.x && p.y >= min.y && p.y <= max.y && p.z >= min.z && p.z <= max.z
        });
        trace!(
            cells = range.cell_count(),
            hits = scratch.results.len(),
            "box query"
        );
        scratch.results()
    }

    fn box_extents_usable(&self, extents: Vec3) -> bool {
        Axis::ALL
            .iter()
            .all(|&axis| self.config.is_axis_disabled(axis) || extents.get(axis) > 0.0)
    }

    /// Visits every candidate in `range`, accepting each object at most once.
    fn scan<F>(&self, range: CellRange, scratch: &mut QueryScratch<I>, accepts: F)
    where
        F: Fn(Vec3) -> bool,
    {
        for key in range.keys(self.config.dims()) {
            let Some(bucket) = self.index.get(key) else {
                continue;
            };
            for object in bucket.iter() {
                if scratch.seen.contains(&object.slot) {
                    continue;
                }
                if accepts(object.position) {
                    scratch.seen.insert(object.slot);
                    scratch.results.push(*object);
                }
            }
        }
        scratch.results.sort_unstable_by_key(|object| object.slot);
    }
}

/// Inclusive distance test that stays exact when `radius * radius`
/// overflows or underflows.
#[inline]
fn within_radius(center: Vec3, position: Vec3, radius: f64, radius_sq: f64) -> bool {
    let d = position - center;
    if d.x.abs() > radius || d.y.abs() > radius || d.z.abs() > radius {
        return false;
    }
    if radius_sq.is_normal() || radius == 0.0 {
        return d.x * d.x + d.y * d.y + d.z * d.z <= radius_sq;
    }
    if radius.is_infinite() {
        return true;
    }
    // Each component is within [-1, 1] after scaling.
    let (x, y, z) = (d.x / radius, d.y / radius, d.z / radius);
    x * x + y * y + z * z <= 1.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GridConfigBuilder;
    use crate::types::TrackedObject;

    fn grid_with(objects: &[(u32, Vec3)]) -> ProximityGrid<u32> {
        let config = GridConfigBuilder::new()
            .with_world_bounds(Vec3::zero(), Vec3::splat(100.0))
            .with_cell_size(10.0)
            .build()
            .unwrap();
        let mut grid = ProximityGrid::new(config).unwrap();
        let snapshot: Vec<_> = objects
            .iter()
            .map(|&(id, position)| TrackedObject::new(id, position))
            .collect();
        grid.rebuild(&snapshot);
        grid
    }

    fn flat_grid_with(objects: &[(u32, Vec3)]) -> ProximityGrid<u32> {
        let config = GridConfigBuilder::new()
            .with_world_bounds(Vec3::zero(), Vec3::splat(100.0))
            .with_cell_size(10.0)
            .disable_axis(Axis::Y)
            .build()
            .unwrap();
        let mut grid = ProximityGrid::new(config).unwrap();
        let snapshot: Vec<_> = objects
            .iter()
            .map(|&(id, position)| TrackedObject::new(id, position))
            .collect();
        grid.rebuild(&snapshot);
        grid
    }

    fn ids(hits: &[IndexedObject<u32>]) -> Vec<u32> {
        hits.iter().map(|hit| hit.id).collect()
    }

    #[test]
    fn sphere_boundary_is_inclusive() {
        let grid = grid_with(&[(1, Vec3::new(20.0, 5.0, 5.0)), (2, Vec3::new(20.001, 5.0, 5.0))]);
        let hits = grid.query_sphere(Vec3::new(10.0, 5.0, 5.0), 10.0);
        assert_eq!(ids(&hits), vec![1]);
    }

    #[test]
    fn zero_radius_matches_exact_position_only() {
        let grid = grid_with(&[(1, Vec3::splat(33.0)), (2, Vec3::new(33.0, 33.0, 33.5))]);
        assert_eq!(ids(&grid.query_sphere(Vec3::splat(33.0), 0.0)), vec![1]);
    }

    #[test]
    fn degenerate_sphere_parameters_yield_empty() {
        let grid = grid_with(&[(1, Vec3::splat(50.0))]);
        assert!(grid.query_sphere(Vec3::splat(50.0), -1.0).is_empty());
        assert!(grid.query_sphere(Vec3::splat(50.0), f64::NAN).is_empty());
        assert!(grid.query_sphere(Vec3::new(f64::NAN, 50.0, 50.0), 10.0).is_empty());
    }

    #[test]
    fn huge_radius_covers_everything_once() {
        let grid = grid_with(&[(1, Vec3::splat(1.0)), (2, Vec3::splat(99.0)), (3, Vec3::splat(-500.0))]);
        assert_eq!(ids(&grid.query_sphere(Vec3::splat(50.0), 1.0e6)), vec![1, 2, 3]);
        assert_eq!(ids(&grid.query_sphere(Vec3::splat(50.0), f64::INFINITY)), vec![1, 2, 3]);
    }

    #[test]
    fn huge_finite_radius_does_not_overflow_into_a_hit() {
        let grid = grid_with(&[
            (1, Vec3::splat(50.0)),
            (2, Vec3::new(5.0e154, 50.0, 50.0)),
            (3, Vec3::new(1.0e160, 50.0, 50.0)),
            (4, Vec3::new(8.0e154, 8.0e154, 50.0)),
        ]);
        let center = Vec3::splat(50.0);
        let radius: f64 = 1.0e155;
        assert!((radius * radius).is_infinite());

        assert_eq!(ids(&grid.query_sphere(center, radius)), vec![1, 2]);
    }

    #[test]
    fn tiny_radius_does_not_underflow_into_a_hit() {
        let grid = grid_with(&[
            (1, Vec3::zero()),
            (2, Vec3::new(8.0e-201, 8.0e-201, 0.0)),
            (3, Vec3::new(5.0e-201, 5.0e-201, 0.0)),
        ]);
        let radius = 1.0e-200;
        assert_eq!(radius * radius, 0.0);
        assert_eq!(ids(&grid.query_sphere(Vec3::zero(), radius)), vec![1, 3]);
    }

    #[test]
    fn sphere_center_ignores_non_finite_disabled_axis() {
        let grid = flat_grid_with(&[(1, Vec3::new(5.0, f64::INFINITY, 5.0)), (2, Vec3::splat(50.0))]);
        assert_eq!(grid.object_count(), 2);
        assert_eq!(ids(&grid.query_sphere(Vec3::new(5.0, f64::INFINITY, 5.0), 1.0)), vec![1]);
        assert_eq!(ids(&grid.query_sphere(Vec3::new(5.0, f64::NAN, 5.0), 1.0)), vec![1]);
        // Still rejected on an enabled axis
        assert!(grid.query_sphere(Vec3::new(f64::NAN, 0.0, 5.0), 1.0).is_empty());
    }

    #[test]
    fn box_center_ignores_non_finite_disabled_axis() {
        let grid = flat_grid_with(&[(1, Vec3::new(5.0, f64::INFINITY, 5.0)), (2, Vec3::splat(50.0))]);
        let hits = grid.query_box(Vec3::new(5.0, f64::NAN, 5.0), Vec3::new(1.0, 0.0, 1.0));
        assert_eq!(ids(&hits), vec![1]);
        let hits = grid.query_box(Vec3::new(5.0, f64::NEG_INFINITY, 5.0), Vec3::new(1.0, 0.0, 1.0));
        assert_eq!(ids(&hits), vec![1]);
        assert!(grid
            .query_box(Vec3::new(5.0, 0.0, f64::INFINITY), Vec3::splat(1.0))
            .is_empty());
    }

    #[test]
    fn query_far_outside_grid_is_empty() {
        let grid = grid_with(&[(1, Vec3::splat(1.0)), (2, Vec3::splat(99.0))]);
        assert!(grid.query_sphere(Vec3::splat(5000.0), 10.0).is_empty());
        assert!(grid.query_box(Vec3::splat(-5000.0), Vec3::splat(10.0)).is_empty());
    }

    #[test]
    fn box_boundary_is_inclusive_per_axis() {
        let grid = grid_with(&[
            (1, Vec3::new(40.0, 50.0, 50.0)),
            (2, Vec3::new(60.0, 40.0, 60.0)),
            (3, Vec3::new(60.1, 50.0, 50.0)),
            (4, Vec3::new(50.0, 50.0, 39.9)),
        ]);
        let hits = grid.query_box(Vec3::splat(50.0), Vec3::splat(10.0));
        assert_eq!(ids(&hits), vec![1, 2]);
    }

    #[test]
    fn box_is_not_a_sphere() {
        // Corner of the box lies outside the inscribed sphere.
        let grid = grid_with(&[(1, Vec3::new(59.0, 59.0, 59.0))]);
        assert_eq!(ids(&grid.query_box(Vec3::splat(50.0), Vec3::splat(10.0))), vec![1]);
        assert!(grid.query_sphere(Vec3::splat(50.0), 10.0).is_empty());
    }

    #[test]
    fn degenerate_box_extents_yield_empty() {
        let grid = grid_with(&[(1, Vec3::splat(50.0))]);
        assert!(grid.query_box(Vec3::splat(50.0), Vec3::new(10.0, 0.0, 10.0)).is_empty());
        assert!(grid.query_box(Vec3::splat(50.0), Vec3::new(10.0, -1.0, 10.0)).is_empty());
        assert!(grid.query_box(Vec3::splat(50.0), Vec3::new(f64::NAN, 1.0, 1.0)).is_empty());
    }

    #[test]
    fn scratch_is_reset_between_queries() {
        let grid = grid_with(&[(1, Vec3::splat(10.0)), (2, Vec3::splat(90.0))]);
        let mut scratch = QueryScratch::with_capacity(4);

        let first = ids(grid.query_sphere_into(Vec3::splat(10.0), 1.0, &mut scratch));
        assert_eq!(first, vec![1]);
        let second = ids(grid.query_box_into(Vec3::splat(90.0), Vec3::splat(1.0), &mut scratch));
        assert_eq!(second, vec![2]);
        assert_eq!(ids(scratch.results()), vec![2]);
    }

    #[test]
    fn queries_are_counted() {
        let grid = grid_with(&[(1, Vec3::splat(10.0))]);
        grid.query_sphere(Vec3::splat(10.0), 1.0);
        grid.query_box(Vec3::splat(10.0), Vec3::splat(1.0));
        grid.query_sphere(Vec3::splat(10.0), -1.0);
        assert_eq!(grid.stats().total_queries, 3);
    }
}
