//! Behavioural tests for the proximity grid
//!
//! - Reference scenarios (fixed objects, expected hit sets)
//! - Properties checked against a brute-force scan over random snapshots
//! - Concurrent rebuild/query behaviour




use crate::{GridConfigBuilder, IndexedObject, ProximityGrid, TrackedObject, Vec3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Seeded generator producing lattice points, so failures reproduce from
/// the seed alone.
pub(crate) struct LatticeRng(StdRng);

impl LatticeRng {
    pub(crate) fn new(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }

    /// Multiple of `step` in `[lo, hi]`. Quarter-unit lattices keep distance
    /// arithmetic exact, so boundary hits are reproducible.
    pub(crate) fn lattice(&mut self, lo: f64, hi: f64, step: f64) -> f64 {
        let steps = ((hi - lo) / step) as u64;
        lo + self.0.gen_range(0..=steps) as f64 * step
    }

    pub(crate) fn point(&mut self, lo: f64, hi: f64) -> Vec3 {
        Vec3::new(
            self.lattice(lo, hi, 0.25),
            self.lattice(lo, hi, 0.25),
            self.lattice(lo, hi, 0.25),
        )
    }
}

/// Grid over `[0, 100]^3` with 10-unit cells.
pub(crate) fn cube_100() -> GridConfigBuilder {
    GridConfigBuilder::new()
        .with_world_bounds(Vec3::zero(), Vec3::splat(100.0))
        .with_cell_size(10.0)
}

pub(crate) fn build(builder: GridConfigBuilder, snapshot: &[TrackedObject<u32>]) -> ProximityGrid<u32> {
    let mut grid = ProximityGrid::new(builder.build().expect("valid test config")).expect("grid");
    grid.rebuild(snapshot);
    grid
}

pub(crate) fn ids(hits: &[IndexedObject<u32>]) -> Vec<u32> {
    let mut ids: Vec<u32> = hits.iter().map(|hit| hit.id).collect();
    ids.sort_unstable();
    ids
}
