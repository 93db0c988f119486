//! The proximity grid: construction, per-tick rebuild and lifecycle.
//!
//! Queries live in [`crate::query`] as a second `impl` block.

use crate::cell_index::{CellIndex, LocalBuckets};
use crate::config::{GridConfig, GridSettings};
use crate::error::{GridError, GridResult};
use crate::stats::{GridCounters, GridStats, RebuildSummary};
use crate::types::{EntityId, IndexedObject, ObjectId, TrackedObject, Vec3};
use rayon::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Uniform grid over a bounded region answering sphere and box membership
/// queries against the most recent snapshot.
///
/// # Lifecycle
///
/// 1. Construct once from a validated [`GridConfig`].
/// 2. Every tick call [`rebuild`](Self::rebuild) with the full set of tracked
///    objects. It takes `&mut self`, so no query can observe a half-built
///    index.
/// 3. Issue any number of queries through `&self`, from as many threads as
///    needed.
/// 4. Tear down with [`dispose`](Self::dispose) or by dropping the grid.
///
/// # Examples
///
/// ```rust
/// use proximity_grid::{GridConfigBuilder, ProximityGrid, TrackedObject, Vec3};
///
/// let config = GridConfigBuilder::new()
///     .with_world_bounds(Vec3::zero(), Vec3::splat(100.0))
///     .with_cell_size(10.0)
///     .build()?;
/// let mut grid = ProximityGrid::new(config)?;
///
/// grid.rebuild(&[
///     TrackedObject::new(1u32, Vec3::new(5.0, 5.0, 5.0)),
///     TrackedObject::new(2u32, Vec3::new(95.0, 95.0, 95.0)),
/// ]);
///
/// let near = grid.query_sphere(Vec3::new(5.0, 5.0, 5.0), 12.0);
/// assert_eq!(near.len(), 1);
/// assert_eq!(near[0].id, 1);
/// # Ok::<(), proximity_grid::GridError>(())
/// ```
#[derive(Debug)]
pub struct ProximityGrid<I: ObjectId = EntityId> {
    pub(crate) config: GridConfig,
    pub(crate) index: CellIndex<I>,
    /// One bucket map per rebuild batch, drained into `index` and kept for
    /// the next tick
    batch_buckets: Vec<LocalBuckets<I>>,
    pool: Option<rayon::ThreadPool>,
    pub(crate) counters: GridCounters,
}

impl<I: ObjectId> ProximityGrid<I> {
    /// Creates an empty grid.
    ///
    /// Builds a dedicated rebuild pool when the configuration asks for a
    /// fixed worker count.
    pub fn new(config: GridConfig) -> GridResult<Self> {
        let pool = match config.worker_threads() {
            Some(threads) => Some(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(threads)
                    .thread_name(|i| format!("grid-rebuild-{i}"))
                    .build()
                    .map_err(|e| GridError::WorkerPool(e.to_string()))?,
            ),
            None => None,
        };

        let cell_hint = config.expected_objects().min(config.total_cells());
        info!(
            "🗺️ Proximity grid ready: {}x{}x{} cells of {} units, disabled axes {:?}",
            config.dims()[0],
            config.dims()[1],
            config.dims()[2],
            config.cell_size(),
            config.disabled_axes()
        );

        Ok(Self {
            index: CellIndex::with_capacity(cell_hint),
            batch_buckets: Vec::new(),
            config,
            pool,
            counters: GridCounters::default(),
        })
    }

    /// Validates `settings` and creates an empty grid.
    pub fn from_settings(settings: &GridSettings) -> GridResult<Self> {
        Self::new(GridConfig::from_settings(settings)?)
    }

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    /// Replaces the entire indexed set with `objects`.
    ///
    /// Disabled-axis components are zeroed, each object is assigned to the
    /// cell containing its position (out-of-bounds positions are pinned to
    /// the nearest edge cell) and the slot is its index in `objects`.
    /// Objects with NaN or infinite coordinates on an enabled axis are
    /// skipped with a warning; the rest are still indexed.
    ///
    /// Classification runs on the rayon pool in batches of
    /// [`GridConfig::batch_size`]. Each batch fills a bucket map owned by the
    /// grid and drains it into the shared index before the call returns; the
    /// maps keep their storage for the next rebuild.
    pub fn rebuild(&mut self, objects: &[TrackedObject<I>]) -> RebuildSummary {
        let started = Instant::now();
        self.index.reset();

        let skipped = AtomicUsize::new(0);
        let batch_size = self.config.batch_size();
        let batch_count = objects.len().div_ceil(batch_size);
        if self.batch_buckets.len() < batch_count {
            self.batch_buckets.resize_with(batch_count, LocalBuckets::default);
        }

        let config = &self.config;
        let index = &self.index;
        let buckets = &mut self.batch_buckets[..batch_count];
        let skipped_ref = &skipped;

        let mut populate = move || {
            buckets
                .par_iter_mut()
                .zip(objects.par_chunks(batch_size))
                .enumerate()
                .for_each(|(batch, (local, chunk))| {
                    let base = batch * batch_size;
                    for (offset, object) in chunk.iter().enumerate() {
                        match classify(config, object, base + offset) {
                            Some((key, indexed)) => local.entry(key).or_default().push(indexed),
                            None => {
                                skipped_ref.fetch_add(1, Ordering::Relaxed);
                            }
                        }
                    }
                    index.merge(local);
                });
        };

        match &self.pool {
            Some(pool) => pool.install(populate),
            None => populate(),
        }

        let summary = RebuildSummary {
            indexed: self.index.len(),
            skipped: skipped.into_inner(),
            elapsed: started.elapsed(),
        };
        self.counters.record_rebuild(&summary);

        debug!(
            indexed = summary.indexed,
            skipped = summary.skipped,
            elapsed_us = summary.elapsed.as_micros() as u64,
            "grid rebuilt"
        );
        if summary.skipped > 0 {
            warn!(
                "⚠️ Rebuild skipped {} of {} objects with non-finite positions",
                summary.skipped,
                objects.len()
            );
        }
        summary
    }

    /// Number of objects indexed by the most recent rebuild.
    pub fn object_count(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Number of cells holding at least one object.
    pub fn occupied_cells(&self) -> usize {
        self.index.occupied_cells()
    }

    /// Key of the cell a position would be indexed under.
    pub fn cell_key_of(&self, position: Vec3) -> usize {
        self.config
            .cell_key(self.config.disabled_axes().project(position))
    }

    /// Gets grid statistics.
    pub fn stats(&self) -> GridStats {
        self.counters.snapshot(
            self.index.len(),
            self.index.occupied_cells(),
            self.config.total_cells(),
        )
    }

    /// Empties the index, keeping storage for the next rebuild.
    pub fn clear(&mut self) {
        self.index.reset();
    }

    /// Returns spare bucket capacity to the allocator, including the
    /// per-batch rebuild buffers.
    pub fn shrink_to_fit(&mut self) {
        self.index.shrink_to_fit();
        self.batch_buckets.clear();
        self.batch_buckets.shrink_to_fit();
    }

    /// Tears the grid down, releasing the index and the rebuild pool.
    pub fn dispose(mut self) {
        let stats = self.stats();
        self.index.release();
        self.batch_buckets = Vec::new();
        info!(
            "🧹 Proximity grid disposed after {} rebuilds and {} queries",
            stats.total_rebuilds, stats.total_queries
        );
    }
}

impl<I: ObjectId> ProximityGrid<I> {
    /// Batch bucket maps held between rebuilds and the object capacity they
    /// retain.
    #[cfg(test)]
    pub(crate) fn batch_buffer_footprint(&self) -> (usize, usize) {
        let capacity = self
            .batch_buckets
            .iter()
            .flat_map(|local| local.values())
            .map(Vec::capacity)
            .sum();
        (self.batch_buckets.len(), capacity)
    }
}

/// Projects, validates and buckets one snapshot entry.
#[inline]
fn classify<I: ObjectId>(
    config: &GridConfig,
    object: &TrackedObject<I>,
    slot: usize,
) -> Option<(usize, IndexedObject<I>)> {
    let position = config.disabled_axes().project(object.position);
    if !position.is_finite() {
        warn!(
            id = ?object.id,
            slot,
            position = ?object.position,
            "skipping object with non-finite position"
        );
        return None;
    }
    let key = config.cell_key(position);
    Some((
        key,
        IndexedObject {
            id: object.id,
            position,
            slot,
        },
    ))
}
