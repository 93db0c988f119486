//! Statistics tracking for the grid.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

/// Snapshot of grid activity, suitable for periodic health reports.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GridStats {
    /// Rebuilds performed since construction
    pub total_rebuilds: u64,
    /// Sphere and box queries answered since construction
    pub total_queries: u64,
    /// Objects indexed by the most recent rebuild
    pub objects_indexed: usize,
    /// Objects rejected by the most recent rebuild (non-finite positions)
    pub objects_skipped_last_rebuild: usize,
    /// Objects rejected across all rebuilds
    pub total_objects_skipped: u64,
    /// Cells holding at least one object
    pub occupied_cells: usize,
    /// Addressable cells in the grid
    pub total_cells: usize,
    /// Wall time of the most recent rebuild in microseconds
    pub last_rebuild_us: u64,
    /// Average objects per occupied cell
    pub avg_objects_per_cell: f32,
}

/// Outcome of a single rebuild.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RebuildSummary {
    /// Objects now present in the index
    pub indexed: usize,
    /// Objects skipped because of non-finite positions
    pub skipped: usize,
    /// Wall time spent rebuilding
    pub elapsed: Duration,
}

/// Lock-free counters updated from `&self` query paths.
#[derive(Debug, Default)]
pub(crate) struct GridCounters {
    rebuilds: AtomicU64,
    queries: AtomicU64,
    last_skipped: AtomicUsize,
    total_skipped: AtomicU64,
    last_rebuild_us: AtomicU64,
}

impl GridCounters {
    pub(crate) fn record_rebuild(&self, summary: &RebuildSummary) {
        self.rebuilds.fetch_add(1, Ordering::Relaxed);
        self.last_skipped.store(summary.skipped, Ordering::Relaxed);
        self.total_skipped
            .fetch_add(summary.skipped as u64, Ordering::Relaxed);
        self.last_rebuild_us
            .store(summary.elapsed.as_micros() as u64, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_query(&self) {
        self.queries.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self, objects_indexed: usize, occupied_cells: usize, total_cells: usize) -> GridStats {
        let avg_objects_per_cell = if occupied_cells > 0 {
            objects_indexed as f32 / occupied_cells as f32
        } else {
            0.0
        };
        GridStats {
            total_rebuilds: self.rebuilds.load(Ordering::Relaxed),
            total_queries: self.queries.load(Ordering::Relaxed),
            objects_indexed,
            objects_skipped_last_rebuild: self.last_skipped.load(Ordering::Relaxed),
            total_objects_skipped: self.total_skipped.load(Ordering::Relaxed),
            occupied_cells,
            total_cells,
            last_rebuild_us: self.last_rebuild_us.load(Ordering::Relaxed),
            avg_objects_per_cell,
        }
    }
}
