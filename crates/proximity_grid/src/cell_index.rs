//! Cell-keyed concurrent multi-map.
//!
//! Maps a flattened cell key to the objects classified into that cell. The
//! map is sharded ([`DashMap`]), so rebuild workers merge their per-batch
//! buckets concurrently without a global lock. Queries only take shard read
//! locks.
//!
//! The index is never patched incrementally: every rebuild calls
//! [`CellIndex::reset`] and repopulates it from the full snapshot.

use crate::types::{IndexedObject, ObjectId};
use dashmap::mapref::one::Ref;
use dashmap::DashMap;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Objects gathered by one worker, keyed by cell.
pub(crate) type LocalBuckets<I> = HashMap<usize, Vec<IndexedObject<I>>>;

/// Sharded cell → objects container owned by a grid.
#[derive(Debug)]
pub struct CellIndex<I: ObjectId> {
    cells: DashMap<usize, Vec<IndexedObject<I>>>,
    len: AtomicUsize,
}

impl<I: ObjectId> CellIndex<I> {
    /// Creates an empty index sized for roughly `cell_hint` occupied cells.
    pub fn with_capacity(cell_hint: usize) -> Self {
        Self {
            cells: DashMap::with_capacity(cell_hint),
            len: AtomicUsize::new(0),
        }
    }

    /// Empties the index ahead of a rebuild.
    ///
    /// Buckets that were occupied keep their allocation for the next
    /// population; buckets that were already empty are dropped, so storage
    /// follows the occupied set of the previous tick.
    pub fn reset(&mut self) {
        self.cells.retain(|_, bucket| {
            let was_occupied = !bucket.is_empty();
            bucket.clear();
            was_occupied
        });
        *self.len.get_mut() = 0;
    }

    /// Drains one worker's buckets into the index. Safe to call from many
    /// workers at once.
    ///
    /// Buckets that contributed objects stay in `local`, empty but with their
    /// capacity, for the worker's next batch. Buckets that were already empty
    /// are dropped so `local` tracks the cells its batch touched last time.
    pub(crate) fn merge(&self, local: &mut LocalBuckets<I>) {
        let mut merged = 0;
        local.retain(|&key, objects| {
            if objects.is_empty() {
                return false;
            }
            merged += objects.len();
            self.cells.entry(key).or_default().append(objects);
            true
        });
        self.len.fetch_add(merged, Ordering::Relaxed);
    }

    /// Objects in cell `key`, if the cell has a bucket.
    #[inline]
    pub fn get(&self, key: usize) -> Option<Ref<'_, usize, Vec<IndexedObject<I>>>> {
        self.cells.get(&key)
    }

    /// Total number of indexed objects.
    pub fn len(&self) -> usize {
        self.len.load(Ordering::Relaxed)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of cells holding at least one object.
    pub fn occupied_cells(&self) -> usize {
        self.cells.iter().filter(|bucket| !bucket.is_empty()).count()
    }

    /// Releases spare capacity held by buckets and the shard tables.
    pub fn shrink_to_fit(&mut self) {
        self.cells.retain(|_, bucket| !bucket.is_empty());
        for mut bucket in self.cells.iter_mut() {
            bucket.shrink_to_fit();
        }
        self.cells.shrink_to_fit();
    }

    /// Drops every bucket and its storage.
    pub fn release(&mut self) {
        self.cells.clear();
        self.cells.shrink_to_fit();
        *self.len.get_mut() = 0;
    }

    /// Number of buckets currently allocated, occupied or not.
    pub(crate) fn allocated_buckets(&self) -> usize {
        self.cells.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Vec3;

    fn object(id: u32, slot: usize) -> IndexedObject<u32> {
        IndexedObject {
            id,
            position: Vec3::splat(id as f64),
            slot,
        }
    }

    fn buckets(entries: &[(usize, u32)]) -> LocalBuckets<u32> {
        let mut local = LocalBuckets::new();
        for (slot, &(key, id)) in entries.iter().enumerate() {
            local.entry(key).or_default().push(object(id, slot));
        }
        local
    }

    #[test]
    fn merge_keeps_every_object_in_a_shared_cell() {
        let index = CellIndex::with_capacity(4);
        index.merge(&mut buckets(&[(7, 1), (7, 2)]));
        index.merge(&mut buckets(&[(7, 3), (2, 4)]));

        assert_eq!(index.len(), 4);
        assert_eq!(index.occupied_cells(), 2);
        let mut ids: Vec<u32> = index.get(7).unwrap().iter().map(|o| o.id).collect();
        ids.sort_unstable();
        assert_eq!(ids, vec![1, 2, 3]);
        assert!(index.get(3).is_none());
    }

    #[test]
    fn reset_clears_content_and_keeps_recently_used_buckets() {
        let mut index = CellIndex::with_capacity(4);
        index.merge(&mut buckets(&[(1, 1), (2, 2)]));
        index.reset();

        assert!(index.is_empty());
        assert_eq!(index.occupied_cells(), 0);
        assert_eq!(index.allocated_buckets(), 2);
        assert!(index.get(1).unwrap().is_empty());

        index.merge(&mut buckets(&[(1, 3)]));
        index.reset();
        // Cell 2 stayed empty for a whole rebuild, so its bucket is dropped.
        assert_eq!(index.allocated_buckets(), 1);
    }

    #[test]
    fn concurrent_merges_lose_nothing() {
        let index = CellIndex::<u32>::with_capacity(16);
        std::thread::scope(|scope| {
            for worker in 0..8u32 {
                let index = &index;
                scope.spawn(move || {
                    for round in 0..50u32 {
                        let id = worker * 1000 + round;
                        index.merge(&mut buckets(&[((round % 5) as usize, id)]));
                    }
                });
            }
        });
        assert_eq!(index.len(), 400);
        assert_eq!(index.occupied_cells(), 5);
    }

    #[test]
    fn merge_drains_local_buckets_but_keeps_their_storage() {
        let index = CellIndex::with_capacity(4);
        let mut local = buckets(&[(3, 1), (3, 2), (5, 3)]);
        let capacity = local[&3].capacity();

        index.merge(&mut local);
        assert_eq!(index.len(), 3);
        assert_eq!(local.len(), 2);
        assert!(local.values().all(Vec::is_empty));
        assert_eq!(local[&3].capacity(), capacity);

        // Cell 5 gets nothing this time, so its bucket is dropped.
        local.entry(3).or_default().push(object(4, 0));
        index.merge(&mut local);
        assert_eq!(index.len(), 4);
        assert_eq!(local.keys().copied().collect::<Vec<_>>(), vec![3]);
    }

    #[test]
    fn release_drops_all_buckets() {
        let mut index = CellIndex::with_capacity(4);
        index.merge(&mut buckets(&[(1, 1), (9, 2)]));
        index.release();
        assert!(index.is_empty());
        assert_eq!(index.allocated_buckets(), 0);
    }
}
