//! # Sample Buffer Pool
//!
//! Reuse cache for 16-bit sample buffers shared by the audio/video
//! processing paths. Repeated same-size-class requests are served from the
//! pool instead of the allocator, keeping the per-frame path allocation
//! free. The backing storage can be dropped under memory pressure and is
//! re-created on demand.

use parking_lot::Mutex;
use tracing::debug;

// Fresh storage starts small; compaction is tried before growing.
const INITIAL_SLOTS: usize = 8;
const GROW_SLOTS: usize = 8;

/// External holder of a sample buffer with a replaceable data slot.
///
/// `take_samples` hands the current buffer (if any) to the caller;
/// `set_samples` installs a replacement.
pub trait SampleHolder {
    fn take_samples(&mut self) -> Option<Vec<i16>>;
    fn set_samples(&mut self, samples: Vec<i16>);
}

/// Reuse cache for `Vec<i16>` sample buffers.
///
/// All operations take `&self` and are safe to call concurrently from the
/// capture/encode and decode/render paths sharing one pool. The pool is a
/// plain value so each stream kind can own an independent instance.
#[derive(Default)]
pub struct SamplePool {
    storage: Mutex<Option<PoolStorage>>,
}

// Slot storage with a live prefix: slots at `idx < len` hold either a
// pooled buffer or a gap left by `allocate`. Gaps are scavenged by
// compaction rather than freed one by one.
struct PoolStorage {
    slots: Vec<Option<Vec<i16>>>,
    len: usize,
}

impl SamplePool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take a buffer with `len() >= min_size` out of the pool, or allocate
    /// a zeroed buffer of exactly `min_size` on a miss.
    ///
    /// First fit: the scan returns the first live buffer that is large
    /// enough, so an oversized buffer may come back.
    pub fn allocate(&self, min_size: usize) -> Vec<i16> {
        let mut guard = self.storage.lock();
        if let Some(storage) = guard.as_mut() {
            for slot in storage.slots[..storage.len].iter_mut() {
                if slot.as_ref().map_or(false, |buf| buf.len() >= min_size) {
                    if let Some(buf) = slot.take() {
                        return buf;
                    }
                }
            }
        }
        vec![0; min_size]
    }

    /// Return a buffer to the pool. `None` is accepted and ignored, so
    /// callers may pass absent buffers freely.
    ///
    /// Re-creates the backing storage if it was released (or never
    /// existed). Returning the exact buffer that is already pooled is a
    /// no-op: the duplicate is dropped instead of being owned twice.
    pub fn deallocate(&self, buffer: Option<Vec<i16>>) {
        let buffer = match buffer {
            Some(buffer) => buffer,
            None => return,
        };

        let mut guard = self.storage.lock();
        let storage = guard.get_or_insert_with(|| {
            debug!(slots = INITIAL_SLOTS, "sample pool storage initialized");
            PoolStorage::new(INITIAL_SLOTS)
        });
        storage.push(buffer);
    }

    /// Make sure `holder` carries a buffer with `len() >= new_size`.
    ///
    /// An undersized buffer goes back into the pool and a right-sized one
    /// (pooled or fresh) is installed in its place. The holder owns the
    /// resulting buffer.
    pub fn ensure_capacity(&self, holder: &mut dyn SampleHolder, new_size: usize) {
        match holder.take_samples() {
            Some(samples) if samples.len() >= new_size => {
                holder.set_samples(samples);
            }
            undersized => {
                self.deallocate(undersized);
                holder.set_samples(self.allocate(new_size));
            }
        }
    }

    /// Drop the backing storage outright. Called under memory pressure;
    /// the pool behaves as empty afterwards and refills on demand.
    pub fn release_memory(&self) {
        *self.storage.lock() = None;
    }

    /// Number of buffers currently pooled.
    pub fn len(&self) -> usize {
        self.storage
            .lock()
            .as_ref()
            .map_or(0, |storage| storage.live())
    }

    /// True if no buffers are pooled.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl PoolStorage {
    fn new(slots: usize) -> Self {
        Self {
            slots: vec![None; slots],
            len: 0,
        }
    }

    fn live(&self) -> usize {
        self.slots[..self.len]
            .iter()
            .filter(|slot| slot.is_some())
            .count()
    }

    fn push(&mut self, buffer: Vec<i16>) {
        // A buffer whose data pointer is already pooled is the same
        // buffer; pooling it twice would hand it out twice.
        let ptr = buffer.as_ptr();
        let duplicate = self.slots[..self.len]
            .iter()
            .any(|slot| slot.as_ref().map_or(false, |held| held.as_ptr() == ptr));
        if duplicate {
            return;
        }

        if self.len == self.slots.len() {
            self.compact();
            if self.len == self.slots.len() {
                // No gaps to scavenge: grow by a fixed step.
                self.slots.resize_with(self.slots.len() + GROW_SLOTS, || None);
                debug!(slots = self.slots.len(), "sample pool storage grew");
            }
        }
        self.slots[self.len] = Some(buffer);
        self.len += 1;
    }

    // Move live buffers to the front of the prefix, squeezing out the
    // gaps `allocate` left behind. Relative order is preserved.
    fn compact(&mut self) {
        let mut live = 0;
        for idx in 0..self.len {
            if self.slots[idx].is_some() {
                self.slots.swap(live, idx);
                live += 1;
            }
        }
        self.len = live;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    struct Holder {
        samples: Option<Vec<i16>>,
    }

    impl SampleHolder for Holder {
        fn take_samples(&mut self) -> Option<Vec<i16>> {
            self.samples.take()
        }

        fn set_samples(&mut self, samples: Vec<i16>) {
            self.samples = Some(samples);
        }
    }

    #[test]
    fn allocate_meets_requested_size() {
        let pool = SamplePool::new();
        for size in [0, 1, 160, 1920, 100_000] {
            assert!(pool.allocate(size).len() >= size);
        }
    }

    #[test]
    fn deallocated_buffer_is_reused() {
        let pool = SamplePool::new();
        let buffer = vec![0i16; 160];
        let ptr = buffer.as_ptr();

        pool.deallocate(Some(buffer));
        let reused = pool.allocate(160);
        assert_eq!(reused.as_ptr(), ptr);
        assert_eq!(reused.len(), 160);
        assert!(pool.is_empty());
    }

    #[test]
    fn first_fit_returns_the_first_large_enough_buffer() {
        let pool = SamplePool::new();
        let large = vec![0i16; 1920];
        let large_ptr = large.as_ptr();
        pool.deallocate(Some(large));
        pool.deallocate(Some(vec![0i16; 160]));

        // Both buffers fit the request; the scan stops at the first.
        let buffer = pool.allocate(80);
        assert_eq!(buffer.as_ptr(), large_ptr);
        assert_eq!(buffer.len(), 1920);
    }

    #[test]
    fn deallocate_absent_is_a_noop() {
        let pool = SamplePool::new();
        pool.deallocate(None);
        assert!(pool.is_empty());
    }

    #[test]
    fn deallocate_same_buffer_is_idempotent() {
        let pool = SamplePool::new();
        // Empty buffers share the dangling data pointer, so the second
        // one is the same buffer as far as the pool can tell.
        pool.deallocate(Some(Vec::new()));
        pool.deallocate(Some(Vec::new()));
        assert_eq!(pool.len(), 1);
    }

    #[test]
    fn compaction_is_preferred_over_growth() {
        let pool = SamplePool::new();
        for _ in 0..INITIAL_SLOTS {
            pool.deallocate(Some(vec![0i16; 160]));
        }
        assert_eq!(pool.len(), INITIAL_SLOTS);

        // Leave two gaps in the live prefix, then return two buffers:
        // both must land in compacted slots, not grown ones.
        let a = pool.allocate(160);
        let b = pool.allocate(160);
        assert_eq!(pool.len(), INITIAL_SLOTS - 2);
        pool.deallocate(Some(a));
        pool.deallocate(Some(b));
        assert_eq!(pool.len(), INITIAL_SLOTS);
    }

    #[test]
    fn full_pool_without_gaps_grows() {
        let pool = SamplePool::new();
        for _ in 0..INITIAL_SLOTS + 1 {
            pool.deallocate(Some(vec![0i16; 160]));
        }
        assert_eq!(pool.len(), INITIAL_SLOTS + 1);
    }

    #[test]
    fn release_memory_empties_the_pool() {
        let pool = SamplePool::new();
        pool.deallocate(Some(vec![0i16; 1920]));
        pool.release_memory();
        assert!(pool.is_empty());

        // A pooled 1920-sample buffer would have satisfied this request;
        // after release the pool allocates exactly what was asked for.
        assert_eq!(pool.allocate(160).len(), 160);

        // And the pool keeps working after the release.
        pool.deallocate(Some(vec![0i16; 160]));
        assert_eq!(pool.len(), 1);
    }

    #[test]
    fn ensure_capacity_replaces_undersized_samples() {
        let pool = SamplePool::new();
        let mut holder = Holder {
            samples: Some(vec![0i16; 160]),
        };

        pool.ensure_capacity(&mut holder, 1920);
        assert!(holder.samples.as_ref().unwrap().len() >= 1920);
        // The undersized buffer went back into the pool.
        assert_eq!(pool.len(), 1);
        assert_eq!(pool.allocate(160).len(), 160);
    }

    #[test]
    fn ensure_capacity_keeps_a_large_enough_buffer() {
        let pool = SamplePool::new();
        let samples = vec![0i16; 1920];
        let ptr = samples.as_ptr();
        let mut holder = Holder {
            samples: Some(samples),
        };

        pool.ensure_capacity(&mut holder, 160);
        assert_eq!(holder.samples.as_ref().unwrap().as_ptr(), ptr);
        assert!(pool.is_empty());
    }

    #[test]
    fn ensure_capacity_fills_an_empty_holder() {
        let pool = SamplePool::new();
        let mut holder = Holder { samples: None };

        pool.ensure_capacity(&mut holder, 160);
        assert!(holder.samples.as_ref().unwrap().len() >= 160);
    }

    #[test]
    fn concurrent_allocate_and_deallocate() {
        let pool = Arc::new(SamplePool::new());
        let mut handles = Vec::new();
        for _ in 0..4 {
            let pool = pool.clone();
            handles.push(std::thread::spawn(move || {
                for _ in 0..200 {
                    let buffer = pool.allocate(160);
                    assert!(buffer.len() >= 160);
                    pool.deallocate(Some(buffer));
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }
        assert!(pool.len() >= 1);
    }
}
