//! A [`MemoryManager`] usable from several threads.
//!
//! Every mutating call takes one `spin::Mutex`, so operations are applied one
//! at a time and each sees the previous one's complete effect. The counters are
//! mirrored into atomics while the lock is held, which makes [`stats`](SharedMemoryManager::stats)
//! lock-free.

use crate::snapshot::{FrameSnapshot, ProcessSnapshot};
use crate::vmm::{MemoryError, MemoryManager, Stats};
use alloc::vec::Vec;
use core::sync::atomic::{AtomicU64, Ordering};
use kernel_memory_addresses::PhysicalAddress;
use kernel_vmem::{Access, NullStore, PagingStore, ProcessId, ReplacementPolicy};
use spin::Mutex;

pub struct SharedMemoryManager<S: PagingStore = NullStore> {
    inner: Mutex<MemoryManager<S>>,
    total_requests: AtomicU64,
    page_faults: AtomicU64,
}

impl Default for SharedMemoryManager {
    fn default() -> Self {
        Self::new(MemoryManager::new())
    }
}

impl<S: PagingStore> SharedMemoryManager<S> {
    #[must_use]
    pub fn new(manager: MemoryManager<S>) -> Self {
        let stats = manager.stats();
        Self {
            inner: Mutex::new(manager),
            total_requests: AtomicU64::new(stats.total_requests),
            page_faults: AtomicU64::new(stats.page_faults),
        }
    }

    /// Run `f` with exclusive access to the manager.
    pub fn with_lock<R>(&self, f: impl FnOnce(&mut MemoryManager<S>) -> R) -> R {
        let mut guard = self.inner.lock();
        let result = f(&mut guard);
        self.publish(guard.stats());
        result
    }

    fn publish(&self, stats: Stats) {
        self.total_requests
            .store(stats.total_requests, Ordering::Release);
        self.page_faults.store(stats.page_faults, Ordering::Release);
    }

    /// Counter values as of the last completed operation.
    ///
    /// The two loads are not taken together: a concurrent request may be
    /// visible in one counter and not yet in the other.
    #[must_use]
    pub fn stats(&self) -> Stats {
        Stats {
            total_requests: self.total_requests.load(Ordering::Acquire),
            page_faults: self.page_faults.load(Ordering::Acquire),
        }
    }

    /// # Errors
    /// As [`MemoryManager::create_process`].
    pub fn create_process(&self, id: &str, segment_sizes: &[usize]) -> Result<(), MemoryError> {
        self.with_lock(|mm| mm.create_process(id, segment_sizes))
    }

    /// # Errors
    /// As [`MemoryManager::create_process_with_policy`].
    pub fn create_process_with_policy(
        &self,
        id: &str,
        segment_sizes: &[usize],
        policy: ReplacementPolicy,
    ) -> Result<(), MemoryError> {
        self.with_lock(|mm| mm.create_process_with_policy(id, segment_sizes, policy))
    }

    /// # Errors
    /// As [`MemoryManager::destroy_process`].
    pub fn destroy_process(&self, id: &str) -> Result<(), MemoryError> {
        self.with_lock(|mm| mm.destroy_process(id))
    }

    /// # Errors
    /// As [`MemoryManager::translate_address`].
    pub fn translate_address(
        &self,
        id: &str,
        segment: usize,
        offset: usize,
    ) -> Result<PhysicalAddress, MemoryError> {
        self.with_lock(|mm| mm.translate_address(id, segment, offset))
    }

    /// # Errors
    /// As [`MemoryManager::replace_page`].
    pub fn replace_page(&self, id: &str, segment: usize, page: usize) -> Result<Access, MemoryError> {
        self.with_lock(|mm| mm.replace_page(id, segment, page))
    }

    pub fn set_default_policy(&self, policy: ReplacementPolicy) {
        self.with_lock(|mm| mm.set_default_policy(policy));
    }

    #[must_use]
    pub fn unoccupied_count(&self) -> usize {
        self.inner.lock().frames().unoccupied_count()
    }

    #[must_use]
    pub fn processes(&self) -> Vec<ProcessId> {
        self.inner.lock().processes().cloned().collect()
    }

    #[must_use]
    pub fn snapshot_frames(&self) -> Vec<FrameSnapshot> {
        self.inner.lock().snapshot_frames()
    }

    /// # Errors
    /// As [`MemoryManager::snapshot_process`].
    pub fn snapshot_process(&self, id: &str) -> Result<ProcessSnapshot, MemoryError> {
        self.inner.lock().snapshot_process(id)
    }

    #[must_use]
    pub fn into_inner(self) -> MemoryManager<S> {
        self.inner.into_inner()
    }
}
