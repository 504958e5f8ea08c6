//! Memory manager: the process registry on top of the frame pool.
//!
//! [`MemoryManager`] owns the single [`FrameStore`], one [`AddressSpace`] per
//! live process and the request/fault counters. Every operation is
//! all-or-nothing: a failed call leaves frames and page tables untouched.
//!
//! # Example
//! ```
//! use kernel_alloc::vmm::MemoryManager;
//!
//! let mut mm = MemoryManager::new();
//! mm.create_process("P", &[5000, 3000]).unwrap();
//! assert_eq!(mm.frames().unoccupied_count(), 56);
//!
//! let pa = mm.translate_address("P", 1, 100).unwrap();
//! assert_eq!(pa.as_u64(), 5 * 1024 + 100);
//! ```

use crate::frame_alloc::{FrameAllocError, FrameOwner, FrameStore};
use crate::snapshot::{FrameSnapshot, PageSnapshot, ProcessSnapshot, SegmentSnapshot};
use alloc::collections::BTreeMap;
use alloc::vec::Vec;
use kernel_memory_addresses::{
    FrameNumber, PageNumber, PageRef, PhysicalAddress, SegmentNumber,
};
use kernel_vmem::{
    Access, AddressSpace, AddressSpaceError, NullStore, PagingStore, ProcessId, ProcessIdError,
    ReplacementPolicy,
};

/// Totals since the manager was created.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct Stats {
    /// Calls to `translate_address` and `replace_page`, failed ones included.
    pub total_requests: u64,
    /// Page faults serviced by those calls.
    pub page_faults: u64,
}

/// The system's process registry and frame pool.
pub struct MemoryManager<S: PagingStore = NullStore> {
    frames: FrameStore,
    processes: BTreeMap<ProcessId, AddressSpace>,
    stats: Stats,
    default_policy: ReplacementPolicy,
    store: S,
}

impl Default for MemoryManager {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryManager {
    /// A manager with an empty frame pool, LRU as default policy and no paging
    /// store.
    #[must_use]
    pub fn new() -> Self {
        Self::with_store(NullStore)
    }
}

impl<S: PagingStore> MemoryManager<S> {
    #[must_use]
    pub fn with_store(store: S) -> Self {
        Self {
            frames: FrameStore::new(),
            processes: BTreeMap::new(),
            stats: Stats::default(),
            default_policy: ReplacementPolicy::default(),
            store,
        }
    }

    #[must_use]
    pub fn with_policy(mut self, policy: ReplacementPolicy) -> Self {
        self.default_policy = policy;
        self
    }

    #[inline]
    #[must_use]
    pub const fn default_policy(&self) -> ReplacementPolicy {
        self.default_policy
    }

    /// Change the policy given to processes created from now on.
    ///
    /// Live processes keep the policy they were created with.
    pub const fn set_default_policy(&mut self, policy: ReplacementPolicy) {
        self.default_policy = policy;
    }

    #[inline]
    #[must_use]
    pub const fn frames(&self) -> &FrameStore {
        &self.frames
    }

    #[inline]
    #[must_use]
    pub const fn stats(&self) -> Stats {
        self.stats
    }

    #[inline]
    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    #[inline]
    pub const fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Live process ids in ascending order.
    pub fn processes(&self) -> impl ExactSizeIterator<Item = &ProcessId> {
        self.processes.keys()
    }

    #[must_use]
    pub fn process(&self, id: &str) -> Option<&AddressSpace> {
        self.processes.get(id)
    }

    /// Create a process with the current default policy.
    ///
    /// # Errors
    /// See [`create_process_with_policy`](Self::create_process_with_policy).
    pub fn create_process(&mut self, id: &str, segment_sizes: &[usize]) -> Result<(), MemoryError> {
        self.create_process_with_policy(id, segment_sizes, self.default_policy)
    }

    /// Create a process, reserve its resident set and load its first pages.
    ///
    /// # Errors
    /// Checked in this order, and nothing changes on failure:
    /// - [`MemoryError::InvalidId`] for an empty id or one containing whitespace.
    /// - [`MemoryError::DuplicateId`] if a process with this id exists.
    /// - [`MemoryError::InvalidSegmentCount`] / [`MemoryError::InvalidSegmentSize`]
    ///   for a bad segment layout.
    /// - [`MemoryError::InsufficientMemory`] if the resident set does not fit
    ///   into the free frames.
    pub fn create_process_with_policy(
        &mut self,
        id: &str,
        segment_sizes: &[usize],
        policy: ReplacementPolicy,
    ) -> Result<(), MemoryError> {
        let id = ProcessId::new(id)?;
        if self.processes.contains_key(&id) {
            return Err(MemoryError::DuplicateId(id));
        }

        let mut space = AddressSpace::new(id.clone(), segment_sizes, policy)?;
        let frames = self
            .frames
            .allocate(&FrameOwner::new(id.clone()), space.resident_set_size())?;
        space.bind_frames(frames);
        for (page, frame) in space.initial_load(&mut self.store) {
            self.frames.assign(frame, page);
        }

        self.processes.insert(id, space);
        Ok(())
    }

    /// Remove a process and return its frames to the pool.
    ///
    /// # Errors
    /// [`MemoryError::NotFound`] if no such process exists.
    pub fn destroy_process(&mut self, id: &str) -> Result<(), MemoryError> {
        let space = self
            .processes
            .remove(id)
            .ok_or_else(|| MemoryError::not_found(id))?;
        self.frames.free(space.evicted_frames());
        Ok(())
    }

    /// Translate `(segment, offset)` of process `id` to a physical address,
    /// faulting the page in if needed.
    ///
    /// Counts one request, and one fault if a fault was serviced.
    ///
    /// # Errors
    /// [`MemoryError::NotFound`], [`MemoryError::SegmentNotFound`] or
    /// [`MemoryError::OffsetOutOfBounds`].
    pub fn translate_address(
        &mut self,
        id: &str,
        segment: usize,
        offset: usize,
    ) -> Result<PhysicalAddress, MemoryError> {
        self.stats.total_requests += 1;
        let space = self
            .processes
            .get_mut(id)
            .ok_or_else(|| MemoryError::not_found(id))?;
        let translation = space.translate(SegmentNumber::new(segment), offset, &mut self.store)?;
        self.record(translation.access);
        Ok(translation.physical_address())
    }

    /// Access `page` of `segment` in process `id`.
    ///
    /// A resident page only has its access time refreshed. An absent page is
    /// faulted in over the victim chosen by the process's policy.
    ///
    /// # Errors
    /// [`MemoryError::NotFound`], [`MemoryError::SegmentNotFound`] or
    /// [`MemoryError::PageNotFound`].
    pub fn replace_page(
        &mut self,
        id: &str,
        segment: usize,
        page: usize,
    ) -> Result<Access, MemoryError> {
        self.stats.total_requests += 1;
        let space = self
            .processes
            .get_mut(id)
            .ok_or_else(|| MemoryError::not_found(id))?;
        let page = PageRef::new(SegmentNumber::new(segment), PageNumber::new(page));
        let access = space.touch(page, &mut self.store)?;
        self.record(access);
        Ok(access)
    }

    fn record(&mut self, access: Access) {
        if let Access::Fault(replacement) = access {
            self.stats.page_faults += 1;
            self.frames.assign(replacement.frame, replacement.loaded);
        }
    }

    /// Every frame of the pool, in index order.
    #[must_use]
    pub fn snapshot_frames(&self) -> Vec<FrameSnapshot> {
        self.frames.frames().map(FrameSnapshot::from).collect()
    }

    /// Page tables and resident set of one process.
    ///
    /// # Errors
    /// [`MemoryError::NotFound`] if no such process exists.
    pub fn snapshot_process(&self, id: &str) -> Result<ProcessSnapshot, MemoryError> {
        let space = self
            .processes
            .get(id)
            .ok_or_else(|| MemoryError::not_found(id))?;

        let segments = space
            .segments()
            .iter()
            .map(|segment| SegmentSnapshot {
                number: segment.number(),
                size: segment.size(),
                pages: segment
                    .pages()
                    .iter()
                    .map(|page| PageSnapshot {
                        number: page.number(),
                        frame: page.frame(),
                        last_access: page.last_access(),
                    })
                    .collect(),
            })
            .collect();

        let mut recency: Vec<_> = space.loaded_pages().collect();
        recency.sort_by_key(|(page, residency)| (residency.last_access, *page));

        Ok(ProcessSnapshot {
            id: space.id().clone(),
            policy: space.policy(),
            frames: space.evicted_frames().to_vec(),
            load_order: space.load_order().collect(),
            recency: recency.into_iter().map(|(page, _)| page).collect(),
            segments,
        })
    }

    /// Frames owned by `id`, if it exists.
    #[must_use]
    pub fn frames_of(&self, id: &str) -> Option<&[FrameNumber]> {
        self.processes.get(id).map(AddressSpace::evicted_frames)
    }
}

#[derive(Debug, Clone, Eq, PartialEq, thiserror::Error)]
pub enum MemoryError {
    #[error("invalid process id: {0}")]
    InvalidId(#[from] ProcessIdError),
    #[error("process {0} already exists")]
    DuplicateId(ProcessId),
    #[error("a process must have 1 to {max} segments, got {count}", max = kernel_info::memory::MAX_SEGMENTS)]
    InvalidSegmentCount { count: usize },
    #[error("segment {segment} has size {size}, expected 1 to {max} bytes", max = kernel_info::memory::MAX_SEGMENT_SIZE)]
    InvalidSegmentSize { segment: SegmentNumber, size: usize },
    #[error("insufficient memory: {requested} frames needed, {available} free")]
    InsufficientMemory { requested: usize, available: usize },
    #[error("process {0} not found")]
    NotFound(alloc::string::String),
    #[error("segment {0} does not exist")]
    SegmentNotFound(SegmentNumber),
    #[error("offset {offset} is out of bounds for segment {segment} of size {size}")]
    OffsetOutOfBounds {
        segment: SegmentNumber,
        offset: usize,
        size: usize,
    },
    #[error("page {} does not exist in segment {}", .0.page, .0.segment)]
    PageNotFound(PageRef),
}

impl MemoryError {
    fn not_found(id: &str) -> Self {
        Self::NotFound(id.into())
    }
}

impl From<AddressSpaceError> for MemoryError {
    fn from(value: AddressSpaceError) -> Self {
        match value {
            AddressSpaceError::InvalidSegmentCount { count } => Self::InvalidSegmentCount { count },
            AddressSpaceError::InvalidSegmentSize { segment, size } => {
                Self::InvalidSegmentSize { segment, size }
            }
            AddressSpaceError::SegmentNotFound(segment) => Self::SegmentNotFound(segment),
            AddressSpaceError::OffsetOutOfBounds {
                segment,
                offset,
                size,
            } => Self::OffsetOutOfBounds {
                segment,
                offset,
                size,
            },
            AddressSpaceError::PageNotFound(page) => Self::PageNotFound(page),
        }
    }
}

impl From<FrameAllocError> for MemoryError {
    fn from(value: FrameAllocError) -> Self {
        match value {
            FrameAllocError::InsufficientMemory {
                requested,
                available,
            } => Self::InsufficientMemory {
                requested,
                available,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;
    use kernel_info::memory::FRAME_COUNT;
    use kernel_vmem::PagingEvent;

    #[test]
    fn validation_order_is_id_duplicate_layout_memory() {
        let mut mm = MemoryManager::new();
        assert!(matches!(
            mm.create_process("", &[]),
            Err(MemoryError::InvalidId(ProcessIdError::Empty))
        ));
        assert!(matches!(
            mm.create_process("my_proc", &[1024]),
            Err(MemoryError::InvalidId(ProcessIdError::Separator(_)))
        ));
        assert_eq!(mm.frames().unoccupied_count(), FRAME_COUNT);
        mm.create_process("A", &[1024]).unwrap();
        assert!(matches!(
            mm.create_process("A", &[]),
            Err(MemoryError::DuplicateId(_))
        ));
        assert_eq!(
            mm.create_process("B", &[]),
            Err(MemoryError::InvalidSegmentCount { count: 0 })
        );
        assert_eq!(
            mm.create_process("B", &[0]),
            Err(MemoryError::InvalidSegmentSize {
                segment: SegmentNumber::new(0),
                size: 0
            })
        );
    }

    #[test]
    fn insufficient_memory_leaves_pool_untouched() {
        let mut mm = MemoryManager::new();
        for i in 0..7 {
            mm.create_process(&alloc::format!("P{i}"), &[8 * 1024]).unwrap();
        }
        mm.create_process("small", &[4 * 1024]).unwrap();
        assert_eq!(mm.frames().unoccupied_count(), 4);

        assert_eq!(
            mm.create_process("X", &[8 * 1024]),
            Err(MemoryError::InsufficientMemory {
                requested: 8,
                available: 4
            })
        );
        assert_eq!(mm.frames().unoccupied_count(), 4);
        assert!(mm.process("X").is_none());
    }

    #[test]
    fn creation_tags_frames_with_pages() {
        let mut mm = MemoryManager::new();
        mm.create_process("P", &[2048, 100]).unwrap();
        let labels: Vec<_> = mm
            .snapshot_frames()
            .iter()
            .take(4)
            .map(|f| f.owner.as_ref().map(ToString::to_string))
            .collect();
        assert_eq!(
            labels,
            [
                Some("P_0_0".to_string()),
                Some("P_0_1".to_string()),
                Some("P_1_0".to_string()),
                None
            ]
        );
    }

    #[test]
    fn translate_counts_requests_and_faults() {
        let mut mm = MemoryManager::new();
        mm.create_process("P", &[10 * 1024]).unwrap();

        let pa = mm.translate_address("P", 0, 9 * 1024 + 7).unwrap();
        // page 9 faults in over page 0, which sits in frame 0
        assert_eq!(pa.as_u64(), 7);
        assert_eq!(
            mm.stats(),
            Stats {
                total_requests: 1,
                page_faults: 1
            }
        );
        let owner = mm.frames().frame_at(0).unwrap().owner().unwrap();
        assert_eq!(owner.to_string(), "P_0_9");

        assert!(mm.translate_address("nobody", 0, 0).is_err());
        assert!(mm.translate_address("P", 0, 10 * 1024).is_err());
        assert_eq!(
            mm.stats(),
            Stats {
                total_requests: 3,
                page_faults: 1
            }
        );
    }

    #[test]
    fn replace_page_hit_only_counts_request() {
        let mut mm = MemoryManager::new();
        mm.create_process("P", &[5000, 3000]).unwrap();
        let before = mm.snapshot_frames();

        let access = mm.replace_page("P", 0, 0).unwrap();
        assert_eq!(
            access,
            Access::Hit {
                frame: FrameNumber::new(0)
            }
        );
        assert_eq!(mm.snapshot_frames(), before);
        assert_eq!(
            mm.stats(),
            Stats {
                total_requests: 1,
                page_faults: 0
            }
        );
    }

    #[test]
    fn replace_page_reports_missing_targets() {
        let mut mm = MemoryManager::new();
        mm.create_process("P", &[3000]).unwrap();
        assert!(matches!(
            mm.replace_page("Q", 0, 0),
            Err(MemoryError::NotFound(_))
        ));
        assert_eq!(
            mm.replace_page("P", 1, 0),
            Err(MemoryError::SegmentNotFound(SegmentNumber::new(1)))
        );
        assert!(matches!(
            mm.replace_page("P", 0, 3),
            Err(MemoryError::PageNotFound(_))
        ));
        assert_eq!(mm.stats().total_requests, 3);
    }

    #[test]
    fn policy_is_fixed_per_process() {
        let mut mm = MemoryManager::new();
        mm.create_process("L", &[1024]).unwrap();
        mm.set_default_policy(ReplacementPolicy::Fifo);
        mm.create_process("F", &[1024]).unwrap();
        assert_eq!(mm.process("L").unwrap().policy(), ReplacementPolicy::Lru);
        assert_eq!(mm.process("F").unwrap().policy(), ReplacementPolicy::Fifo);
    }

    #[test]
    fn store_sees_initial_loads_and_faults() {
        let mut mm = MemoryManager::with_store(Vec::<PagingEvent>::new())
            .with_policy(ReplacementPolicy::Fifo);
        mm.create_process("P", &[9 * 1024]).unwrap();
        assert_eq!(mm.store().len(), 8);

        mm.store_mut().clear();
        mm.replace_page("P", 0, 8).unwrap();
        assert!(matches!(
            mm.store().as_slice(),
            [PagingEvent::Write { .. }, PagingEvent::Read { .. }]
        ));
    }

    #[test]
    fn process_snapshot_orders_recency() {
        let mut mm = MemoryManager::new();
        mm.create_process("P", &[3 * 1024]).unwrap();
        mm.replace_page("P", 0, 0).unwrap();
        let snap = mm.snapshot_process("P").unwrap();
        let recency: Vec<_> = snap.recency.iter().map(|p| p.page.as_usize()).collect();
        assert_eq!(recency, [1, 2, 0]);
        assert!(snap.load_order.is_empty());
        assert_eq!(snap.segments[0].pages.len(), 3);
    }
}
