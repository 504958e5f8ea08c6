//! # Address Space (segmented, demand paged)
//!
//! One process's view of memory: a segment table of 1 to
//! [`MAX_SEGMENTS`](crate::info::MAX_SEGMENTS) segments, each owning a page
//! table, plus a fixed resident set of frames handed in by the frame pool.
//!
//! ## Highlights
//!
//! - [`AddressSpace::new`] validates the segment layout and sizes the resident
//!   set to `min(total pages, MAX_RESIDENT_SET)`.
//! - [`AddressSpace::initial_load`] fills the resident set in segment-then-page
//!   order.
//! - [`AddressSpace::translate`] resolves `(segment, offset)` to a frame and an
//!   in-page offset, faulting the page in when it is absent.
//! - [`AddressSpace::touch`] accesses a page by number; it is the page-level
//!   step shared by translation and explicit replacement requests.
//! - [`AddressSpace::fault_in`] evicts a victim chosen by the
//!   [`ReplacementPolicy`] and reuses its frame for the requested page.
//!
//! ## Design
//!
//! - Access recency comes from a per-space logical clock that ticks on every
//!   load and every hit, so LRU decisions are deterministic.
//! - For FIFO the load-order queue holds exactly the resident pages, oldest
//!   first. LRU needs no queue.
//! - The set of owned frames never changes after [`bind_frames`](AddressSpace::bind_frames);
//!   faults only move pages between those frames.

use crate::addresses::{
    FrameNumber, LogicalAddress, PageNumber, PageOffset, PageRef, PhysicalAddress, SegmentNumber,
};
use crate::info::{MAX_RESIDENT_SET, MAX_SEGMENT_SIZE, MAX_SEGMENTS};
use crate::page_table::{PageEntry, Residency};
use crate::replacement::ReplacementPolicy;
use crate::segment_table::SegmentEntry;
use crate::{PagingStore, ProcessId};
use alloc::collections::VecDeque;
use alloc::vec::Vec;

/// Handle to one process's segment and page tables.
#[derive(Clone, Debug)]
pub struct AddressSpace {
    id: ProcessId,
    segments: Vec<SegmentEntry>,
    resident_set_size: usize,
    frames: Vec<FrameNumber>,
    policy: ReplacementPolicy,
    load_order: VecDeque<PageRef>,
    clock: u64,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, thiserror::Error)]
pub enum AddressSpaceError {
    #[error("a process must have 1 to {max} segments, got {count}", max = MAX_SEGMENTS)]
    InvalidSegmentCount { count: usize },
    #[error("segment {segment} has size {size}, expected 1 to {max} bytes", max = MAX_SEGMENT_SIZE)]
    InvalidSegmentSize { segment: SegmentNumber, size: usize },
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

/// A completed eviction: `victim` left `frame`, `loaded` took its place.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Replacement {
    pub victim: PageRef,
    pub loaded: PageRef,
    pub frame: FrameNumber,
}

/// Outcome of accessing one page.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Access {
    /// The page was resident in `frame`.
    Hit { frame: FrameNumber },
    /// The page was absent and has been faulted in.
    Fault(Replacement),
}

impl Access {
    /// Frame holding the accessed page afterwards.
    #[inline]
    #[must_use]
    pub const fn frame(&self) -> FrameNumber {
        match self {
            Self::Hit { frame } => *frame,
            Self::Fault(r) => r.frame,
        }
    }

    #[inline]
    #[must_use]
    pub const fn is_fault(&self) -> bool {
        matches!(self, Self::Fault(_))
    }
}

/// Result of translating a logical address.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Translation {
    pub frame: FrameNumber,
    pub offset: PageOffset,
    pub access: Access,
}

impl Translation {
    #[inline]
    #[must_use]
    pub const fn physical_address(&self) -> PhysicalAddress {
        self.frame.join(self.offset)
    }
}

impl AddressSpace {
    /// Build the segment table for `segment_sizes` (bytes per segment, in order).
    ///
    /// No frames are owned yet; see [`bind_frames`](Self::bind_frames).
    ///
    /// # Errors
    /// - [`AddressSpaceError::InvalidSegmentCount`] unless there are 1 to
    ///   [`MAX_SEGMENTS`] sizes.
    /// - [`AddressSpaceError::InvalidSegmentSize`] for the first size outside
    ///   `1..=MAX_SEGMENT_SIZE`.
    pub fn new(
        id: ProcessId,
        segment_sizes: &[usize],
        policy: ReplacementPolicy,
    ) -> Result<Self, AddressSpaceError> {
        if segment_sizes.is_empty() || segment_sizes.len() > MAX_SEGMENTS {
            return Err(AddressSpaceError::InvalidSegmentCount {
                count: segment_sizes.len(),
            });
        }

        let mut segments = Vec::with_capacity(segment_sizes.len());
        for (index, &size) in segment_sizes.iter().enumerate() {
            let number = SegmentNumber::new(index);
            if size == 0 || size > MAX_SEGMENT_SIZE {
                return Err(AddressSpaceError::InvalidSegmentSize {
                    segment: number,
                    size,
                });
            }
            segments.push(SegmentEntry::new(number, size));
        }

        let total_pages: usize = segments.iter().map(SegmentEntry::page_count).sum();
        Ok(Self {
            id,
            segments,
            resident_set_size: total_pages.min(MAX_RESIDENT_SET),
            frames: Vec::new(),
            policy,
            load_order: VecDeque::new(),
            clock: 0,
        })
    }

    #[inline]
    #[must_use]
    pub const fn id(&self) -> &ProcessId {
        &self.id
    }

    #[inline]
    #[must_use]
    pub const fn policy(&self) -> ReplacementPolicy {
        self.policy
    }

    #[inline]
    #[must_use]
    pub fn segments(&self) -> &[SegmentEntry] {
        &self.segments
    }

    #[inline]
    #[must_use]
    pub fn segment(&self, segment: SegmentNumber) -> Option<&SegmentEntry> {
        self.segments.get(segment.as_usize())
    }

    /// Number of frames this process holds while it exists.
    #[inline]
    #[must_use]
    pub const fn resident_set_size(&self) -> usize {
        self.resident_set_size
    }

    #[must_use]
    pub fn total_pages(&self) -> usize {
        self.segments.iter().map(SegmentEntry::page_count).sum()
    }

    /// Current value of the access clock.
    #[inline]
    #[must_use]
    pub const fn clock(&self) -> u64 {
        self.clock
    }

    /// The frames bound to this process, in bind order.
    ///
    /// These go back to the frame pool when the process is destroyed.
    #[inline]
    #[must_use]
    pub fn evicted_frames(&self) -> &[FrameNumber] {
        &self.frames
    }

    /// FIFO load order, oldest first. Always empty under LRU.
    pub fn load_order(&self) -> impl ExactSizeIterator<Item = PageRef> + '_ {
        self.load_order.iter().copied()
    }

    /// All resident pages in (segment, page) order.
    pub fn loaded_pages(&self) -> impl Iterator<Item = (PageRef, Residency)> + '_ {
        self.page_refs().filter_map(|page| {
            self.page_entry(page)
                .ok()
                .and_then(PageEntry::residency)
                .map(|r| (page, r))
        })
    }

    /// Every page of the process in (segment, page) order.
    pub fn page_refs(&self) -> impl Iterator<Item = PageRef> + '_ {
        self.segments.iter().flat_map(|segment| {
            (0..segment.page_count())
                .map(move |p| PageRef::new(segment.number(), PageNumber::new(p)))
        })
    }

    /// Look up a page table entry.
    ///
    /// # Errors
    /// [`AddressSpaceError::SegmentNotFound`] or [`AddressSpaceError::PageNotFound`].
    pub fn page_entry(&self, page: PageRef) -> Result<&PageEntry, AddressSpaceError> {
        let segment = self
            .segment(page.segment)
            .ok_or(AddressSpaceError::SegmentNotFound(page.segment))?;
        segment
            .page(page.page)
            .ok_or(AddressSpaceError::PageNotFound(page))
    }

    fn page_entry_mut(&mut self, page: PageRef) -> Result<&mut PageEntry, AddressSpaceError> {
        let segment = self
            .segments
            .get_mut(page.segment.as_usize())
            .ok_or(AddressSpaceError::SegmentNotFound(page.segment))?;
        segment
            .page_mut(page.page)
            .ok_or(AddressSpaceError::PageNotFound(page))
    }

    /// Record the frames committed to this process.
    ///
    /// # Panics
    /// If `frames.len()` differs from the resident-set size or frames were
    /// already bound.
    pub fn bind_frames(&mut self, frames: Vec<FrameNumber>) {
        assert!(self.frames.is_empty(), "frames already bound to {}", self.id);
        assert_eq!(
            frames.len(),
            self.resident_set_size,
            "resident set of {} needs {} frames",
            self.id,
            self.resident_set_size
        );
        self.frames = frames;
    }

    /// Load the first pages of the process into the bound frames.
    ///
    /// Pages go in segment-then-page order, one per bound frame in bind order,
    /// until the resident set is full or every page is loaded. Returns where
    /// each page was placed.
    pub fn initial_load<S: PagingStore>(&mut self, store: &mut S) -> Vec<(PageRef, FrameNumber)> {
        let placements: Vec<_> = self
            .page_refs()
            .zip(self.frames.iter().copied())
            .collect();
        for &(page, frame) in &placements {
            self.load(page, frame, store);
        }
        placements
    }

    /// Translate `offset` within `segment` to a frame and in-page offset.
    ///
    /// The addressed page is faulted in if absent and its access time is
    /// refreshed either way.
    ///
    /// # Errors
    /// - [`AddressSpaceError::SegmentNotFound`] if the segment does not exist.
    /// - [`AddressSpaceError::OffsetOutOfBounds`] if `offset >= segment size`.
    pub fn translate<S: PagingStore>(
        &mut self,
        segment: SegmentNumber,
        offset: usize,
        store: &mut S,
    ) -> Result<Translation, AddressSpaceError> {
        let entry = self
            .segment(segment)
            .ok_or(AddressSpaceError::SegmentNotFound(segment))?;
        if !entry.contains_offset(offset) {
            return Err(AddressSpaceError::OffsetOutOfBounds {
                segment,
                offset,
                size: entry.size(),
            });
        }

        let (page, in_page) = LogicalAddress::new(segment, offset).split();
        let access = self.touch(page, store)?;
        Ok(Translation {
            frame: access.frame(),
            offset: in_page,
            access,
        })
    }

    /// Access one page: refresh its stamp if resident, fault it in otherwise.
    ///
    /// # Errors
    /// [`AddressSpaceError::SegmentNotFound`] or [`AddressSpaceError::PageNotFound`].
    pub fn touch<S: PagingStore>(
        &mut self,
        page: PageRef,
        store: &mut S,
    ) -> Result<Access, AddressSpaceError> {
        let stamp = self.clock + 1;
        if let Some(frame) = self.page_entry_mut(page)?.touch(stamp) {
            self.clock = stamp;
            return Ok(Access::Hit { frame });
        }
        Ok(Access::Fault(self.fault_in(page, store)))
    }

    /// Replace a resident page by `page`, which must be absent.
    ///
    /// The victim is written out and unloaded and `page` is read into the
    /// victim's frame. No frame is allocated or freed.
    ///
    /// # Panics
    /// If nothing is resident, or if `page` does not exist. Both are caller bugs:
    /// a bound, initially loaded address space always has a resident page.
    pub fn fault_in<S: PagingStore>(&mut self, page: PageRef, store: &mut S) -> Replacement {
        debug_assert!(
            self.page_entry(page).is_ok_and(|p| !p.is_loaded()),
            "fault_in({page}) on a resident or unknown page"
        );

        let Some(victim) = self.policy.select_victim(&self.segments, &self.load_order) else {
            panic!("process {} has no resident page to evict", self.id);
        };
        let frame = self.unload(victim);
        store.write_page(&self.id, victim, frame);
        self.load(page, frame, store);

        Replacement {
            victim,
            loaded: page,
            frame,
        }
    }

    fn load<S: PagingStore>(&mut self, page: PageRef, frame: FrameNumber, store: &mut S) {
        self.clock += 1;
        let stamp = self.clock;
        let Ok(entry) = self.page_entry_mut(page) else {
            panic!("cannot load unknown page {page}");
        };
        entry.load(frame, stamp);
        if self.policy == ReplacementPolicy::Fifo {
            self.load_order.push_back(page);
        }
        store.read_page(&self.id, page, frame);
    }

    fn unload(&mut self, page: PageRef) -> FrameNumber {
        let Ok(entry) = self.page_entry_mut(page) else {
            panic!("cannot unload unknown page {page}");
        };
        let Some(residency) = entry.unload() else {
            panic!("victim {page} of {} is not resident", self.id);
        };
        self.load_order.retain(|&p| p != page);
        residency.frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{NullStore, PagingEvent};

    fn page(s: usize, p: usize) -> PageRef {
        PageRef::new(SegmentNumber::new(s), PageNumber::new(p))
    }

    fn frames(range: core::ops::Range<usize>) -> Vec<FrameNumber> {
        range.map(FrameNumber::new).collect()
    }

    fn space(sizes: &[usize], policy: ReplacementPolicy) -> AddressSpace {
        let mut space = AddressSpace::new(ProcessId::new("P").unwrap(), sizes, policy).unwrap();
        let rss = space.resident_set_size();
        space.bind_frames(frames(10..10 + rss));
        space.initial_load(&mut NullStore);
        space
    }

    fn loaded(space: &AddressSpace) -> Vec<PageRef> {
        space.loaded_pages().map(|(p, _)| p).collect()
    }

    #[test]
    fn rejects_bad_segment_counts() {
        let id = ProcessId::new("P").unwrap();
        assert_eq!(
            AddressSpace::new(id.clone(), &[], ReplacementPolicy::Lru).unwrap_err(),
            AddressSpaceError::InvalidSegmentCount { count: 0 }
        );
        assert_eq!(
            AddressSpace::new(id, &[1, 1, 1, 1, 1], ReplacementPolicy::Lru).unwrap_err(),
            AddressSpaceError::InvalidSegmentCount { count: 5 }
        );
    }

    #[test]
    fn rejects_bad_segment_sizes() {
        let id = ProcessId::new("P").unwrap();
        assert_eq!(
            AddressSpace::new(id.clone(), &[100, 0], ReplacementPolicy::Lru).unwrap_err(),
            AddressSpaceError::InvalidSegmentSize {
                segment: SegmentNumber::new(1),
                size: 0
            }
        );
        assert_eq!(
            AddressSpace::new(id.clone(), &[MAX_SEGMENT_SIZE + 1], ReplacementPolicy::Lru)
                .unwrap_err(),
            AddressSpaceError::InvalidSegmentSize {
                segment: SegmentNumber::new(0),
                size: MAX_SEGMENT_SIZE + 1
            }
        );
        assert!(AddressSpace::new(id, &[MAX_SEGMENT_SIZE], ReplacementPolicy::Lru).is_ok());
    }

    #[test]
    fn resident_set_is_capped() {
        let id = ProcessId::new("P").unwrap();
        let small = AddressSpace::new(id.clone(), &[1500, 10], ReplacementPolicy::Lru).unwrap();
        assert_eq!(small.total_pages(), 3);
        assert_eq!(small.resident_set_size(), 3);

        let big = AddressSpace::new(id, &[16 * 1024, 16 * 1024], ReplacementPolicy::Lru).unwrap();
        assert_eq!(big.total_pages(), 32);
        assert_eq!(big.resident_set_size(), MAX_RESIDENT_SET);
    }

    #[test]
    fn initial_load_follows_segment_then_page_order() {
        let mut space = AddressSpace::new(
            ProcessId::new("P").unwrap(),
            &[3000, 2048, 5000],
            ReplacementPolicy::Fifo,
        )
        .unwrap();
        space.bind_frames(frames(20..28));
        let mut events = Vec::new();
        let placements = space.initial_load(&mut events);

        let expected = [
            page(0, 0),
            page(0, 1),
            page(0, 2),
            page(1, 0),
            page(1, 1),
            page(2, 0),
            page(2, 1),
            page(2, 2),
        ];
        assert_eq!(placements.len(), 8);
        for (i, (p, frame)) in placements.iter().enumerate() {
            assert_eq!(*p, expected[i]);
            assert_eq!(*frame, FrameNumber::new(20 + i));
        }
        assert_eq!(loaded(&space), expected);
        assert_eq!(space.load_order().collect::<Vec<_>>(), expected);
        assert_eq!(events.len(), 8);
        assert!(matches!(events[0], PagingEvent::Read { page: p, .. } if p == page(0, 0)));
    }

    #[test]
    fn initial_load_of_small_process_loads_everything() {
        let space = space(&[1024, 100], ReplacementPolicy::Lru);
        assert_eq!(loaded(&space), [page(0, 0), page(1, 0)]);
        assert_eq!(space.load_order().len(), 0);
    }

    #[test]
    fn translate_hit_computes_frame_and_offset() {
        let mut space = space(&[5000, 3000], ReplacementPolicy::Lru);
        let t = space
            .translate(SegmentNumber::new(1), 2999, &mut NullStore)
            .unwrap();
        // segment 1 page 2 is the eighth page loaded, frame 17
        assert_eq!(t.frame, FrameNumber::new(17));
        assert_eq!(t.offset.as_usize(), 2999 - 2048);
        assert!(!t.access.is_fault());
        assert_eq!(t.physical_address().as_u64(), 17 * 1024 + 951);
    }

    #[test]
    fn translate_rejects_offset_equal_to_size() {
        let mut space = space(&[5000, 3000], ReplacementPolicy::Lru);
        assert_eq!(
            space.translate(SegmentNumber::new(1), 3000, &mut NullStore),
            Err(AddressSpaceError::OffsetOutOfBounds {
                segment: SegmentNumber::new(1),
                offset: 3000,
                size: 3000
            })
        );
        assert!(
            space
                .translate(SegmentNumber::new(1), 2999, &mut NullStore)
                .is_ok()
        );
    }

    #[test]
    fn translate_rejects_unknown_segment() {
        let mut space = space(&[5000, 3000], ReplacementPolicy::Lru);
        assert_eq!(
            space.translate(SegmentNumber::new(2), 0, &mut NullStore),
            Err(AddressSpaceError::SegmentNotFound(SegmentNumber::new(2)))
        );
    }

    #[test]
    fn translate_refreshes_recency() {
        let mut space = space(&[4096], ReplacementPolicy::Lru);
        let before = space.page_entry(page(0, 0)).unwrap().last_access().unwrap();
        space
            .translate(SegmentNumber::new(0), 10, &mut NullStore)
            .unwrap();
        let after = space.page_entry(page(0, 0)).unwrap().last_access().unwrap();
        assert!(after > before);
        assert_eq!(after, space.clock());
    }

    #[test]
    fn fifo_fault_reuses_oldest_frame() {
        // 10 pages, 8 resident: pages (0,8) and (0,9) are absent.
        let mut space = space(&[10 * 1024], ReplacementPolicy::Fifo);
        let mut events = Vec::new();

        let t = space
            .translate(SegmentNumber::new(0), 8 * 1024 + 5, &mut events)
            .unwrap();
        let Access::Fault(r) = t.access else {
            panic!("expected a fault");
        };
        assert_eq!(r.victim, page(0, 0));
        assert_eq!(r.loaded, page(0, 8));
        assert_eq!(r.frame, FrameNumber::new(10));
        assert_eq!(t.physical_address().as_u64(), 10 * 1024 + 5);

        let id = ProcessId::new("P").unwrap();
        assert_eq!(
            events,
            [
                PagingEvent::Write {
                    process: id.clone(),
                    page: page(0, 0),
                    frame: FrameNumber::new(10)
                },
                PagingEvent::Read {
                    process: id,
                    page: page(0, 8),
                    frame: FrameNumber::new(10)
                },
            ]
        );
        assert_eq!(space.load_order().next(), Some(page(0, 1)));
        assert_eq!(space.load_order().last(), Some(page(0, 8)));
    }

    #[test]
    fn fifo_ignores_hits() {
        let mut space = space(&[10 * 1024], ReplacementPolicy::Fifo);
        space.touch(page(0, 0), &mut NullStore).unwrap();
        let access = space.touch(page(0, 9), &mut NullStore).unwrap();
        let Access::Fault(r) = access else {
            panic!("expected a fault");
        };
        assert_eq!(r.victim, page(0, 0));
    }

    #[test]
    fn lru_fault_evicts_least_recent() {
        let mut space = space(&[10 * 1024], ReplacementPolicy::Lru);
        space.touch(page(0, 0), &mut NullStore).unwrap();
        space.touch(page(0, 1), &mut NullStore).unwrap();
        let access = space.touch(page(0, 9), &mut NullStore).unwrap();
        let Access::Fault(r) = access else {
            panic!("expected a fault");
        };
        assert_eq!(r.victim, page(0, 2));
        assert_eq!(r.frame, FrameNumber::new(12));
    }

    #[test]
    fn touch_reports_missing_pages() {
        let mut space = space(&[3000], ReplacementPolicy::Lru);
        assert_eq!(
            space.touch(page(0, 3), &mut NullStore),
            Err(AddressSpaceError::PageNotFound(page(0, 3)))
        );
        assert_eq!(
            space.touch(page(1, 0), &mut NullStore),
            Err(AddressSpaceError::SegmentNotFound(SegmentNumber::new(1)))
        );
    }

    #[test]
    fn faults_never_change_owned_frames() {
        let mut space = space(&[16 * 1024], ReplacementPolicy::Lru);
        let owned = space.evicted_frames().to_vec();
        for p in 0..16 {
            space.touch(page(0, p), &mut NullStore).unwrap();
        }
        assert_eq!(space.evicted_frames(), owned.as_slice());
        let mut resident: Vec<_> = space.loaded_pages().map(|(_, r)| r.frame).collect();
        resident.sort();
        assert_eq!(resident, owned);
    }

    #[test]
    #[should_panic(expected = "needs 2 frames")]
    fn binding_wrong_number_of_frames_panics() {
        let mut space =
            AddressSpace::new(ProcessId::new("P").unwrap(), &[2048], ReplacementPolicy::Lru)
                .unwrap();
        space.bind_frames(frames(0..3));
    }

    #[test]
    #[should_panic(expected = "no resident page")]
    fn fault_without_resident_pages_panics() {
        let mut space =
            AddressSpace::new(ProcessId::new("P").unwrap(), &[2048], ReplacementPolicy::Lru)
                .unwrap();
        space.bind_frames(frames(0..2));
        space.fault_in(page(0, 0), &mut NullStore);
    }
}
