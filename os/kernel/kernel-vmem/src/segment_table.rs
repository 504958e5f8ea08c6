//! # Segment Table Entries

use crate::addresses::{PageNumber, SegmentNumber};
use crate::info::{FRAME_SIZE, MAX_PAGES_PER_SEGMENT};
use crate::page_table::PageEntry;
use alloc::vec::Vec;

/// One logical segment of a process and its page table.
///
/// The page table has `ceil(size / FRAME_SIZE)` entries; the last page may be
/// only partially covered by the segment.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SegmentEntry {
    number: SegmentNumber,
    size: usize,
    pages: Vec<PageEntry>,
}

impl SegmentEntry {
    /// Create a segment with all pages absent.
    ///
    /// The size is not validated here; [`AddressSpace::new`](crate::AddressSpace::new)
    /// rejects sizes outside `1..=MAX_SEGMENT_SIZE` before constructing entries.
    /// Debug builds assert the page table stays within [`MAX_PAGES_PER_SEGMENT`].
    #[must_use]
    pub fn new(number: SegmentNumber, size: usize) -> Self {
        let count = size.div_ceil(FRAME_SIZE);
        debug_assert!(
            count <= MAX_PAGES_PER_SEGMENT,
            "segment {number} of {size} bytes exceeds {MAX_PAGES_PER_SEGMENT} pages"
        );
        let pages = (0..count)
            .map(|p| PageEntry::new(PageNumber::new(p)))
            .collect();
        Self {
            number,
            size,
            pages,
        }
    }

    #[inline]
    #[must_use]
    pub const fn number(&self) -> SegmentNumber {
        self.number
    }

    /// Declared size in bytes.
    #[inline]
    #[must_use]
    pub const fn size(&self) -> usize {
        self.size
    }

    #[inline]
    #[must_use]
    pub const fn page_count(&self) -> usize {
        self.pages.len()
    }

    #[inline]
    #[must_use]
    pub fn pages(&self) -> &[PageEntry] {
        &self.pages
    }

    #[inline]
    #[must_use]
    pub fn page(&self, page: PageNumber) -> Option<&PageEntry> {
        self.pages.get(page.as_usize())
    }

    #[inline]
    pub(crate) fn page_mut(&mut self, page: PageNumber) -> Option<&mut PageEntry> {
        self.pages.get_mut(page.as_usize())
    }

    /// Whether `offset` addresses a byte inside this segment.
    #[inline]
    #[must_use]
    pub const fn contains_offset(&self, offset: usize) -> bool {
        offset < self.size
    }
}
