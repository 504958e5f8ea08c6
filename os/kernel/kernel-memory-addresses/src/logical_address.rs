use crate::PageOffset;
use core::fmt;
use kernel_info::memory::FRAME_SHIFT;

/// Index into a process's segment table.
#[repr(transparent)]
#[derive(Copy, Clone, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct SegmentNumber(usize);

impl SegmentNumber {
    #[inline]
    #[must_use]
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    #[inline]
    #[must_use]
    pub const fn as_usize(self) -> usize {
        self.0
    }
}

/// Index into one segment's page table.
#[repr(transparent)]
#[derive(Copy, Clone, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct PageNumber(usize);

impl PageNumber {
    #[inline]
    #[must_use]
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    #[inline]
    #[must_use]
    pub const fn as_usize(self) -> usize {
        self.0
    }
}

/// One page of one segment of a process.
///
/// Ordering is segment first, then page, which is the order used for initial
/// loading and for breaking LRU ties.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct PageRef {
    pub segment: SegmentNumber,
    pub page: PageNumber,
}

impl PageRef {
    #[inline]
    #[must_use]
    pub const fn new(segment: SegmentNumber, page: PageNumber) -> Self {
        Self { segment, page }
    }
}

/// A segment number plus a byte offset into that segment.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct LogicalAddress {
    pub segment: SegmentNumber,
    pub offset: usize,
}

impl LogicalAddress {
    #[inline]
    #[must_use]
    pub const fn new(segment: SegmentNumber, offset: usize) -> Self {
        Self { segment, offset }
    }

    /// The page of the segment this offset falls into.
    #[inline]
    #[must_use]
    pub const fn page(self) -> PageRef {
        PageRef::new(self.segment, PageNumber::new(self.offset >> FRAME_SHIFT))
    }

    /// The offset inside [`page`](Self::page).
    #[inline]
    #[must_use]
    pub const fn page_offset(self) -> PageOffset {
        PageOffset::from_offset(self.offset)
    }

    #[inline]
    #[must_use]
    pub const fn split(self) -> (PageRef, PageOffset) {
        (self.page(), self.page_offset())
    }
}

impl fmt::Debug for SegmentNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Segment({})", self.0)
    }
}

impl fmt::Display for SegmentNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl fmt::Debug for PageNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Page({})", self.0)
    }
}

impl fmt::Display for PageNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl fmt::Debug for PageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PageRef(s={}, p={})", self.segment, self.page)
    }
}

impl fmt::Display for PageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.segment, self.page)
    }
}

impl fmt::Debug for LogicalAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LA(s={}, off={})", self.segment, self.offset)
    }
}

impl fmt::Display for LogicalAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.segment, self.offset)
    }
}
