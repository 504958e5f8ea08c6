//! # Segmented Virtual Memory
//!
//! Per-process address spaces for a simulated machine that uses segmentation
//! with paging and local demand-paged replacement.
//!
//! ## What you get
//! - An [`AddressSpace`] per process: a segment table whose entries own page
//!   tables, the frames committed to the process (its resident set), and the
//!   bookkeeping needed by the replacement policy.
//! - A closed [`ReplacementPolicy`] (FIFO or LRU) with a pure victim selector.
//! - A [`PagingStore`] interface through which page reads and write-backs are
//!   reported to whatever stands in for secondary storage.
//!
//! ## Logical Address → Physical Address Walk
//!
//! ```text
//!  (segment, offset)
//!       │
//!       ├─ segment ≥ segment count ─────────────► SegmentNotFound
//!       ├─ offset  ≥ segment size  ─────────────► OffsetOutOfBounds
//!       │
//!       ▼
//!  page = offset / FRAME_SIZE, in-page = offset % FRAME_SIZE
//!       │
//!       ├─ page resident ──► stamp access ──► frame
//!       └─ page absent   ──► select victim (FIFO | LRU)
//!                            write victim out, reuse its frame,
//!                            read page in, stamp access ──► frame
//!       │
//!       ▼
//!  frame.base() + in-page
//! ```
//!
//! Replacement is **local**: the victim is always one of the faulting
//! process's own resident pages, so a fault never changes how many frames a
//! process holds.
//!
//! ## Frames
//!
//! An address space never allocates or frees frames. The owner of the frame
//! pool hands it a fixed set with [`AddressSpace::bind_frames`] and takes the
//! same set back via [`AddressSpace::evicted_frames`] when the process ends.

#![cfg_attr(not(any(test, doctest)), no_std)]
#![deny(unsafe_code)]

pub mod address_space;
pub mod page_table;
mod process_id;
pub mod replacement;
pub mod segment_table;

extern crate alloc;

pub use crate::address_space::{
    Access, AddressSpace, AddressSpaceError, Replacement, Translation,
};
pub use crate::page_table::{PageEntry, Residency};
pub use crate::process_id::{ProcessId, ProcessIdError};
pub use crate::replacement::{ParsePolicyError, ReplacementPolicy};
pub use crate::segment_table::SegmentEntry;

/// Re-export constants as info module.
pub use kernel_info::memory as info;

pub use kernel_memory_addresses as addresses;

use crate::addresses::{FrameNumber, PageRef};

/// Secondary storage as seen by the pager.
///
/// Page transfers are modelled as immediate notifications: the address space
/// calls [`write_page`](Self::write_page) before a victim's frame is reused and
/// [`read_page`](Self::read_page) after a page has been placed into a frame.
/// Implementations may log, count or simulate latency; they cannot fail.
pub trait PagingStore {
    /// `page` of `process` was read from storage into `frame`.
    fn read_page(&mut self, process: &ProcessId, page: PageRef, frame: FrameNumber);

    /// The content of `frame`, holding `page` of `process`, was written back to storage.
    fn write_page(&mut self, process: &ProcessId, page: PageRef, frame: FrameNumber);
}

impl<S: PagingStore + ?Sized> PagingStore for &mut S {
    #[inline]
    fn read_page(&mut self, process: &ProcessId, page: PageRef, frame: FrameNumber) {
        (**self).read_page(process, page, frame);
    }

    #[inline]
    fn write_page(&mut self, process: &ProcessId, page: PageRef, frame: FrameNumber) {
        (**self).write_page(process, page, frame);
    }
}

/// A [`PagingStore`] that discards every notification.
#[derive(Copy, Clone, Debug, Default)]
pub struct NullStore;

impl PagingStore for NullStore {
    #[inline]
    fn read_page(&mut self, _process: &ProcessId, _page: PageRef, _frame: FrameNumber) {}

    #[inline]
    fn write_page(&mut self, _process: &ProcessId, _page: PageRef, _frame: FrameNumber) {}
}

/// One page transfer reported to a [`PagingStore`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum PagingEvent {
    Read {
        process: ProcessId,
        page: PageRef,
        frame: FrameNumber,
    },
    Write {
        process: ProcessId,
        page: PageRef,
        frame: FrameNumber,
    },
}

/// Records every transfer in order.
impl PagingStore for alloc::vec::Vec<PagingEvent> {
    fn read_page(&mut self, process: &ProcessId, page: PageRef, frame: FrameNumber) {
        self.push(PagingEvent::Read {
            process: process.clone(),
            page,
            frame,
        });
    }

    fn write_page(&mut self, process: &ProcessId, page: PageRef, frame: FrameNumber) {
        self.push(PagingEvent::Write {
            process: process.clone(),
            page,
            frame,
        });
    }
}
