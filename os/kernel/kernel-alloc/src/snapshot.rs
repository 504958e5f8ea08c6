//! Read-only views for display.
//!
//! Snapshots are plain owned data, detached from the manager, so they can be
//! rendered or compared after the manager has moved on.

use crate::frame_alloc::{Frame, FrameOwner};
use alloc::vec::Vec;
use kernel_memory_addresses::{FrameNumber, PageNumber, PageRef, PhysicalAddress, SegmentNumber};
use kernel_vmem::{ProcessId, ReplacementPolicy};

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FrameSnapshot {
    pub number: FrameNumber,
    pub base: PhysicalAddress,
    /// `None` while the frame is free.
    pub owner: Option<FrameOwner>,
}

impl From<&Frame> for FrameSnapshot {
    fn from(frame: &Frame) -> Self {
        Self {
            number: frame.number(),
            base: frame.base(),
            owner: frame.owner().cloned(),
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PageSnapshot {
    pub number: PageNumber,
    pub frame: Option<FrameNumber>,
    pub last_access: Option<u64>,
}

impl PageSnapshot {
    #[inline]
    #[must_use]
    pub const fn is_loaded(&self) -> bool {
        self.frame.is_some()
    }

    /// Start address of the frame holding this page.
    #[inline]
    #[must_use]
    pub fn frame_base(&self) -> Option<PhysicalAddress> {
        self.frame.map(FrameNumber::base)
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SegmentSnapshot {
    pub number: SegmentNumber,
    pub size: usize,
    pub pages: Vec<PageSnapshot>,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ProcessSnapshot {
    pub id: ProcessId,
    pub policy: ReplacementPolicy,
    /// The resident set, in allocation order.
    pub frames: Vec<FrameNumber>,
    /// FIFO queue, oldest first. Empty for LRU processes.
    pub load_order: Vec<PageRef>,
    /// Resident pages from least to most recently used.
    pub recency: Vec<PageRef>,
    pub segments: Vec<SegmentSnapshot>,
}
