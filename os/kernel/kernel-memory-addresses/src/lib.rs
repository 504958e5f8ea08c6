//! # Logical and Physical Memory Address Types
//!
//! Strongly typed wrappers for the numbers that flow through the memory
//! manager: frame numbers, physical addresses, segment and page numbers, and
//! in-page offsets.
//!
//! ## Overview
//!
//! The simulated machine uses segmentation with paging. A process names memory
//! by a [`LogicalAddress`], i.e. a segment number plus a byte offset into that
//! segment. The offset is split at [`FRAME_SIZE`](kernel_info::memory::FRAME_SIZE)
//! granularity into a page of the segment and an offset inside that page:
//!
//! ```text
//! LogicalAddress { segment, offset }
//!                            │
//!              ┌─────────────┴──────────────┐
//!      offset / FRAME_SIZE          offset % FRAME_SIZE
//!              │                            │
//!        PageRef { segment, page }     PageOffset
//!              │                            │
//!        page table lookup                  │
//!              │                            │
//!         FrameNumber ──── base() ──► PhysicalAddress + PageOffset
//! ```
//!
//! | Type | Meaning |
//! |------|---------|
//! | [`SegmentNumber`] | Index into a process's segment table. |
//! | [`PageNumber`] | Index into one segment's page table. |
//! | [`PageRef`] | A (segment, page) pair identifying one page of a process. |
//! | [`PageOffset`] | Byte offset within a page (`0..FRAME_SIZE`). |
//! | [`FrameNumber`] | Index of a physical frame. |
//! | [`PhysicalAddress`] | Byte address in simulated physical memory. |
//!
//! ## Typical Usage
//!
//! ```rust
//! # use kernel_memory_addresses::*;
//! let la = LogicalAddress::new(SegmentNumber::new(1), 2100);
//! let (page, off) = la.split();
//! assert_eq!(page, PageRef::new(SegmentNumber::new(1), PageNumber::new(2)));
//! assert_eq!(off.as_usize(), 52);
//!
//! // Page 2 of segment 1 resident in frame 7.
//! let pa = FrameNumber::new(7).join(off);
//! assert_eq!(pa.as_u64(), 7 * 1024 + 52);
//! assert_eq!(pa.split(), (FrameNumber::new(7), off));
//! ```
//!
//! ## Design Notes
//!
//! - The types are `#[repr(transparent)]` and implement `Copy`, `Eq`, `Ord` and
//!   `Hash`, making them suitable as map keys.
//! - All splitting and joining is `const fn`.
//! - Segment and page numbers are distinct types.

#![cfg_attr(not(any(test, doctest)), no_std)]
#![deny(unsafe_code)]

mod frame_number;
mod logical_address;
mod page_offset;
mod physical_address;

pub use frame_number::FrameNumber;
pub use logical_address::{LogicalAddress, PageNumber, PageRef, SegmentNumber};
pub use page_offset::PageOffset;
pub use physical_address::PhysicalAddress;

#[cfg(test)]
mod tests {
    use super::*;
    use kernel_info::memory::{FRAME_COUNT, FRAME_SIZE, MEMORY_SIZE};

    #[test]
    fn frame_base_addresses() {
        assert_eq!(FrameNumber::new(0).base().as_u64(), 0);
        assert_eq!(FrameNumber::new(1).base().as_u64(), 1024);
        assert_eq!(FrameNumber::new(4).base().as_u64(), 4096);
        assert_eq!(
            FrameNumber::new(FRAME_COUNT - 1).base().as_u64(),
            (MEMORY_SIZE - FRAME_SIZE) as u64
        );
    }

    #[test]
    fn split_at_page_boundaries() {
        let seg = SegmentNumber::new(0);

        let (page, off) = LogicalAddress::new(seg, 0).split();
        assert_eq!(page.page, PageNumber::new(0));
        assert_eq!(off.as_usize(), 0);

        let (page, off) = LogicalAddress::new(seg, FRAME_SIZE - 1).split();
        assert_eq!(page.page, PageNumber::new(0));
        assert_eq!(off.as_usize(), FRAME_SIZE - 1);

        let (page, off) = LogicalAddress::new(seg, FRAME_SIZE).split();
        assert_eq!(page.page, PageNumber::new(1));
        assert_eq!(off.as_usize(), 0);

        let (page, off) = LogicalAddress::new(seg, 4999).split();
        assert_eq!(page.page, PageNumber::new(4));
        assert_eq!(off.as_usize(), 4999 - 4 * FRAME_SIZE);
    }

    #[test]
    fn physical_address_round_trip() {
        let pa = PhysicalAddress::new(0x2A37);
        let (frame, off) = pa.split();
        assert_eq!(frame, FrameNumber::new(10));
        assert_eq!(off.as_usize(), 0x237);
        assert_eq!(frame.join(off), pa);
    }

    #[test]
    fn page_refs_order_by_segment_then_page() {
        let a = PageRef::new(SegmentNumber::new(0), PageNumber::new(7));
        let b = PageRef::new(SegmentNumber::new(1), PageNumber::new(0));
        let c = PageRef::new(SegmentNumber::new(1), PageNumber::new(1));
        assert!(a < b);
        assert!(b < c);
    }

    #[test]
    fn display_formats() {
        assert_eq!(format!("{}", PhysicalAddress::new(5047)), "0x13B7");
        assert_eq!(format!("{:?}", PhysicalAddress::new(5047)), "PA(0x13B7)");
        assert_eq!(format!("{}", FrameNumber::new(9)), "9");
        let page = PageRef::new(SegmentNumber::new(2), PageNumber::new(3));
        assert_eq!(format!("{page}"), "(2, 3)");
    }
}
