use crate::{FrameNumber, PageOffset};
use core::fmt;
use kernel_info::memory::FRAME_SHIFT;

/// Physical memory address.
///
/// A byte address inside simulated physical memory. This is the value handed
/// back to callers of address translation.
///
/// ### Semantics
/// - Use [`PhysicalAddress::frame`] / [`PhysicalAddress::offset`] /
///   [`PhysicalAddress::split`] to derive the containing frame and the in-frame
///   offset.
/// - Combine a [`FrameNumber`] with a [`PageOffset`] using [`FrameNumber::join`]
///   to reconstruct the original `PhysicalAddress`.
///
/// ### Examples
/// ```rust
/// # use kernel_memory_addresses::*;
/// let pa = PhysicalAddress::new(9 * 1024 + 439);
/// let (frame, off) = pa.split();
/// assert_eq!(frame, FrameNumber::new(9));
/// assert_eq!(frame.join(off), pa);
/// ```
#[repr(transparent)]
#[derive(Copy, Clone, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct PhysicalAddress(u64);

impl PhysicalAddress {
    #[inline]
    #[must_use]
    pub const fn new(v: u64) -> Self {
        Self(v)
    }

    #[inline]
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }

    /// The frame containing this address.
    #[inline]
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn frame(self) -> FrameNumber {
        FrameNumber::new((self.0 >> FRAME_SHIFT) as usize)
    }

    /// The offset of this address within its frame.
    #[inline]
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn offset(self) -> PageOffset {
        PageOffset::from_offset(self.0 as usize)
    }

    #[inline]
    #[must_use]
    pub const fn split(self) -> (FrameNumber, PageOffset) {
        (self.frame(), self.offset())
    }
}

impl fmt::Debug for PhysicalAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PA(0x{:04X})", self.0)
    }
}

impl fmt::Display for PhysicalAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:04X}", self.0)
    }
}
