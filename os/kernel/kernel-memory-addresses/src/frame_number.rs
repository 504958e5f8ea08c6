use crate::{PageOffset, PhysicalAddress};
use core::fmt;
use kernel_info::memory::FRAME_SIZE;

/// Index of a physical frame.
///
/// Frame `n` covers the physical byte range `n * FRAME_SIZE .. (n + 1) * FRAME_SIZE`.
/// The index is assigned once when the frame store is created and never changes.
#[repr(transparent)]
#[derive(Copy, Clone, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct FrameNumber(usize);

impl FrameNumber {
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

    /// First physical byte of this frame.
    #[inline]
    #[must_use]
    pub const fn base(self) -> PhysicalAddress {
        PhysicalAddress::new((self.0 * FRAME_SIZE) as u64)
    }

    /// Combine this frame with an in-page offset into a full [`PhysicalAddress`].
    #[inline]
    #[must_use]
    pub const fn join(self, off: PageOffset) -> PhysicalAddress {
        PhysicalAddress::new(self.base().as_u64() + off.as_usize() as u64)
    }
}

impl fmt::Debug for FrameNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Frame({})", self.0)
    }
}

impl fmt::Display for FrameNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}
