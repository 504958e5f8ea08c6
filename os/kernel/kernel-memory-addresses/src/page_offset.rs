use core::fmt;
use kernel_info::memory::FRAME_SIZE;

/// The offset within a page (`0..FRAME_SIZE`).
#[repr(transparent)]
#[derive(Copy, Clone, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct PageOffset(usize);

impl PageOffset {
    /// Construct from the low bits of any byte offset.
    #[inline]
    #[must_use]
    pub const fn from_offset(offset: usize) -> Self {
        Self(offset & (FRAME_SIZE - 1))
    }

    #[inline]
    #[must_use]
    pub const fn as_usize(self) -> usize {
        self.0
    }
}

impl fmt::Debug for PageOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Offset({:#X})", self.0)
    }
}

impl fmt::Display for PageOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}
