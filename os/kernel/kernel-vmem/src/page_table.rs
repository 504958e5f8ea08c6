//! # Page Table Entries
//!
//! A page is either absent or resident. A resident page knows the frame it
//! occupies and the logical time of its last access; an absent page knows
//! neither. Both facts live in one [`Residency`] so they cannot disagree.

use crate::addresses::{FrameNumber, PageNumber};

/// Where and since when a page is resident.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Residency {
    /// Frame holding the page.
    pub frame: FrameNumber,
    /// Logical clock value of the most recent access (load or hit).
    pub last_access: u64,
}

/// One page of one segment.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PageEntry {
    number: PageNumber,
    residency: Option<Residency>,
}

impl PageEntry {
    /// A page that is not loaded.
    #[inline]
    #[must_use]
    pub const fn new(number: PageNumber) -> Self {
        Self {
            number,
            residency: None,
        }
    }

    #[inline]
    #[must_use]
    pub const fn number(&self) -> PageNumber {
        self.number
    }

    #[inline]
    #[must_use]
    pub const fn is_loaded(&self) -> bool {
        self.residency.is_some()
    }

    #[inline]
    #[must_use]
    pub const fn residency(&self) -> Option<Residency> {
        self.residency
    }

    /// Frame holding this page, if loaded.
    #[inline]
    #[must_use]
    pub fn frame(&self) -> Option<FrameNumber> {
        self.residency.map(|r| r.frame)
    }

    /// Last access stamp, if loaded.
    #[inline]
    #[must_use]
    pub fn last_access(&self) -> Option<u64> {
        self.residency.map(|r| r.last_access)
    }

    pub(crate) fn load(&mut self, frame: FrameNumber, stamp: u64) {
        debug_assert!(!self.is_loaded(), "page {} already loaded", self.number);
        self.residency = Some(Residency {
            frame,
            last_access: stamp,
        });
    }

    pub(crate) fn unload(&mut self) -> Option<Residency> {
        self.residency.take()
    }

    /// Refresh the access stamp. Returns the frame on a hit, `None` if absent.
    pub(crate) fn touch(&mut self, stamp: u64) -> Option<FrameNumber> {
        let residency = self.residency.as_mut()?;
        residency.last_access = stamp;
        Some(residency.frame)
    }
}
