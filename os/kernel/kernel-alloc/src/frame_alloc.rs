//! Physical frame pool.
//!
//! A fixed array of [`FRAME_COUNT`] frames with a cached free count. Allocation
//! always takes the lowest-indexed free frames, so destroying a process and
//! recreating one of the same size lands on the same frames again.

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;
use core::str::FromStr;
use kernel_info::memory::FRAME_COUNT;
use kernel_memory_addresses::{FrameNumber, PageNumber, PageRef, PhysicalAddress, SegmentNumber};
use kernel_vmem::ProcessId;

/// Who occupies a frame.
///
/// Right after allocation only the process is known; the page is filled in
/// once something is loaded into the frame.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FrameOwner {
    pub process: ProcessId,
    pub page: Option<PageRef>,
}

impl FrameOwner {
    #[must_use]
    pub const fn new(process: ProcessId) -> Self {
        Self {
            process,
            page: None,
        }
    }

    #[must_use]
    pub const fn with_page(process: ProcessId, page: PageRef) -> Self {
        Self {
            process,
            page: Some(page),
        }
    }
}

/// Renders `process_segment_page`, or just the process while no page is placed.
impl fmt::Display for FrameOwner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.page {
            Some(p) => write!(f, "{}_{}_{}", self.process, p.segment, p.page),
            None => write!(f, "{}", self.process),
        }
    }
}

#[derive(Debug, Clone, Eq, PartialEq, thiserror::Error)]
pub enum FrameOwnerParseError {
    #[error("owner label {0:?} must have exactly three '_'-separated parts")]
    Components(String),
    #[error("owner label {0:?} has an invalid process id")]
    Process(String),
    #[error("owner label {0:?} has a non-numeric segment or page")]
    Number(String),
}

/// Parses the `process_segment_page` form.
impl FromStr for FrameOwner {
    type Err = FrameOwnerParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split('_').collect();
        let [process, segment, page] = parts.as_slice() else {
            return Err(FrameOwnerParseError::Components(s.into()));
        };
        let process =
            ProcessId::new(*process).map_err(|_| FrameOwnerParseError::Process(s.into()))?;
        let segment: usize = segment
            .parse()
            .map_err(|_| FrameOwnerParseError::Number(s.into()))?;
        let page: usize = page
            .parse()
            .map_err(|_| FrameOwnerParseError::Number(s.into()))?;
        Ok(Self::with_page(
            process,
            PageRef::new(SegmentNumber::new(segment), PageNumber::new(page)),
        ))
    }
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub enum FrameState {
    #[default]
    Free,
    Occupied(FrameOwner),
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Frame {
    number: FrameNumber,
    state: FrameState,
}

impl Frame {
    #[inline]
    #[must_use]
    pub const fn number(&self) -> FrameNumber {
        self.number
    }

    #[inline]
    #[must_use]
    pub const fn base(&self) -> PhysicalAddress {
        self.number.base()
    }

    #[inline]
    #[must_use]
    pub const fn state(&self) -> &FrameState {
        &self.state
    }

    #[inline]
    #[must_use]
    pub const fn is_occupied(&self) -> bool {
        matches!(self.state, FrameState::Occupied(_))
    }

    #[inline]
    #[must_use]
    pub const fn owner(&self) -> Option<&FrameOwner> {
        match &self.state {
            FrameState::Occupied(owner) => Some(owner),
            FrameState::Free => None,
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, thiserror::Error)]
pub enum FrameAllocError {
    #[error("insufficient memory: {requested} frames requested, {available} free")]
    InsufficientMemory { requested: usize, available: usize },
}

/// The frame pool.
///
/// # Invariants
/// - `unoccupied` always equals the number of [`FrameState::Free`] frames.
/// - Frame `i` sits at index `i` and never moves.
#[derive(Clone, Debug)]
pub struct FrameStore {
    frames: Vec<Frame>,
    unoccupied: usize,
}

impl Default for FrameStore {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameStore {
    /// A pool of [`FRAME_COUNT`] free frames.
    #[must_use]
    pub fn new() -> Self {
        Self::with_frames(FRAME_COUNT)
    }

    #[must_use]
    pub fn with_frames(count: usize) -> Self {
        let frames = (0..count)
            .map(|i| Frame {
                number: FrameNumber::new(i),
                state: FrameState::Free,
            })
            .collect();
        Self {
            frames,
            unoccupied: count,
        }
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    #[inline]
    #[must_use]
    pub const fn unoccupied_count(&self) -> usize {
        self.unoccupied
    }

    #[inline]
    #[must_use]
    pub fn frame_at(&self, index: usize) -> Option<&Frame> {
        self.frames.get(index)
    }

    pub fn frames(&self) -> impl ExactSizeIterator<Item = &Frame> {
        self.frames.iter()
    }

    /// Reserve the `count` lowest-indexed free frames for `owner`.
    ///
    /// Nothing changes on failure.
    ///
    /// # Errors
    /// [`FrameAllocError::InsufficientMemory`] if fewer than `count` frames are free.
    pub fn allocate(
        &mut self,
        owner: &FrameOwner,
        count: usize,
    ) -> Result<Vec<FrameNumber>, FrameAllocError> {
        if count > self.unoccupied {
            return Err(FrameAllocError::InsufficientMemory {
                requested: count,
                available: self.unoccupied,
            });
        }

        let mut taken = Vec::with_capacity(count);
        for frame in self
            .frames
            .iter_mut()
            .filter(|f| f.state == FrameState::Free)
            .take(count)
        {
            frame.state = FrameState::Occupied(owner.clone());
            taken.push(frame.number);
        }
        debug_assert_eq!(taken.len(), count);
        self.unoccupied -= taken.len();
        Ok(taken)
    }

    /// Return frames to the pool.
    ///
    /// Freeing a frame that is already free is a caller bug: it trips a debug
    /// assertion and is otherwise skipped.
    pub fn free(&mut self, frames: &[FrameNumber]) {
        for &number in frames {
            let Some(frame) = self.frames.get_mut(number.as_usize()) else {
                debug_assert!(false, "{number:?} is outside the pool");
                continue;
            };
            debug_assert!(frame.is_occupied(), "double free of {number:?}");
            if frame.is_occupied() {
                frame.state = FrameState::Free;
                self.unoccupied += 1;
            }
        }
    }

    /// Record that `page` now lives in the occupied frame `number`.
    ///
    /// # Panics
    /// If the frame is free or out of range.
    pub fn assign(&mut self, number: FrameNumber, page: PageRef) {
        match self.frames.get_mut(number.as_usize()).map(|f| &mut f.state) {
            Some(FrameState::Occupied(owner)) => owner.page = Some(page),
            _ => panic!("cannot assign {page} to unoccupied {number:?}"),
        }
    }
}
