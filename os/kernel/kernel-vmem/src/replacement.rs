//! # Page Replacement
//!
//! Victim selection for local replacement. Both strategies are pure functions
//! of an address space's state: they name a resident page and leave it to the
//! caller to write it out and reuse its frame.
//!
//! | Policy | Victim | Ties |
//! |--------|--------|------|
//! | [`Fifo`](ReplacementPolicy::Fifo) | Head of the load-order queue | Impossible, the queue is a total order |
//! | [`Lru`](ReplacementPolicy::Lru) | Smallest last-access stamp | First in ascending (segment, page) order |
//!
//! FIFO order reflects loads only; accessing a resident page does not move it
//! in the queue.

use crate::addresses::{PageNumber, PageRef};
use crate::segment_table::SegmentEntry;
use alloc::collections::VecDeque;
use core::fmt;
use core::str::FromStr;

/// Replacement policy of one address space, fixed for its lifetime.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub enum ReplacementPolicy {
    /// Evict the page that was loaded first.
    Fifo,
    /// Evict the page that was accessed least recently.
    #[default]
    Lru,
}

impl ReplacementPolicy {
    /// Pick the page to evict.
    ///
    /// `load_order` is only consulted for [`Fifo`](Self::Fifo), `segments` only
    /// for [`Lru`](Self::Lru). Returns `None` if nothing is resident.
    #[must_use]
    pub fn select_victim(
        self,
        segments: &[SegmentEntry],
        load_order: &VecDeque<PageRef>,
    ) -> Option<PageRef> {
        match self {
            Self::Fifo => load_order.front().copied(),
            Self::Lru => least_recently_used(segments),
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Fifo => "FIFO",
            Self::Lru => "LRU",
        }
    }
}

/// Resident page with the smallest stamp; strict `<` keeps the first one seen.
fn least_recently_used(segments: &[SegmentEntry]) -> Option<PageRef> {
    let mut best: Option<(u64, PageRef)> = None;
    for segment in segments {
        for (index, page) in segment.pages().iter().enumerate() {
            let Some(stamp) = page.last_access() else {
                continue;
            };
            if best.is_none_or(|(least, _)| stamp < least) {
                let page = PageRef::new(segment.number(), PageNumber::new(index));
                best = Some((stamp, page));
            }
        }
    }
    best.map(|(_, page)| page)
}

impl fmt::Display for ReplacementPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Eq, PartialEq, thiserror::Error)]
#[error("unknown replacement policy {0:?} (expected \"fifo\" or \"lru\")")]
pub struct ParsePolicyError(pub alloc::string::String);

impl FromStr for ReplacementPolicy {
    type Err = ParsePolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("fifo") || s == "0" {
            Ok(Self::Fifo)
        } else if s.eq_ignore_ascii_case("lru") || s == "1" {
            Ok(Self::Lru)
        } else {
            Err(ParsePolicyError(s.into()))
        }
    }
}
