//! # Memory Layout

/// Size of simulated physical memory in bytes (64 KiB).
pub const MEMORY_SIZE: usize = 64 * 1024;

/// Size of one physical frame, and therefore of one page, in bytes (1 KiB).
///
/// A power of two so that a segment offset splits into page number and
/// in-page offset with a shift and a mask.
pub const FRAME_SIZE: usize = 1024;

/// log2([`FRAME_SIZE`]).
pub const FRAME_SHIFT: u32 = FRAME_SIZE.trailing_zeros();

/// Number of physical frames managed by the frame store.
pub const FRAME_COUNT: usize = MEMORY_SIZE / FRAME_SIZE;

/// Maximum number of segments a single process may declare.
pub const MAX_SEGMENTS: usize = 4;

/// Maximum size of a single segment in bytes (16 KiB).
pub const MAX_SEGMENT_SIZE: usize = 16 * 1024;

/// Maximum number of pages of one segment.
pub const MAX_PAGES_PER_SEGMENT: usize = MAX_SEGMENT_SIZE.div_ceil(FRAME_SIZE);

/// Maximum number of pages a process may keep resident at the same time.
pub const MAX_RESIDENT_SET: usize = 8;

const _: () = {
    assert!(FRAME_SIZE.is_power_of_two());
    assert!(MEMORY_SIZE.is_multiple_of(FRAME_SIZE));
    assert!(1 << FRAME_SHIFT == FRAME_SIZE);
    assert!(MAX_SEGMENTS > 0);
    assert!(MAX_RESIDENT_SET > 0);
    assert!(MAX_RESIDENT_SET <= FRAME_COUNT);
    assert!(MAX_SEGMENT_SIZE <= MEMORY_SIZE);
    assert!(MAX_PAGES_PER_SEGMENT * FRAME_SIZE == MAX_SEGMENT_SIZE);
};
