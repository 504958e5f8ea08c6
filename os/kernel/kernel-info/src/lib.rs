//! # Memory Manager Configuration
//!
//! This crate holds the fixed system parameters of the simulated machine. Every
//! other crate in the workspace reads its sizes and limits from here.
//!
//! ## Parameters
//!
//! | Constant | Value | Meaning |
//! |:---------|:------|:--------|
//! | [`MEMORY_SIZE`](memory::MEMORY_SIZE) | 64 KiB | Simulated physical memory |
//! | [`FRAME_SIZE`](memory::FRAME_SIZE) | 1 KiB | Frame and page size |
//! | [`FRAME_COUNT`](memory::FRAME_COUNT) | 64 | Number of physical frames |
//! | [`MAX_SEGMENTS`](memory::MAX_SEGMENTS) | 4 | Segments per process |
//! | [`MAX_SEGMENT_SIZE`](memory::MAX_SEGMENT_SIZE) | 16 KiB | Bytes per segment |
//! | [`MAX_RESIDENT_SET`](memory::MAX_RESIDENT_SET) | 8 | Resident pages per process |
//!
//! ## Physical Memory Layout
//!
//! ```text
//! 0x0000 ┌─────────────┐ frame 0
//!        │             │
//! 0x0400 ├─────────────┤ frame 1
//!        │     ...     │
//! 0xFC00 ├─────────────┤ frame 63
//!        │             │
//! 0x10000└─────────────┘ MEMORY_SIZE
//! ```
//!
//! ## Configuration Management
//!
//! All values are `const` and checked against each other at compile time; they
//! are not negotiable at runtime.
//!
//! ```rust
//! use kernel_info::memory::{FRAME_COUNT, FRAME_SIZE, MEMORY_SIZE};
//!
//! assert_eq!(FRAME_COUNT * FRAME_SIZE, MEMORY_SIZE);
//! ```

#![cfg_attr(not(any(test, doctest)), no_std)]
#![deny(unsafe_code)]

pub mod memory;
