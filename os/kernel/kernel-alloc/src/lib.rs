//! # Frame Pool and Memory Manager
//!
//! This crate owns the simulated physical memory and ties it to the per-process
//! address spaces of `kernel-vmem`.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │           SharedMemoryManager (optional)            │
//! │    • one spin lock around every operation           │
//! │    • lock-free statistics                           │
//! └─────────────────┬───────────────────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────────────────┐
//! │                 MemoryManager                       │
//! │    • process registry (id → AddressSpace)           │
//! │    • request and page fault counters                │
//! │    • default replacement policy                     │
//! └─────────────────┬───────────────────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────────────────┐
//! │                  FrameStore                         │
//! │    • 64 frames of 1 KiB                             │
//! │    • lowest-index-first placement                   │
//! │    • owner tag per occupied frame                   │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! ## Core Components
//!
//! ### Frame pool ([`frame_alloc`])
//!
//! [`FrameStore`](frame_alloc::FrameStore) hands out whole resident sets at
//! process creation and takes them back at destruction. Allocation is
//! all-or-nothing and the free count is kept alongside the frames, so checking
//! whether a process fits is O(1).
//!
//! ### Memory manager ([`vmm`])
//!
//! [`MemoryManager`](vmm::MemoryManager) validates requests, creates and destroys
//! processes and routes address translations and page accesses to the owning
//! [`AddressSpace`](kernel_vmem::AddressSpace). Page faults never allocate:
//! a process always replaces within its own resident set.
//!
//! ### Snapshots ([`snapshot`])
//!
//! Owned, read-only copies of the frame table and of one process's page tables
//! for display.
//!
//! ### Shared access ([`shared`])
//!
//! [`SharedMemoryManager`](shared::SharedMemoryManager) serializes all calls
//! through a `spin::Mutex`.
//!
//! ## Usage
//! ```rust
//! use kernel_alloc::vmm::MemoryManager;
//! use kernel_vmem::ReplacementPolicy;
//!
//! let mut mm = MemoryManager::new().with_policy(ReplacementPolicy::Fifo);
//! mm.create_process("A", &[4096]).unwrap();
//! mm.create_process("B", &[2048, 2048]).unwrap();
//! assert_eq!(mm.frames().unoccupied_count(), 64 - 8);
//!
//! mm.destroy_process("A").unwrap();
//! assert_eq!(mm.processes().map(|p| p.as_str()).collect::<Vec<_>>(), ["B"]);
//! ```

#![cfg_attr(not(any(test, doctest)), no_std)]

extern crate alloc;

pub mod frame_alloc;
pub mod shared;
pub mod snapshot;
pub mod vmm;

pub use kernel_vmem::{PagingEvent, PagingStore, ReplacementPolicy};
