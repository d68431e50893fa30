//! Allocator abstraction backing flatbuf containers.
//!
//! Containers never talk to the global heap directly. They ask an
//! [`Allocator`] for a block sized and aligned for their elements, tagged
//! with the [`AllocatorKind`](flatbuf_core::AllocatorKind) that selects the
//! pool, and hand the same layout and kind back on release.
//!
//! ```text
//! Allocator (trait)
//! ├── SystemAllocator   std::alloc, zero-sized blocks never touch the heap
//! └── TrackingAllocator<A>
//!     └── live-block table + per-kind stats + optional byte budget
//! ```
//!
//! This crate and `flatbuf-array` are the only crates that contain
//! `unsafe` code.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod allocator;
pub mod system;
pub mod tracking;

pub use allocator::{Allocator, AllocatorExt};
pub use system::{default_allocator, SystemAllocator};
pub use tracking::{KindStats, LiveBlock, TrackingAllocator};
