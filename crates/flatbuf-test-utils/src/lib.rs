//! Test utilities and fixtures for flatbuf development.
//!
//! Provides a blittable struct element ([`Probe`]) and constructors for
//! tracked allocators, so tests can assert that every block a container
//! allocates is released exactly once.

#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

use std::sync::Arc;

use flatbuf_alloc::{Allocator, SystemAllocator, TrackingAllocator};
use flatbuf_core::Blittable;

/// A small `#[repr(C)]` element with mixed field types.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[repr(C)]
pub struct Probe {
    pub id: u32,
    pub weight: f32,
}

impl Probe {
    pub fn new(id: u32, weight: f32) -> Self {
        Self { id, weight }
    }
}

// SAFETY: repr(C) struct of two blittable fields; all-zero is a valid Probe.
#[allow(unsafe_code)]
unsafe impl Blittable for Probe {}

/// A tracking allocator over the system heap, returned twice: once
/// concretely for assertions and once as the trait object containers take.
pub fn tracked() -> (Arc<TrackingAllocator>, Arc<dyn Allocator>) {
    let tracker = Arc::new(TrackingAllocator::system());
    let allocator: Arc<dyn Allocator> = tracker.clone();
    (tracker, allocator)
}

/// Like [`tracked`], refusing allocations past `budget` live bytes.
pub fn budgeted(budget: usize) -> (Arc<TrackingAllocator>, Arc<dyn Allocator>) {
    let tracker = Arc::new(TrackingAllocator::with_budget(SystemAllocator, budget));
    let allocator: Arc<dyn Allocator> = tracker.clone();
    (tracker, allocator)
}

/// Panic with the outstanding blocks if `tracker` still holds any.
pub fn assert_released(tracker: &TrackingAllocator) {
    assert!(
        tracker.is_quiescent(),
        "{} block(s) still live: {:?}",
        tracker.live_blocks(),
        tracker.live()
    );
}
