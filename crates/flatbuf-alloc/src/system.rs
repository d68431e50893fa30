//! Heap-backed allocator over `std::alloc`.

use std::alloc::{self, Layout};
use std::ptr::{self, NonNull};
use std::sync::{Arc, LazyLock};

use flatbuf_core::{AllocError, AllocatorKind};

use crate::allocator::Allocator;

/// Allocator backed by the global Rust heap.
///
/// Every usable kind is served from the same heap; the kind only has to be
/// recognised. Zero-sized layouts get an aligned dangling address and never
/// reach the heap.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemAllocator;

impl Allocator for SystemAllocator {
    fn allocate(&self, layout: Layout, kind: AllocatorKind) -> Result<NonNull<u8>, AllocError> {
        if !kind.is_usable() {
            return Err(AllocError::UnsupportedKind { kind });
        }
        if layout.size() == 0 {
            return Ok(dangling(layout));
        }
        // SAFETY: layout has non-zero size.
        let raw = unsafe { alloc::alloc(layout) };
        let ptr = NonNull::new(raw).ok_or(AllocError::OutOfMemory {
            size: layout.size(),
            align: layout.align(),
        })?;
        log::trace!(
            "system: allocated {} bytes ({kind}) at {:p}",
            layout.size(),
            ptr
        );
        Ok(ptr)
    }

    unsafe fn deallocate(
        &self,
        ptr: NonNull<u8>,
        layout: Layout,
        kind: AllocatorKind,
    ) -> Result<(), AllocError> {
        if layout.size() == 0 {
            return Ok(());
        }
        log::trace!(
            "system: releasing {} bytes ({kind}) at {:p}",
            layout.size(),
            ptr
        );
        // SAFETY: the caller guarantees `ptr` came from `allocate` with this
        // layout, which used `alloc::alloc` for non-zero sizes.
        unsafe { alloc::dealloc(ptr.as_ptr(), layout) };
        Ok(())
    }

    fn name(&self) -> &'static str {
        "system"
    }
}

/// A non-null address aligned for `layout`, valid for zero-byte accesses.
fn dangling(layout: Layout) -> NonNull<u8> {
    // Alignment is a non-zero power of two.
    NonNull::new(ptr::without_provenance_mut(layout.align())).unwrap_or(NonNull::dangling())
}

static DEFAULT_ALLOCATOR: LazyLock<Arc<dyn Allocator>> =
    LazyLock::new(|| Arc::new(SystemAllocator));

/// The process-wide allocator used when a container is built without one.
pub fn default_allocator() -> Arc<dyn Allocator> {
    Arc::clone(&DEFAULT_ALLOCATOR)
}
