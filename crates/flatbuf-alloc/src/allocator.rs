//! The [`Allocator`] trait.

use std::alloc::Layout;
use std::fmt;
use std::ptr::NonNull;

use flatbuf_core::{AllocError, AllocatorKind};

/// Maps an allocator kind plus a layout to a raw block and back.
///
/// Implementations must tolerate concurrent `allocate`/`deallocate` calls
/// from unrelated containers.
pub trait Allocator: Send + Sync + fmt::Debug {
    /// Allocate a block for `layout` from the pool selected by `kind`.
    ///
    /// The contents of the returned block are unspecified. Zero-sized
    /// layouts must still return a non-null address aligned to
    /// `layout.align()`.
    fn allocate(&self, layout: Layout, kind: AllocatorKind) -> Result<NonNull<u8>, AllocError>;

    /// Release a block previously returned by [`allocate`](Self::allocate).
    ///
    /// # Safety
    ///
    /// `ptr` must have been returned by `allocate` on this allocator with
    /// the same `layout` and `kind`, and must not have been released yet.
    /// Implementations that can detect a violation should report it
    /// rather than touch the heap.
    unsafe fn deallocate(
        &self,
        ptr: NonNull<u8>,
        layout: Layout,
        kind: AllocatorKind,
    ) -> Result<(), AllocError>;

    /// Allocator name for diagnostics.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// Convenience operations available on every [`Allocator`].
pub trait AllocatorExt: Allocator {
    /// Allocate a block and zero-fill it.
    fn allocate_zeroed(
        &self,
        layout: Layout,
        kind: AllocatorKind,
    ) -> Result<NonNull<u8>, AllocError> {
        let ptr = self.allocate(layout, kind)?;
        // SAFETY: `allocate` returned a block valid for `layout.size()` bytes.
        unsafe {
            std::ptr::write_bytes(ptr.as_ptr(), 0, layout.size());
        }
        Ok(ptr)
    }
}

impl<A: Allocator + ?Sized> AllocatorExt for A {}
