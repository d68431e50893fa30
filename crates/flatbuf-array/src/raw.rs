//! Raw block primitives. The only module that dereferences buffer memory.
//!
//! [`RawView`] is a copyable (address, length) pair shared by an owner and
//! its aliases. [`RawBlock`] adds what is needed to give the memory back:
//! layout, kind and allocator. No function here hands out references into
//! the block, so interleaved owner and alias accesses on one thread never
//! alias a live `&`/`&mut`.

#![allow(unsafe_code)]

use std::alloc::Layout;
use std::ptr::{self, NonNull};
use std::sync::Arc;

use flatbuf_alloc::{Allocator, AllocatorExt};
use flatbuf_core::{AllocatorKind, Blittable, FlatBufferError};

/// Address and element count of a zero-initialised block.
pub(crate) struct RawView<T> {
    ptr: NonNull<T>,
    len: usize,
}

impl<T> Clone for RawView<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for RawView<T> {}

impl<T: Blittable> RawView<T> {
    pub(crate) fn len(&self) -> usize {
        self.len
    }

    /// # Safety
    ///
    /// `index < len` and the block has not been released.
    pub(crate) unsafe fn read(&self, index: usize) -> T {
        debug_assert!(index < self.len);
        // SAFETY: upheld by caller; T is Copy and any bit pattern written
        // through `write` or zero-fill is a valid T.
        unsafe { self.ptr.as_ptr().add(index).read() }
    }

    /// # Safety
    ///
    /// `index < len` and the block has not been released.
    pub(crate) unsafe fn write(&self, index: usize, value: T) {
        debug_assert!(index < self.len);
        // SAFETY: upheld by caller.
        unsafe { self.ptr.as_ptr().add(index).write(value) }
    }

    /// # Safety
    ///
    /// The block has not been released.
    pub(crate) unsafe fn zero(&self) {
        // SAFETY: the block spans `len` elements; zero is a valid T.
        unsafe { ptr::write_bytes(self.ptr.as_ptr(), 0, self.len) }
    }

    /// # Safety
    ///
    /// The block has not been released.
    pub(crate) unsafe fn to_vec(&self) -> Vec<T> {
        let mut out = Vec::with_capacity(self.len);
        // SAFETY: the source spans `len` initialised elements, the vec has
        // capacity for `len`, and a fresh vec cannot overlap the block.
        unsafe {
            ptr::copy_nonoverlapping(self.ptr.as_ptr(), out.as_mut_ptr(), self.len);
            out.set_len(self.len);
        }
        out
    }

    /// Copy the first `count` elements of `source` into the front of `self`.
    ///
    /// # Safety
    ///
    /// Neither block has been released, `count` is within both lengths.
    pub(crate) unsafe fn copy_from(&self, source: &RawView<T>, count: usize) {
        debug_assert!(count <= self.len && count <= source.len);
        // SAFETY: upheld by caller. `ptr::copy` tolerates overlap.
        unsafe { ptr::copy(source.ptr.as_ptr(), self.ptr.as_ptr(), count) }
    }
}

/// An allocated block together with everything needed to release it.
pub(crate) struct RawBlock<T> {
    view: RawView<T>,
    layout: Layout,
    kind: AllocatorKind,
    allocator: Arc<dyn Allocator>,
}

impl<T: Blittable> RawBlock<T> {
    /// Allocate and zero-fill a block for `len` elements of `T`.
    pub(crate) fn allocate(
        len: usize,
        kind: AllocatorKind,
        allocator: Arc<dyn Allocator>,
    ) -> Result<Self, FlatBufferError> {
        let layout = Layout::array::<T>(len).map_err(|_| FlatBufferError::InvalidArgument {
            argument: "shape",
            reason: format!(
                "{len} elements of {} bytes exceed the addressable range",
                std::mem::size_of::<T>()
            ),
        })?;
        let ptr = allocator.allocate_zeroed(layout, kind)?.cast::<T>();
        Ok(Self {
            view: RawView { ptr, len },
            layout,
            kind,
            allocator,
        })
    }

    pub(crate) fn view(&self) -> RawView<T> {
        self.view
    }

    pub(crate) fn kind(&self) -> AllocatorKind {
        self.kind
    }

    pub(crate) fn byte_len(&self) -> usize {
        self.layout.size()
    }

    pub(crate) fn allocator_name(&self) -> &'static str {
        self.allocator.name()
    }

    /// Hand the block back to the allocator that produced it.
    pub(crate) fn release(self) -> Result<(), FlatBufferError> {
        // SAFETY: `self` is consumed, so the block is released exactly once,
        // with the layout and kind it was allocated with.
        unsafe {
            self.allocator
                .deallocate(self.view.ptr.cast(), self.layout, self.kind)?
        };
        Ok(())
    }
}
