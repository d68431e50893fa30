//! The owning flat buffer.
//!
//! [`FlatBuffer`] owns one zero-initialised block sized for its [`Shape`]
//! and is the only value that can release it. It is move-only: passing it
//! to another routine moves ownership, and shallow copies are explicit
//! [`FlatAlias`] values whose safety token dies with the owner.
//!
//! # Lifecycle
//!
//! ```text
//! new / with_config ──► zero-filled ──► get / set / clear / copy_from / to_vec
//!                                              │
//!                             dispose() ◄──────┘   (or drop: released + warning)
//!                                 │
//!                                 └─► token retired, block released,
//!                                     shape zeroed, is_created() == false
//! ```

#![allow(unsafe_code)]

use std::fmt;
use std::sync::Arc;

use flatbuf_alloc::Allocator;
use flatbuf_core::{AllocatorKind, Axis, Blittable, ElementLayout, FlatBufferError};

use crate::alias::FlatAlias;
use crate::config::BufferConfig;
use crate::raw::{RawBlock, RawView};
use crate::safety::SafetyHandle;
use crate::shape::{Dims, Shape, Shape1, Shape2, Shape3};

/// Rank-1 flat buffer addressed by `x`.
pub type FlatBuffer1D<T> = FlatBuffer<T, Shape1>;

/// Rank-2 flat buffer addressed by `(x, y)` at `x * height + y`.
pub type FlatBuffer2D<T> = FlatBuffer<T, Shape2>;

/// Rank-3 flat buffer addressed by `(x, y, z)` at `z * width * height + y * width + x`.
pub type FlatBuffer3D<T> = FlatBuffer<T, Shape3>;

/// A fixed-shape array over one manually managed memory block.
pub struct FlatBuffer<T: Blittable, S: Shape> {
    block: Option<RawBlock<T>>,
    shape: S,
    safety: SafetyHandle,
    warn_on_leak: bool,
}

impl<T: Blittable, S: Shape> FlatBuffer<T, S> {
    /// Allocate a zero-filled buffer of `shape` from the default allocator.
    pub fn with_shape(shape: S, kind: AllocatorKind) -> Result<Self, FlatBufferError> {
        Self::with_config(shape, BufferConfig::new(kind))
    }

    /// Allocate a zero-filled buffer of `shape` from `allocator`.
    pub fn with_allocator(
        shape: S,
        kind: AllocatorKind,
        allocator: Arc<dyn Allocator>,
    ) -> Result<Self, FlatBufferError> {
        Self::with_config(shape, BufferConfig::new(kind).with_allocator(allocator))
    }

    /// Allocate a zero-filled buffer of `shape` as described by `config`.
    ///
    /// Rejects an unusable allocator kind, an element type that cannot be
    /// stored byte-for-byte, and shapes whose byte size is not addressable.
    /// Allocation failures are returned as [`FlatBufferError::Allocation`].
    pub fn with_config(shape: S, config: BufferConfig) -> Result<Self, FlatBufferError> {
        config.validate()?;
        let element = ElementLayout::validated::<T>()?;
        let block = RawBlock::allocate(shape.len(), config.kind, config.resolve_allocator())?;
        let safety = SafetyHandle::create();
        log::debug!(
            "flat buffer {:?} of {} created: {} bytes, stride {}, align {}, {} via {}, generation {}",
            shape.dims().as_slice(),
            std::any::type_name::<T>(),
            block.byte_len(),
            element.size,
            element.align,
            config.kind,
            block.allocator_name(),
            safety.generation()
        );
        Ok(Self {
            block: Some(block),
            shape,
            safety,
            warn_on_leak: config.warn_on_leak,
        })
    }

    /// Read the element at `coord`.
    pub fn get(&self, coord: S::Coord) -> Result<T, FlatBufferError> {
        #[cfg(feature = "checks")]
        self.safety.check_read()?;
        let view = self.view()?;
        let index = self.shape.locate(coord)?;
        // SAFETY: `locate` bounds `index` by the shape length, which equals
        // the live block's length.
        Ok(unsafe { view.read(index) })
    }

    /// Overwrite the element at `coord`.
    pub fn set(&mut self, coord: S::Coord, value: T) -> Result<(), FlatBufferError> {
        #[cfg(feature = "checks")]
        self.safety.check_write()?;
        let view = self.view()?;
        let index = self.shape.locate(coord)?;
        // SAFETY: as in `get`.
        unsafe { view.write(index, value) };
        Ok(())
    }

    /// Zero-fill every element.
    pub fn clear(&mut self) -> Result<(), FlatBufferError> {
        #[cfg(feature = "checks")]
        self.safety.check_write()?;
        let view = self.view()?;
        // SAFETY: the block is live.
        unsafe { view.zero() };
        Ok(())
    }

    /// Copy the first `count` flat elements of `source` into the first
    /// `count` flat slots of `self`, leaving the rest untouched.
    ///
    /// `count` must be strictly less than `source.len()`; a full-length copy
    /// is rejected with `IndexOutOfRange { axis: Flat, .. }`. A `count`
    /// larger than this buffer fails with `DestinationTooSmall`.
    pub fn copy_from(&mut self, source: &Self, count: usize) -> Result<(), FlatBufferError> {
        #[cfg(feature = "checks")]
        {
            self.safety.check_write()?;
            source.safety.check_read()?;
        }
        let dst = self.view()?;
        let src = source.view()?;
        if count >= src.len() {
            return Err(FlatBufferError::IndexOutOfRange {
                axis: Axis::Flat,
                index: count as i64,
                bound: src.len(),
            });
        }
        if count > dst.len() {
            return Err(FlatBufferError::DestinationTooSmall {
                count,
                capacity: dst.len(),
            });
        }
        // SAFETY: both blocks are live and `count` is within both lengths.
        unsafe { dst.copy_from(&src, count) };
        Ok(())
    }

    /// Snapshot every element in flat storage order.
    pub fn to_vec(&self) -> Result<Vec<T>, FlatBufferError> {
        #[cfg(feature = "checks")]
        self.safety.check_read()?;
        let view = self.view()?;
        // SAFETY: the block is live.
        Ok(unsafe { view.to_vec() })
    }

    /// Retire the safety token, release the block and zero the shape.
    ///
    /// Disposing twice, or disposing a default buffer, fails with
    /// `UseAfterDispose` and leaves the allocator untouched. This check is
    /// active in every build.
    pub fn dispose(&mut self) -> Result<(), FlatBufferError> {
        self.safety.release()?;
        let block = self.block.take().ok_or(FlatBufferError::UseAfterDispose)?;
        log::debug!(
            "flat buffer {:?} disposed: {} bytes back to {}",
            self.shape.dims().as_slice(),
            block.byte_len(),
            block.kind()
        );
        self.shape = S::default();
        block.release()
    }

    /// Whether the buffer owns a block. Does not validate the safety token.
    pub fn is_created(&self) -> bool {
        self.block.is_some()
    }

    /// A read-write shallow copy sharing this buffer's block and token.
    pub fn alias(&self) -> Result<FlatAlias<T, S>, FlatBufferError> {
        self.safety.check_read()?;
        Ok(FlatAlias::new(self.view()?, self.shape, self.safety.clone()))
    }

    /// A read-only shallow copy sharing this buffer's block and token.
    pub fn alias_read_only(&self) -> Result<FlatAlias<T, S>, FlatBufferError> {
        self.safety.check_read()?;
        Ok(FlatAlias::new(
            self.view()?,
            self.shape,
            self.safety.read_only(),
        ))
    }

    /// Total element count; zero once disposed.
    pub fn len(&self) -> usize {
        self.shape.len()
    }

    /// Whether the buffer holds no elements.
    pub fn is_empty(&self) -> bool {
        self.shape.is_empty()
    }

    /// The buffer's shape; all-zero once disposed.
    pub fn shape(&self) -> S {
        self.shape
    }

    /// Dimensions in axis order.
    pub fn dims(&self) -> Dims {
        self.shape.dims()
    }

    /// Byte size of one element.
    pub fn stride(&self) -> usize {
        ElementLayout::of::<T>().size
    }

    /// Layout of one element.
    pub fn element_layout(&self) -> ElementLayout {
        ElementLayout::of::<T>()
    }

    /// Byte size of the owned block; zero once disposed.
    pub fn byte_len(&self) -> usize {
        self.block.as_ref().map_or(0, RawBlock::byte_len)
    }

    /// Allocator kind backing the block, or `None` if not created.
    pub fn kind(&self) -> AllocatorKind {
        self.block
            .as_ref()
            .map_or(AllocatorKind::None, RawBlock::kind)
    }

    /// The safety handle guarding this buffer.
    pub fn safety(&self) -> &SafetyHandle {
        &self.safety
    }

    fn view(&self) -> Result<RawView<T>, FlatBufferError> {
        self.block
            .as_ref()
            .map(RawBlock::view)
            .ok_or(FlatBufferError::UseAfterDispose)
    }
}

impl<T: Blittable> FlatBuffer<T, Shape1> {
    /// Allocate a zero-filled rank-1 buffer of `size` elements.
    pub fn new(size: i32, kind: AllocatorKind) -> Result<Self, FlatBufferError> {
        Self::with_shape(Shape1::new(size)?, kind)
    }

    /// Number of elements.
    pub fn size(&self) -> usize {
        self.shape.size()
    }
}

impl<T: Blittable> FlatBuffer<T, Shape2> {
    /// Allocate a zero-filled `width × height` buffer.
    pub fn new(width: i32, height: i32, kind: AllocatorKind) -> Result<Self, FlatBufferError> {
        Self::with_shape(Shape2::new(width, height)?, kind)
    }

    /// Extent along `x`.
    pub fn width(&self) -> usize {
        self.shape.width()
    }

    /// Extent along `y`.
    pub fn height(&self) -> usize {
        self.shape.height()
    }
}

impl<T: Blittable> FlatBuffer<T, Shape3> {
    /// Allocate a zero-filled `width × height × depth` buffer.
    pub fn new(
        width: i32,
        height: i32,
        depth: i32,
        kind: AllocatorKind,
    ) -> Result<Self, FlatBufferError> {
        Self::with_shape(Shape3::new(width, height, depth)?, kind)
    }

    /// Extent along `x`.
    pub fn width(&self) -> usize {
        self.shape.width()
    }

    /// Extent along `y`.
    pub fn height(&self) -> usize {
        self.shape.height()
    }

    /// Extent along `z`.
    pub fn depth(&self) -> usize {
        self.shape.depth()
    }
}

impl<T: Blittable, S: Shape> Default for FlatBuffer<T, S> {
    /// A never-constructed buffer: not created, every access fails.
    fn default() -> Self {
        Self {
            block: None,
            shape: S::default(),
            safety: SafetyHandle::invalid(),
            warn_on_leak: BufferConfig::DEFAULT_WARN_ON_LEAK,
        }
    }
}

impl<T: Blittable, S: Shape> Drop for FlatBuffer<T, S> {
    fn drop(&mut self) {
        let Some(block) = self.block.take() else {
            return;
        };
        if self.warn_on_leak {
            log::warn!(
                "flat buffer {:?} of {} dropped without dispose(); releasing {} bytes",
                self.shape.dims().as_slice(),
                std::any::type_name::<T>(),
                block.byte_len()
            );
        }
        // Retire the token before the block goes so aliases fail cleanly.
        let _ = self.safety.release();
        if let Err(e) = block.release() {
            log::error!("flat buffer release on drop failed: {e}");
        }
    }
}

impl<T: Blittable + fmt::Debug, S: Shape> fmt::Debug for FlatBuffer<T, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let alternate = f.alternate();
        let mut d = f.debug_struct("FlatBuffer");
        d.field("shape", &self.shape.dims().as_slice())
            .field("kind", &self.kind())
            .field("created", &self.is_created());
        if alternate {
            if let Ok(items) = self.to_vec() {
                d.field("items", &items);
            }
        }
        d.finish()
    }
}
