//! Shallow copies of a flat buffer.
//!
//! A [`FlatAlias`] shares its owner's block and safety token but owns
//! neither: it cannot dispose, and once the owner is disposed or dropped
//! every alias operation fails with `UseAfterDispose`. The token check runs
//! in every build, since it is all that stands between an alias and a
//! released block.
//!
//! Aliases are `!Send` and `!Sync`; they are meant for handing a view of a
//! buffer to code on the same thread without transferring ownership.

#![allow(unsafe_code)]

use flatbuf_core::{Blittable, FlatBufferError};

use crate::raw::RawView;
use crate::safety::{Access, SafetyHandle};
use crate::shape::Shape;

/// A non-owning, clonable view of a [`FlatBuffer`](crate::FlatBuffer).
pub struct FlatAlias<T: Blittable, S: Shape> {
    view: RawView<T>,
    shape: S,
    safety: SafetyHandle,
}

impl<T: Blittable, S: Shape> FlatAlias<T, S> {
    pub(crate) fn new(view: RawView<T>, shape: S, safety: SafetyHandle) -> Self {
        Self {
            view,
            shape,
            safety,
        }
    }

    /// Read the element at `coord`.
    pub fn get(&self, coord: S::Coord) -> Result<T, FlatBufferError> {
        self.safety.check_read()?;
        let index = self.shape.locate(coord)?;
        // SAFETY: the token is valid, so the owner has not released the
        // block, and `index` is within the shape length.
        Ok(unsafe { self.view.read(index) })
    }

    /// Overwrite the element at `coord`. Fails with `ReadOnly` on a
    /// read-only alias.
    pub fn set(&self, coord: S::Coord, value: T) -> Result<(), FlatBufferError> {
        self.safety.check_write()?;
        let index = self.shape.locate(coord)?;
        // SAFETY: as in `get`.
        unsafe { self.view.write(index, value) };
        Ok(())
    }

    /// Zero-fill every element.
    pub fn clear(&self) -> Result<(), FlatBufferError> {
        self.safety.check_write()?;
        // SAFETY: the token is valid.
        unsafe { self.view.zero() };
        Ok(())
    }

    /// Snapshot every element in flat storage order.
    pub fn to_vec(&self) -> Result<Vec<T>, FlatBufferError> {
        self.safety.check_read()?;
        // SAFETY: the token is valid.
        Ok(unsafe { self.view.to_vec() })
    }

    /// Whether the owner is still live.
    pub fn is_valid(&self) -> bool {
        self.safety.is_valid()
    }

    /// Whether writes through this alias are refused.
    pub fn is_read_only(&self) -> bool {
        self.safety.access() == Access::ReadOnly
    }

    /// The owner's shape at the time the alias was taken.
    pub fn shape(&self) -> S {
        self.shape
    }

    /// Total element count.
    pub fn len(&self) -> usize {
        self.shape.len()
    }

    /// Whether the alias views no elements.
    pub fn is_empty(&self) -> bool {
        self.shape.is_empty()
    }
}

impl<T: Blittable, S: Shape> Clone for FlatAlias<T, S> {
    fn clone(&self) -> Self {
        Self {
            view: self.view,
            shape: self.shape,
            safety: self.safety.clone(),
        }
    }
}

impl<T: Blittable, S: Shape> std::fmt::Debug for FlatAlias<T, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlatAlias")
            .field("shape", &self.shape.dims().as_slice())
            .field("safety", &self.safety)
            .finish()
    }
}
