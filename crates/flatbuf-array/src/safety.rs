//! Generation-stamped safety tokens.
//!
//! Every live buffer owns a [`SafetyHandle`] minted at construction. Aliases
//! of the buffer carry clones of the handle. Disposal releases the owner's
//! handle, which retires its generation in the shared cell: from then on
//! every clone fails its check with
//! [`FlatBufferError::UseAfterDispose`] instead of touching a released
//! block.

use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use flatbuf_core::FlatBufferError;

/// Source of fresh generations. Zero is reserved for "released".
static NEXT_GENERATION: AtomicU32 = AtomicU32::new(1);

fn next_generation() -> u32 {
    loop {
        let generation = NEXT_GENERATION.fetch_add(1, Ordering::Relaxed);
        if generation != RELEASED {
            return generation;
        }
    }
}

const RELEASED: u32 = 0;

struct SafetyCell {
    generation: AtomicU32,
}

/// Whether a handle permits writes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Access {
    /// Reads and writes are allowed.
    ReadWrite,
    /// Only reads are allowed.
    ReadOnly,
}

/// A validity token tied to one buffer's lifetime.
///
/// Handles are minted and retired only by the owning buffer; a clone can
/// inspect the token but never release it.
///
/// ```compile_fail
/// use flatbuf_array::{FlatBuffer1D, SafetyHandle};
/// use flatbuf_core::AllocatorKind;
///
/// let buf = FlatBuffer1D::<i32>::new(4, AllocatorKind::Scoped).unwrap();
/// let mut handle: SafetyHandle = buf.safety().clone();
/// handle.release().unwrap();
/// ```
#[derive(Clone)]
pub struct SafetyHandle {
    cell: Option<Arc<SafetyCell>>,
    generation: u32,
    access: Access,
}

impl SafetyHandle {
    /// Mint a fresh read-write handle with a new generation.
    pub(crate) fn create() -> Self {
        let generation = next_generation();
        Self {
            cell: Some(Arc::new(SafetyCell {
                generation: AtomicU32::new(generation),
            })),
            generation,
            access: Access::ReadWrite,
        }
    }

    /// A handle that never validates, as held by a default buffer.
    pub(crate) fn invalid() -> Self {
        Self {
            cell: None,
            generation: RELEASED,
            access: Access::ReadWrite,
        }
    }

    /// The generation this handle was minted with.
    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// Access granted by this handle.
    pub fn access(&self) -> Access {
        self.access
    }

    /// Whether the buffer this handle guards is still live.
    pub fn is_valid(&self) -> bool {
        self.cell
            .as_ref()
            .is_some_and(|cell| cell.generation.load(Ordering::Acquire) == self.generation)
    }

    /// Fail unless reads are allowed.
    pub fn check_read(&self) -> Result<(), FlatBufferError> {
        if self.is_valid() {
            Ok(())
        } else {
            Err(FlatBufferError::UseAfterDispose)
        }
    }

    /// Fail unless writes are allowed.
    pub fn check_write(&self) -> Result<(), FlatBufferError> {
        self.check_read()?;
        match self.access {
            Access::ReadWrite => Ok(()),
            Access::ReadOnly => Err(FlatBufferError::ReadOnly),
        }
    }

    /// A clone of this handle that only permits reads.
    pub fn read_only(&self) -> Self {
        Self {
            access: Access::ReadOnly,
            ..self.clone()
        }
    }

    /// Retire this handle's generation, invalidating every clone.
    ///
    /// Fails with `UseAfterDispose` if the generation was already retired
    /// or the handle never validated.
    pub(crate) fn release(&mut self) -> Result<(), FlatBufferError> {
        let cell = self.cell.take().ok_or(FlatBufferError::UseAfterDispose)?;
        cell.generation
            .compare_exchange(
                self.generation,
                RELEASED,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .map(|_| ())
            .map_err(|_| FlatBufferError::UseAfterDispose)
    }
}

impl Default for SafetyHandle {
    fn default() -> Self {
        Self::invalid()
    }
}

impl fmt::Debug for SafetyHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SafetyHandle")
            .field("generation", &self.generation)
            .field("access", &self.access)
            .field("valid", &self.is_valid())
            .finish()
    }
}
