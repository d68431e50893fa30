//! Error types for flat buffers and their allocators.
//!
//! [`FlatBufferError`] is the taxonomy surfaced by every container
//! operation. [`AllocError`] is produced by allocator implementations and
//! wrapped in [`FlatBufferError::Allocation`] when it reaches a container.

use std::error::Error;
use std::fmt;

use crate::kind::AllocatorKind;

/// Names the axis an out-of-range index was checked against.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Axis {
    /// First coordinate (size for rank 1, width for ranks 2 and 3).
    X,
    /// Second coordinate (height).
    Y,
    /// Third coordinate (depth).
    Z,
    /// Flat storage index or element count.
    Flat,
}

impl Axis {
    /// Name of the dimension bounding this axis.
    pub fn dimension(self) -> &'static str {
        match self {
            Self::X => "width",
            Self::Y => "height",
            Self::Z => "depth",
            Self::Flat => "length",
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::X => f.write_str("x"),
            Self::Y => f.write_str("y"),
            Self::Z => f.write_str("z"),
            Self::Flat => f.write_str("flat index"),
        }
    }
}

/// Errors that can occur during flat buffer operations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FlatBufferError {
    /// A construction argument was rejected: negative dimension, element
    /// count overflow, unusable allocator kind or non-blittable element.
    InvalidArgument {
        /// The offending argument.
        argument: &'static str,
        /// Human-readable description of the problem.
        reason: String,
    },
    /// A coordinate or count fell outside `[0, bound)` on one axis.
    IndexOutOfRange {
        /// Which axis failed.
        axis: Axis,
        /// The rejected value.
        index: i64,
        /// The exclusive upper bound for that axis.
        bound: usize,
    },
    /// The buffer has been disposed, or was never constructed.
    UseAfterDispose,
    /// A write was attempted through a read-only alias.
    ReadOnly,
    /// A copy would write past the end of the destination.
    DestinationTooSmall {
        /// Number of elements requested.
        count: usize,
        /// Destination capacity in elements.
        capacity: usize,
    },
    /// The allocator could not satisfy or accept a request.
    Allocation(AllocError),
}

impl fmt::Display for FlatBufferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidArgument { argument, reason } => {
                write!(f, "invalid argument '{argument}': {reason}")
            }
            Self::IndexOutOfRange { axis, index, bound } => {
                write!(
                    f,
                    "{axis} {index} is out of range [0, {bound}) for {}",
                    axis.dimension()
                )
            }
            Self::UseAfterDispose => {
                write!(f, "flat buffer has been disposed or was never created")
            }
            Self::ReadOnly => write!(f, "flat buffer alias is read-only"),
            Self::DestinationTooSmall { count, capacity } => {
                write!(
                    f,
                    "cannot copy {count} elements into a buffer of {capacity}"
                )
            }
            Self::Allocation(e) => write!(f, "allocation failed: {e}"),
        }
    }
}

impl Error for FlatBufferError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Allocation(e) => Some(e),
            _ => None,
        }
    }
}

impl From<AllocError> for FlatBufferError {
    fn from(e: AllocError) -> Self {
        Self::Allocation(e)
    }
}

/// Errors reported by allocator implementations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AllocError {
    /// The allocator was asked to serve a kind it does not support.
    UnsupportedKind {
        /// The rejected kind.
        kind: AllocatorKind,
    },
    /// The underlying heap returned no memory.
    OutOfMemory {
        /// Bytes requested.
        size: usize,
        /// Alignment requested.
        align: usize,
    },
    /// A byte budget would be exceeded.
    Exhausted {
        /// Bytes requested.
        requested: usize,
        /// Bytes still available under the budget.
        available: usize,
    },
    /// A release named an address this allocator does not own.
    UnknownBlock {
        /// The released address.
        address: usize,
    },
    /// A release named a block with a different kind or layout than it
    /// was allocated with.
    Mismatch {
        /// The released address.
        address: usize,
        /// Description of the mismatch.
        reason: String,
    },
}

impl fmt::Display for AllocError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedKind { kind } => {
                write!(f, "allocator kind '{kind}' cannot back an allocation")
            }
            Self::OutOfMemory { size, align } => {
                write!(f, "out of memory: {size} bytes aligned to {align}")
            }
            Self::Exhausted {
                requested,
                available,
            } => {
                write!(
                    f,
                    "budget exhausted: requested {requested} bytes, {available} bytes available"
                )
            }
            Self::UnknownBlock { address } => {
                write!(f, "release of unknown block {address:#x}")
            }
            Self::Mismatch { address, reason } => {
                write!(f, "release of block {address:#x} does not match: {reason}")
            }
        }
    }
}

impl Error for AllocError {}
