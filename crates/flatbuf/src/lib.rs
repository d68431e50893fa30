//! flatbuf: fixed-shape rank 1–3 arrays over manually managed memory.
//!
//! This is the top-level facade crate that re-exports the public API from
//! all flatbuf sub-crates. For most users, adding `flatbuf` as a single
//! dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use flatbuf::prelude::*;
//!
//! let mut grid = FlatBuffer2D::<f32>::new(16, 22, AllocatorKind::Persistent).unwrap();
//! grid.set((3, 4), 1.5).unwrap();
//! assert_eq!(grid.get((3, 4)).unwrap(), 1.5);
//!
//! // Shallow copies die with their owner.
//! let view = grid.alias_read_only().unwrap();
//! grid.dispose().unwrap();
//! assert_eq!(view.get((3, 4)), Err(FlatBufferError::UseAfterDispose));
//! assert_eq!(grid.dispose(), Err(FlatBufferError::UseAfterDispose));
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `flatbuf-core` | Errors, allocator kinds, the `Blittable` contract |
//! | [`alloc`] | `flatbuf-alloc` | `Allocator` trait, system and tracking allocators |
//! | [`array`] | `flatbuf-array` | `FlatBuffer`, shapes, aliases, safety handles |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core types (`flatbuf-core`).
pub use flatbuf_core as types;

/// Allocator abstraction and implementations (`flatbuf-alloc`).
pub use flatbuf_alloc as alloc;

/// Containers, shapes and safety handles (`flatbuf-array`).
pub use flatbuf_array as array;

/// Common imports for working with flat buffers.
pub mod prelude {
    pub use flatbuf_alloc::{Allocator, SystemAllocator, TrackingAllocator};
    pub use flatbuf_array::{
        BufferConfig, FlatAlias, FlatBuffer, FlatBuffer1D, FlatBuffer2D, FlatBuffer3D, Shape,
        Shape1, Shape2, Shape3,
    };
    pub use flatbuf_core::{AllocatorKind, Axis, Blittable, FlatBufferError};
}
