//! Core types for the flatbuf workspace.
//!
//! This is the leaf crate with zero internal dependencies. It defines the
//! vocabulary shared by the allocator layer and the containers: the
//! allocator-strategy selector ([`AllocatorKind`]), the element contract
//! ([`Blittable`], [`ElementLayout`]) and the error taxonomy
//! ([`FlatBufferError`], [`AllocError`]).

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

pub mod element;
pub mod error;
pub mod kind;

pub use element::{Blittable, ElementLayout};
pub use error::{AllocError, Axis, FlatBufferError};
pub use kind::AllocatorKind;
