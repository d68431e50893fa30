//! Fixed-shape rank 1–3 arrays over manually managed memory blocks.
//!
//! A [`FlatBuffer`] requests one block from an
//! [`Allocator`](flatbuf_alloc::Allocator), zero-fills it, and exposes
//! typed element access through a rank-specific address function. A
//! generation-stamped [`SafetyHandle`] is checked before every access and
//! retired on disposal, so use-after-dispose and double-dispose are
//! reported as errors instead of touching released memory.
//!
//! # Architecture
//!
//! ```text
//! FlatBuffer<T, S: Shape>   (owner, move-only, dispose / Drop release)
//! ├── RawBlock<T>           ptr + layout + kind + Arc<dyn Allocator>
//! ├── S: Shape1 | Shape2 | Shape3   dimension checks + address function
//! ├── SafetyHandle          Arc'd generation cell, retired on dispose
//! └── FlatAlias<T, S>       shallow copies: RawView + cloned SafetyHandle
//! ```
//!
//! # Checked and trusted builds
//!
//! With the default `checks` feature every owner access validates the
//! safety token and each coordinate axis, naming the failing axis. Without
//! it those checks are compiled out; a single flat-index guard and the
//! disposal check remain, and aliases always validate their token.
//! Successful operations behave identically in both builds.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

pub mod alias;
pub mod buffer;
pub mod config;
mod raw;
pub mod safety;
pub mod shape;

pub use alias::FlatAlias;
pub use buffer::{FlatBuffer, FlatBuffer1D, FlatBuffer2D, FlatBuffer3D};
pub use config::{checks_enabled, BufferConfig};
pub use safety::{Access, SafetyHandle};
pub use shape::{Coords, Dims, Shape, Shape1, Shape2, Shape3};
