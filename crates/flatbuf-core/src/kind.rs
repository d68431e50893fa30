//! Allocator-strategy selector.

use std::fmt;

/// Selects the memory pool and lifetime policy backing an allocation.
///
/// The kind is recorded by every container at construction and handed back
/// to the allocator on release, so a block is always returned to the pool
/// that produced it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AllocatorKind {
    /// No allocation strategy. Rejected by every container constructor.
    #[default]
    None,
    /// Short-lived allocation scoped to the current frame or call.
    Scoped,
    /// Longer-lived allocation handed off to deferred work and freed when
    /// that work completes.
    Deferred,
    /// Lives until explicitly freed.
    Persistent,
}

impl AllocatorKind {
    /// Every kind that can back an allocation, in lifetime order.
    pub const USABLE: [AllocatorKind; 3] = [Self::Scoped, Self::Deferred, Self::Persistent];

    /// Whether this kind denotes a usable allocation strategy.
    pub fn is_usable(self) -> bool {
        !matches!(self, Self::None)
    }

    /// Stable lowercase name, used in diagnostics.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Scoped => "scoped",
            Self::Deferred => "deferred",
            Self::Persistent => "persistent",
        }
    }
}

impl fmt::Display for AllocatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
