//! Buffer construction parameters.

use std::sync::Arc;

use flatbuf_alloc::{default_allocator, Allocator};
use flatbuf_core::{AllocatorKind, FlatBufferError};

/// Configuration for constructing a flat buffer.
///
/// Validated at construction; the buffer records the kind and allocator
/// and hands both back on disposal.
#[derive(Clone, Debug)]
pub struct BufferConfig {
    /// Allocation strategy. [`AllocatorKind::None`] is rejected.
    pub kind: AllocatorKind,

    /// Allocator serving the block.
    ///
    /// Default: `None`, meaning the process-wide system allocator.
    pub allocator: Option<Arc<dyn Allocator>>,

    /// Log a warning when a live buffer is dropped without `dispose()`.
    ///
    /// The block is released either way. Default: `true`.
    pub warn_on_leak: bool,
}

impl BufferConfig {
    /// Default leak-warning setting.
    pub const DEFAULT_WARN_ON_LEAK: bool = true;

    /// Configuration for `kind` using the default allocator.
    pub fn new(kind: AllocatorKind) -> Self {
        Self {
            kind,
            allocator: None,
            warn_on_leak: Self::DEFAULT_WARN_ON_LEAK,
        }
    }

    /// Serve allocations from `allocator`.
    pub fn with_allocator(mut self, allocator: Arc<dyn Allocator>) -> Self {
        self.allocator = Some(allocator);
        self
    }

    /// Enable or disable the leak warning.
    pub fn warn_on_leak(mut self, warn: bool) -> Self {
        self.warn_on_leak = warn;
        self
    }

    /// Reject unusable allocator kinds.
    pub fn validate(&self) -> Result<(), FlatBufferError> {
        if self.kind.is_usable() {
            Ok(())
        } else {
            Err(FlatBufferError::InvalidArgument {
                argument: "kind",
                reason: format!(
                    "allocator kind '{}' cannot back a buffer; use scoped, deferred or persistent",
                    self.kind
                ),
            })
        }
    }

    /// The configured allocator, or the default one.
    pub fn resolve_allocator(&self) -> Arc<dyn Allocator> {
        self.allocator.clone().unwrap_or_else(default_allocator)
    }
}

/// Whether per-axis bounds checks and owner token checks are compiled in.
pub const fn checks_enabled() -> bool {
    cfg!(feature = "checks")
}
