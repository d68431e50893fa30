//! Accounting allocator wrapper.
//!
//! [`TrackingAllocator`] forwards to an inner allocator and records every
//! live block. Releases of addresses it never handed out, or with a layout
//! or kind different from the allocation, are reported as errors and never
//! forwarded, so a double release cannot reach the heap. An optional byte
//! budget turns it into a bounded pool for exhaustion tests.

use std::alloc::Layout;
use std::ptr::NonNull;

use flatbuf_core::{AllocError, AllocatorKind};
use indexmap::IndexMap;
use parking_lot::Mutex;

use crate::allocator::Allocator;
use crate::system::SystemAllocator;

/// A block currently owned by a caller.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LiveBlock {
    /// Layout the block was allocated with.
    pub layout: Layout,
    /// Kind the block was allocated with.
    pub kind: AllocatorKind,
}

/// Counters for one allocator kind.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct KindStats {
    /// Successful allocations.
    pub allocations: u64,
    /// Successful releases.
    pub releases: u64,
    /// Bytes currently live.
    pub live_bytes: usize,
    /// Highest value `live_bytes` has reached.
    pub peak_bytes: usize,
}

impl KindStats {
    /// Blocks currently live.
    pub fn live_blocks(&self) -> u64 {
        self.allocations - self.releases
    }
}

#[derive(Default)]
struct TrackingState {
    /// Address → block, in allocation order.
    live: IndexMap<usize, LiveBlock>,
    /// Live zero-sized blocks per (align, kind); their addresses coincide.
    zero_sized: IndexMap<(usize, AllocatorKind), u64>,
    stats: IndexMap<AllocatorKind, KindStats>,
    live_bytes: usize,
}

impl TrackingState {
    fn record_alloc(&mut self, kind: AllocatorKind, size: usize) {
        self.live_bytes += size;
        let stats = self.stats.entry(kind).or_default();
        stats.allocations += 1;
        stats.live_bytes += size;
        stats.peak_bytes = stats.peak_bytes.max(stats.live_bytes);
    }

    fn record_release(&mut self, kind: AllocatorKind, size: usize) {
        self.live_bytes -= size;
        let stats = self.stats.entry(kind).or_default();
        stats.releases += 1;
        stats.live_bytes -= size;
    }
}

/// Allocator wrapper that tracks live blocks and per-kind statistics.
#[derive(Debug)]
pub struct TrackingAllocator<A: Allocator = SystemAllocator> {
    inner: A,
    budget: Option<usize>,
    state: Mutex<TrackingState>,
}

impl std::fmt::Debug for TrackingState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrackingState")
            .field("live_blocks", &self.live.len())
            .field("live_bytes", &self.live_bytes)
            .finish()
    }
}

impl TrackingAllocator<SystemAllocator> {
    /// Track allocations served by the system heap.
    pub fn system() -> Self {
        Self::new(SystemAllocator)
    }
}

impl<A: Allocator> TrackingAllocator<A> {
    /// Wrap `inner` with no byte budget.
    pub fn new(inner: A) -> Self {
        Self {
            inner,
            budget: None,
            state: Mutex::new(TrackingState::default()),
        }
    }

    /// Wrap `inner`, refusing allocations once `budget` bytes are live.
    pub fn with_budget(inner: A, budget: usize) -> Self {
        Self {
            budget: Some(budget),
            ..Self::new(inner)
        }
    }

    /// Number of live blocks, zero-sized blocks included.
    pub fn live_blocks(&self) -> usize {
        let state = self.state.lock();
        state.live.len() + state.zero_sized.values().sum::<u64>() as usize
    }

    /// Bytes currently live across all kinds.
    pub fn live_bytes(&self) -> usize {
        self.state.lock().live_bytes
    }

    /// Statistics for one kind.
    pub fn stats(&self, kind: AllocatorKind) -> KindStats {
        self.state
            .lock()
            .stats
            .get(&kind)
            .copied()
            .unwrap_or_default()
    }

    /// Whether every allocation has been released.
    pub fn is_quiescent(&self) -> bool {
        self.live_blocks() == 0
    }

    /// The non-empty live blocks, in allocation order.
    pub fn live(&self) -> Vec<(usize, LiveBlock)> {
        self.state
            .lock()
            .live
            .iter()
            .map(|(&addr, &block)| (addr, block))
            .collect()
    }

    /// The wrapped allocator.
    pub fn inner(&self) -> &A {
        &self.inner
    }
}

impl<A: Allocator> Allocator for TrackingAllocator<A> {
    fn allocate(&self, layout: Layout, kind: AllocatorKind) -> Result<NonNull<u8>, AllocError> {
        let mut state = self.state.lock();
        if let Some(budget) = self.budget {
            let available = budget.saturating_sub(state.live_bytes);
            if layout.size() > available {
                return Err(AllocError::Exhausted {
                    requested: layout.size(),
                    available,
                });
            }
        }

        let ptr = self.inner.allocate(layout, kind)?;
        if layout.size() == 0 {
            *state.zero_sized.entry((layout.align(), kind)).or_default() += 1;
        } else {
            state
                .live
                .insert(ptr.as_ptr() as usize, LiveBlock { layout, kind });
        }
        state.record_alloc(kind, layout.size());
        Ok(ptr)
    }

    unsafe fn deallocate(
        &self,
        ptr: NonNull<u8>,
        layout: Layout,
        kind: AllocatorKind,
    ) -> Result<(), AllocError> {
        let address = ptr.as_ptr() as usize;
        let mut state = self.state.lock();

        if layout.size() == 0 {
            let key = (layout.align(), kind);
            match state.zero_sized.get_mut(&key) {
                Some(count) if *count > 0 => *count -= 1,
                _ => {
                    log::warn!("tracking: release of unknown zero-sized block {address:#x}");
                    return Err(AllocError::UnknownBlock { address });
                }
            }
        } else {
            let Some(&block) = state.live.get(&address) else {
                log::warn!("tracking: release of unknown block {address:#x}");
                return Err(AllocError::UnknownBlock { address });
            };
            if block.layout != layout || block.kind != kind {
                return Err(AllocError::Mismatch {
                    address,
                    reason: format!(
                        "allocated as {} bytes/{} ({}), released as {} bytes/{} ({})",
                        block.layout.size(),
                        block.layout.align(),
                        block.kind,
                        layout.size(),
                        layout.align(),
                        kind
                    ),
                });
            }
            // SAFETY: the block is in the live table with this exact layout
            // and kind, so it came from `inner.allocate` and is unreleased.
            unsafe { self.inner.deallocate(ptr, layout, kind)? };
            state.live.shift_remove(&address);
        }

        state.record_release(kind, layout.size());
        Ok(())
    }

    fn name(&self) -> &'static str {
        "tracking"
    }
}
