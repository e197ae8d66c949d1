//! Coalescing Pointer Queue
//!
//! Holds at most one pending pointer ray. Pointer-move events overwrite the
//! slot; the frame update drains it once, so a burst of moves between two
//! frames costs a single ghost recomputation.

use crate::physics::collision::Ray;

/// Single-slot buffer of the latest pointer ray.
///
/// # Example
///
/// ```rust,ignore
/// use cubik_engine::input::PointerQueue;
///
/// let mut queue = PointerQueue::new();
///
/// // In the event loop, any number of times per frame
/// queue.push(ray_a);
/// queue.push(ray_b);
///
/// // Once per frame
/// if let Some(ray) = queue.take() {
///     // ray == ray_b
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct PointerQueue {
    /// Latest ray not yet consumed.
    pending: Option<Ray>,
    /// Number of pushes that replaced an unconsumed ray.
    coalesced: u64,
}

impl PointerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a pointer move, replacing any ray not yet drained.
    #[inline]
    pub fn push(&mut self, ray: Ray) {
        if self.pending.replace(ray).is_some() {
            self.coalesced += 1;
        }
    }

    /// Drain the pending ray, if any.
    #[inline]
    pub fn take(&mut self) -> Option<Ray> {
        self.pending.take()
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Drop any pending ray without processing it.
    pub fn clear(&mut self) {
        self.pending = None;
    }

    /// Total moves that were merged into a later one.
    pub fn coalesced_count(&self) -> u64 {
        self.coalesced
    }
}
