//! Logging helpers for heap operations.
//!
//! Events go through `tracing`; the library never installs a subscriber.
//! Per-operation events are `trace` level, arena growth and initialization
//! are `debug`, and anything that signals misuse or a broken heap is `warn`.

use crate::error::{AllocError, HeapViolation};
use tracing::{debug, trace, warn};

#[inline]
pub fn log_init(arena_size: usize, reclaimed: usize) {
    debug!(target: "segfit::heap", arena_size, reclaimed, "heap initialized");
}

#[inline]
pub fn log_allocation(requested: usize, block_size: usize, payload: usize) {
    trace!(
        target: "segfit::heap",
        requested,
        block_size,
        payload,
        "allocated block"
    );
}

#[inline]
pub fn log_allocation_failed(requested: usize, error: AllocError) {
    debug!(
        target: "segfit::heap",
        requested,
        %error,
        "allocation failed"
    );
}

#[inline]
pub fn log_release(payload: usize, block_size: usize) {
    trace!(target: "segfit::heap", payload, block_size, "released block");
}

#[inline]
pub fn log_release_rejected(payload: usize, error: AllocError) {
    warn!(target: "segfit::heap", payload, %error, "release rejected");
}

#[inline]
pub fn log_reallocation(old: usize, new: usize, copied: usize) {
    trace!(target: "segfit::heap", old, new, copied, "moved block");
}

#[inline]
pub fn log_growth(increment: usize, arena_size: usize) {
    debug!(target: "segfit::heap", increment, arena_size, "grew arena");
}

#[inline]
pub fn log_violation(violation: &HeapViolation) {
    warn!(target: "segfit::check", %violation, "heap check failed");
}

#[inline]
pub fn log_replay_done(ops: usize, utilization: f64) {
    debug!(target: "segfit::trace", ops, utilization, "trace replayed");
}
