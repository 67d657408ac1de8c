/// Running counters kept by a [`crate::Heap`].
///
/// Obtained by calling [`crate::Heap::metrics`]. Counters are reset whenever
/// the heap is re-initialized.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct HeapMetrics {
    /// Successful allocations, including the ones made on behalf of a realloc.
    pub allocations: u64,

    /// Successful releases, including the ones made on behalf of a realloc.
    pub releases: u64,

    /// Reallocations that moved data into a new block.
    pub reallocations: u64,

    /// Allocation requests that could not be satisfied.
    pub failed_allocations: u64,

    /// Number of times the arena was grown, the initial chunk included.
    pub arena_growths: u64,

    /// Usable payload bytes of the blocks that are still live.
    pub live_bytes: u64,

    /// The highest value `live_bytes` has reached.
    pub peak_live_bytes: u64,
}

impl HeapMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_allocation(&mut self, usable: usize) {
        self.allocations += 1;
        self.live_bytes += usable as u64;
        self.peak_live_bytes = self.peak_live_bytes.max(self.live_bytes);
    }

    pub fn record_release(&mut self, usable: usize) {
        self.releases += 1;
        self.live_bytes = self.live_bytes.saturating_sub(usable as u64);
    }

    pub fn record_failure(&mut self) {
        self.failed_allocations += 1;
    }

    pub fn record_growth(&mut self) {
        self.arena_growths += 1;
    }

    pub fn record_reallocation(&mut self) {
        self.reallocations += 1;
    }
}
