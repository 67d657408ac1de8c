use crate::allocator::constants::{ALIGNMENT, CHUNK_SIZE, MAX_BLOCK_SIZE, MAX_HEAP, PREFIX_SIZE};
use crate::error::AllocError;

/// This structure contains the configuration settings for a heap.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct HeapConfig {
    /// The minimum number of bytes the arena is grown by when no free block
    /// can satisfy a request. Requests larger than this grow the arena by
    /// exactly the block size they need.
    pub chunk_size: usize,

    /// The most bytes a [`crate::VecArena`] will ever hold, including the
    /// bucket directory and sentinel blocks. Once reached, growth fails and
    /// allocations return out of memory.
    pub max_heap_size: usize,

    /// When replaying a trace, run the consistency checker after every
    /// operation. Turning this off makes large traces much faster to replay.
    pub check_on_replay: bool,
}

pub const HEAP_CONFIG_DEFAULT_CHUNK_SIZE: usize = CHUNK_SIZE;
pub const HEAP_CONFIG_DEFAULT_MAX_HEAP_SIZE: usize = MAX_HEAP;
pub const HEAP_CONFIG_DEFAULT_CHECK_ON_REPLAY: bool = true;

impl HeapConfig {
    /// Creates a default HeapConfig: 4KiB chunks and a 20MiB ceiling.
    pub fn default() -> Self {
        HeapConfig {
            chunk_size: HEAP_CONFIG_DEFAULT_CHUNK_SIZE,
            max_heap_size: HEAP_CONFIG_DEFAULT_MAX_HEAP_SIZE,
            check_on_replay: HEAP_CONFIG_DEFAULT_CHECK_ON_REPLAY,
        }
    }

    // Every block has to fit a size class, so the whole arena has to as well.
    pub fn validate(&self) -> Result<(), AllocError> {
        if self.chunk_size == 0 || self.chunk_size % ALIGNMENT != 0 {
            return Err(AllocError::BadConfig);
        }

        if self.max_heap_size > MAX_BLOCK_SIZE || self.max_heap_size < PREFIX_SIZE {
            return Err(AllocError::BadConfig);
        }

        Ok(())
    }
}
