use super::constants::MAX_HEAP;
use crate::error::AllocError;

/// The raw memory a heap is carved out of.
///
/// An arena is a single contiguous range that can only grow at its high end.
/// Offsets handed out by the heap are relative to `low_bound`, so growing
/// never invalidates them.
pub trait Arena {
    /// Extends the range by exactly `increment` bytes and returns the offset
    /// where the new bytes start.
    fn grow(&mut self, increment: usize) -> Result<usize, AllocError>;

    fn low_bound(&self) -> usize {
        0
    }

    /// One past the last usable offset.
    fn high_bound(&self) -> usize {
        self.low_bound() + self.size()
    }

    fn size(&self) -> usize;

    fn bytes(&self) -> &[u8];

    fn bytes_mut(&mut self) -> &mut [u8];
}

/// An arena backed by a zero filled `Vec<u8>` that refuses to grow past
/// `max_size` bytes.
#[derive(Debug)]
pub struct VecArena {
    bytes: Vec<u8>,
    max_size: usize,
}

impl VecArena {
    pub fn new(max_size: usize) -> Self {
        Self {
            bytes: Vec::new(),
            max_size,
        }
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }
}

impl Default for VecArena {
    fn default() -> Self {
        Self::new(MAX_HEAP)
    }
}

impl Arena for VecArena {
    fn grow(&mut self, increment: usize) -> Result<usize, AllocError> {
        let old_size = self.bytes.len();
        let new_size = old_size
            .checked_add(increment)
            .ok_or(AllocError::OutOfMemory)?;

        if new_size > self.max_size {
            return Err(AllocError::OutOfMemory);
        }

        self.bytes
            .try_reserve_exact(increment)
            .map_err(|_| AllocError::OutOfMemory)?;
        self.bytes.resize(new_size, 0);

        Ok(old_size)
    }

    fn size(&self) -> usize {
        self.bytes.len()
    }

    fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    fn bytes_mut(&mut self) -> &mut [u8] {
        &mut self.bytes
    }
}
