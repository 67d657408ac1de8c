// Boundary tags are single words, links are stored as word sized offsets.
pub const WSIZE: usize = 4;
pub const DSIZE: usize = 8;
pub const ALIGNMENT: usize = DSIZE;

pub const BUCKETS_COUNT: usize = 32;
pub const DIRECTORY_SIZE: usize = BUCKETS_COUNT * WSIZE;

// The empty sentinel for bucket slots and list links. Offset 0 always lands
// inside the directory so it can never name a block.
pub const EMPTY: usize = 0;

pub const PADDING_OFFSET: usize = DIRECTORY_SIZE;
pub const PROLOGUE_OFFSET: usize = PADDING_OFFSET + WSIZE;
pub const PROLOGUE_SIZE: usize = DSIZE;
pub const FIRST_BLOCK_OFFSET: usize = PROLOGUE_OFFSET + PROLOGUE_SIZE;

// directory + padding + prologue header/footer + epilogue header
pub const PREFIX_SIZE: usize = FIRST_BLOCK_OFFSET + WSIZE;

// Header + footer + next/prev links, the smallest block that can be free.
pub const MIN_BLOCK_SIZE: usize = 4 * DSIZE;
pub const BLOCK_OVERHEAD: usize = MIN_BLOCK_SIZE;

pub const CHUNK_SIZE: usize = 1 << 12;
pub const MAX_HEAP: usize = 20 * (1 << 20);

// The largest size any bucket covers.
pub const MAX_BLOCK_SIZE: usize = 1 << (BUCKETS_COUNT - 1);

pub const fn align(size: usize) -> usize {
    (size + (ALIGNMENT - 1)) & !(ALIGNMENT - 1)
}
