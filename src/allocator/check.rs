use super::arena::Arena;
use super::block::Block;
use super::constants::{
    ALIGNMENT, BUCKETS_COUNT, FIRST_BLOCK_OFFSET, MIN_BLOCK_SIZE, PREFIX_SIZE, PROLOGUE_OFFSET,
    PROLOGUE_SIZE, WSIZE,
};
use super::header::Header;
use super::heap::Heap;
use super::size_class::{bucket_head, find_bucket};
use crate::error::HeapViolation;
use crate::logging;

/// One block as seen by a walk over the heap.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct BlockInfo {
    /// Offset of the block's header word.
    pub offset: usize,
    /// Total size, boundary tags included.
    pub size: usize,
    pub allocated: bool,
}

impl<A: Arena> Heap<A> {
    /// Runs [`Heap::verify`] and reports the first violation, if any, as a
    /// warning. Never mutates the heap.
    pub fn check(&self) -> bool {
        match self.verify() {
            Ok(()) => true,
            Err(violation) => {
                logging::log_violation(&violation);

                false
            }
        }
    }

    /// Walks every block and every bucket list and returns the first broken
    /// invariant found.
    pub fn verify(&self) -> Result<(), HeapViolation> {
        let mem = self.arena().bytes();

        if mem.len() < PREFIX_SIZE {
            return Err(HeapViolation::BadPrologue);
        }

        let prologue = Block::at(PROLOGUE_OFFSET);
        let prologue_tag = Header::allocated(PROLOGUE_SIZE);

        if prologue.header(mem) != prologue_tag || prologue.footer(mem) != prologue_tag {
            return Err(HeapViolation::BadPrologue);
        }

        let free_blocks = walk_blocks(mem)?;

        check_buckets(mem, &free_blocks)
    }

    /// Every block between the prologue and the epilogue, in address order.
    /// The walk stops early at the first block whose size is unusable.
    pub fn blocks(&self) -> Vec<BlockInfo> {
        let mem = self.arena().bytes();
        let epilogue = mem.len() - WSIZE;
        let mut blocks = vec![];
        let mut block = Block::at(FIRST_BLOCK_OFFSET);

        while block.offset() < epilogue {
            let header = block.header(mem);
            let size = header.get_size();

            if size == 0 || block.offset() + size > epilogue {
                break;
            }

            blocks.push(BlockInfo {
                offset: block.offset(),
                size,
                allocated: header.is_allocated(),
            });

            block = block.successor(mem);
        }

        blocks
    }
}

// Returns the free blocks found, in address order.
fn walk_blocks(mem: &[u8]) -> Result<Vec<Block>, HeapViolation> {
    let epilogue = mem.len() - WSIZE;
    let mut free_blocks = vec![];
    let mut prev_free: Option<Block> = None;
    let mut block = Block::at(FIRST_BLOCK_OFFSET);

    while block.offset() < epilogue {
        let header = block.header(mem);
        let size = header.get_size();

        if size < MIN_BLOCK_SIZE || size % ALIGNMENT != 0 {
            return Err(HeapViolation::BadBlockSize {
                block: block.offset(),
                size,
            });
        }

        if block.offset() + size > epilogue {
            return Err(HeapViolation::BlockOutOfBounds {
                block: block.offset(),
                size,
            });
        }

        if header.is_free() {
            let footer = block.footer(mem);

            if footer != header {
                return Err(HeapViolation::TagMismatch {
                    block: block.offset(),
                    header: header.as_word(),
                    footer: footer.as_word(),
                });
            }

            if let Some(prev) = prev_free {
                return Err(HeapViolation::AdjacentFree {
                    first: prev.offset(),
                    second: block.offset(),
                });
            }

            free_blocks.push(block);
            prev_free = Some(block);
        } else {
            prev_free = None;
        }

        block = block.successor(mem);
    }

    if block.header(mem) != Header::allocated(0) {
        return Err(HeapViolation::BadEpilogue {
            offset: block.offset(),
        });
    }

    Ok(free_blocks)
}

// Every listed block must be one of the walked free blocks, listed once, in
// the right bucket, with a prev link pointing back at its predecessor in the
// list. Seen flags bound the traversal, so a cycle ends in a violation.
fn check_buckets(mem: &[u8], free_blocks: &[Block]) -> Result<(), HeapViolation> {
    let epilogue = mem.len() - WSIZE;
    let mut seen = vec![false; free_blocks.len()];
    let mut listed = 0;

    for bucket in 0..BUCKETS_COUNT {
        let mut prev = None;
        let mut cursor = bucket_head(mem, bucket);

        while let Some(block) = cursor {
            let in_range = block.offset() >= FIRST_BLOCK_OFFSET
                && block.offset() + MIN_BLOCK_SIZE <= epilogue
                && block.payload() % ALIGNMENT == 0;

            if !in_range {
                return Err(HeapViolation::BrokenLink {
                    block: block.offset(),
                    bucket,
                });
            }

            let header = block.header(mem);

            if header.is_allocated() {
                return Err(HeapViolation::AllocatedInList {
                    block: block.offset(),
                    bucket,
                });
            }

            let index = match free_blocks.binary_search(&block) {
                Ok(index) if !seen[index] => index,
                _ => {
                    return Err(HeapViolation::BrokenLink {
                        block: block.offset(),
                        bucket,
                    })
                }
            };

            let expected = find_bucket(header.get_size());

            if expected != Some(bucket) {
                return Err(HeapViolation::WrongBucket {
                    block: block.offset(),
                    bucket,
                    expected,
                });
            }

            if block.prev(mem) != prev {
                return Err(HeapViolation::BrokenLink {
                    block: block.offset(),
                    bucket,
                });
            }

            seen[index] = true;
            listed += 1;
            prev = Some(block);
            cursor = block.next(mem);
        }
    }

    if listed != free_blocks.len() {
        return Err(HeapViolation::UnlistedFree {
            listed,
            walked: free_blocks.len(),
        });
    }

    Ok(())
}
