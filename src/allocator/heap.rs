use super::arena::{Arena, VecArena};
use super::block::{write_word, Block};
use super::constants::{
    align, ALIGNMENT, BLOCK_OVERHEAD, BUCKETS_COUNT, DSIZE, FIRST_BLOCK_OFFSET, MAX_BLOCK_SIZE,
    MIN_BLOCK_SIZE, PADDING_OFFSET, PREFIX_SIZE, PROLOGUE_OFFSET, PROLOGUE_SIZE, WSIZE,
};
use super::free_list::{add_to_seglist, remove_from_seglist, BucketIter};
use super::header::Header;
use super::size_class::{clear_directory, find_bucket};
use crate::config::HeapConfig;
use crate::error::AllocError;
use crate::logging;
use crate::metrics::HeapMetrics;

/// A caller's handle to an allocation: the offset of its payload within the
/// arena. Always a multiple of 8.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Payload(usize);

impl Payload {
    /// Wraps a raw offset. The heap validates it before touching anything.
    pub fn from_offset(offset: usize) -> Self {
        Payload(offset)
    }

    pub fn offset(&self) -> usize {
        self.0
    }
}

/// A segregated-fit heap over a single growable arena.
///
/// Blocks carry boundary tags (a header and a footer word with the size and
/// allocated flag), free blocks are kept in 32 power-of-two size classes whose
/// list heads live at the start of the arena, and freed blocks are coalesced
/// with their free neighbours right away.
///
/// The heap is single threaded: every operation takes `&mut self`.
pub struct Heap<A: Arena = VecArena> {
    arena: A,
    config: HeapConfig,
    metrics: HeapMetrics,
}

impl Heap<VecArena> {
    pub fn new() -> Result<Self, AllocError> {
        Self::with_config(HeapConfig::default())
    }

    pub fn with_config(config: HeapConfig) -> Result<Self, AllocError> {
        config.validate()?;

        Self::from_arena(VecArena::new(config.max_heap_size), config)
    }
}

impl<A: Arena> Heap<A> {
    /// Builds a heap on top of `arena` and runs [`Heap::init`].
    pub fn from_arena(arena: A, config: HeapConfig) -> Result<Self, AllocError> {
        config.validate()?;

        let mut heap = Self {
            arena,
            config,
            metrics: HeapMetrics::new(),
        };

        heap.init()?;

        Ok(heap)
    }

    /// Lays out the bucket directory, the sentinel blocks, and one chunk of
    /// free space.
    ///
    /// On an arena that is already in use this starts over: every bucket is
    /// emptied and all the space above the prologue becomes a single free
    /// block, so every outstanding [`Payload`] is invalidated.
    pub fn init(&mut self) -> Result<(), AllocError> {
        let size = self.arena.size();

        if size == 0 {
            self.arena.grow(PREFIX_SIZE)?;
        } else if size < PREFIX_SIZE || size % ALIGNMENT != 0 {
            return Err(AllocError::CorruptArena);
        }

        let epilogue = self.arena.size() - WSIZE;
        let reclaimed = epilogue - FIRST_BLOCK_OFFSET;
        let mem = self.arena.bytes_mut();

        clear_directory(mem);
        write_word(mem, PADDING_OFFSET, 0);
        Block::at(PROLOGUE_OFFSET).write_tags(mem, Header::allocated(PROLOGUE_SIZE));
        write_word(mem, epilogue, Header::allocated(0).as_word());

        if reclaimed > 0 {
            let block = Block::at(FIRST_BLOCK_OFFSET);

            block.write_tags(mem, Header::free(reclaimed));
            add_to_seglist(mem, block);
        }

        self.metrics = HeapMetrics::new();
        self.extend_heap(self.config.chunk_size)?;

        logging::log_init(self.arena.size(), reclaimed);

        Ok(())
    }

    /// Allocates `size` bytes, returning `None` for a zero sized request or
    /// when the arena can't grow any further.
    pub fn allocate(&mut self, size: usize) -> Option<Payload> {
        self.try_allocate(size).ok()
    }

    pub fn try_allocate(&mut self, size: usize) -> Result<Payload, AllocError> {
        match self.allocate_block(size) {
            Ok(block) => {
                let mem = self.arena.bytes();

                self.metrics.record_allocation(block.usable_size(mem));
                logging::log_allocation(size, block.get_size(mem), block.payload());

                Ok(Payload(block.payload()))
            }
            Err(AllocError::ZeroSize) => Err(AllocError::ZeroSize),
            Err(error) => {
                self.metrics.record_failure();
                logging::log_allocation_failed(size, error);

                Err(error)
            }
        }
    }

    fn allocate_block(&mut self, size: usize) -> Result<Block, AllocError> {
        if size == 0 {
            return Err(AllocError::ZeroSize);
        }

        let block_size = Self::block_size_for(size)?;
        let block = match self.find_fit(block_size) {
            Some(block) => block,
            None => self.extend_heap(block_size.max(self.config.chunk_size))?,
        };

        self.place(block, block_size);

        Ok(block)
    }

    fn block_size_for(size: usize) -> Result<usize, AllocError> {
        let padded = size
            .checked_add(BLOCK_OVERHEAD + ALIGNMENT - 1)
            .ok_or(AllocError::TooLarge)?;
        let block_size = padded & !(ALIGNMENT - 1);

        if block_size > MAX_BLOCK_SIZE {
            return Err(AllocError::TooLarge);
        }

        Ok(block_size)
    }

    // First fit, starting at the bucket the size belongs to and moving up
    // through the larger ones.
    fn find_fit(&self, size: usize) -> Option<Block> {
        let mem = self.arena.bytes();
        let first = find_bucket(size)?;

        (first..BUCKETS_COUNT).find_map(|bucket| {
            BucketIter::new(mem, bucket).find(|block| block.get_size(mem) >= size)
        })
    }

    // Splits off the tail of `block` when it is big enough to be a free block
    // of its own. The tail is not coalesced with its successor here.
    fn place(&mut self, block: Block, size: usize) {
        let mem = self.arena.bytes_mut();
        let block_size = block.get_size(mem);
        let remainder = block_size - size;

        remove_from_seglist(mem, block);

        if remainder >= MIN_BLOCK_SIZE {
            block.write_tags(mem, Header::allocated(size));

            let rest = block.successor(mem);

            rest.write_tags(mem, Header::free(remainder));
            add_to_seglist(mem, rest);
        } else {
            block.write_tags(mem, Header::allocated(block_size));
        }
    }

    // The old epilogue header becomes the header of the new free block, and
    // a fresh epilogue is written at the new end of the arena.
    fn extend_heap(&mut self, size: usize) -> Result<Block, AllocError> {
        let size = align(size);
        let fits = self
            .arena
            .size()
            .checked_add(size)
            .is_some_and(|total| total <= MAX_BLOCK_SIZE);

        if !fits {
            return Err(AllocError::OutOfMemory);
        }

        let start = self.arena.grow(size)?;
        let mem = self.arena.bytes_mut();
        let block = Block::at(start - WSIZE);

        block.write_tags(mem, Header::free(size));
        write_word(mem, start + size - WSIZE, Header::allocated(0).as_word());

        self.metrics.record_growth();
        logging::log_growth(size, self.arena.size());

        Ok(self.coalesce(block))
    }

    /// Returns the block behind `ptr` to the heap and merges it with any free
    /// neighbours.
    ///
    /// Pointers that are out of range, misaligned, or already free are
    /// rejected without touching the heap. Anything subtler, such as a pointer
    /// into the middle of a live block, is not detected.
    pub fn release(&mut self, ptr: Payload) -> Result<(), AllocError> {
        let block = match self.owned_block(ptr) {
            Ok(block) => block,
            Err(error) => {
                logging::log_release_rejected(ptr.offset(), error);

                return Err(error);
            }
        };
        let mem = self.arena.bytes_mut();
        let size = block.get_size(mem);

        block.write_tags(mem, Header::free(size));
        self.coalesce(block);

        self.metrics.record_release(size - DSIZE);
        logging::log_release(ptr.offset(), size);

        Ok(())
    }

    fn owned_block(&self, ptr: Payload) -> Result<Block, AllocError> {
        let offset = ptr.offset();
        let epilogue = self.arena.size() - WSIZE;

        if offset < FIRST_BLOCK_OFFSET + WSIZE || offset >= epilogue || offset % ALIGNMENT != 0 {
            return Err(AllocError::InvalidPointer);
        }

        let block = Block::from_payload(offset);
        let header = block.header(self.arena.bytes());
        let size = header.get_size();

        if size < MIN_BLOCK_SIZE || block.offset() + size > epilogue {
            return Err(AllocError::InvalidPointer);
        }

        if header.is_free() {
            return Err(AllocError::DoubleFree);
        }

        Ok(block)
    }

    // `block` must be tagged free and must not be in any bucket yet. Returns
    // the block that survives the merge.
    fn coalesce(&mut self, block: Block) -> Block {
        let mem = self.arena.bytes_mut();
        let prev_allocated = block.predecessor_tag(mem).is_allocated();
        let next = block.successor(mem);
        let next_allocated = next.is_allocated(mem);
        let mut size = block.get_size(mem);

        let merged = match (prev_allocated, next_allocated) {
            (true, true) => block,
            (true, false) => {
                size += next.get_size(mem);
                remove_from_seglist(mem, next);

                block
            }
            (false, true) => {
                let prev = block.predecessor(mem);

                size += prev.get_size(mem);
                remove_from_seglist(mem, prev);

                prev
            }
            (false, false) => {
                let prev = block.predecessor(mem);

                size += prev.get_size(mem) + next.get_size(mem);
                remove_from_seglist(mem, prev);
                remove_from_seglist(mem, next);

                prev
            }
        };

        merged.write_tags(mem, Header::free(size));
        add_to_seglist(mem, merged);

        merged
    }

    /// Moves an allocation into a block of `size` bytes.
    ///
    /// `None` behaves like [`Heap::allocate`], a `size` of zero behaves like
    /// [`Heap::release`]. Otherwise a new block is always allocated, the
    /// payload copied over, and the old block released. If the new block
    /// can't be allocated the old one is left untouched.
    pub fn reallocate(&mut self, ptr: Option<Payload>, size: usize) -> Option<Payload> {
        self.try_reallocate(ptr, size).ok().flatten()
    }

    pub fn try_reallocate(
        &mut self,
        ptr: Option<Payload>,
        size: usize,
    ) -> Result<Option<Payload>, AllocError> {
        let old = match ptr {
            Some(old) => old,
            None => {
                return match self.try_allocate(size) {
                    Ok(new) => Ok(Some(new)),
                    Err(AllocError::ZeroSize) => Ok(None),
                    Err(error) => Err(error),
                }
            }
        };

        if size == 0 {
            self.release(old)?;

            return Ok(None);
        }

        let old_size = self.usable_size(old)?;
        let new = self.try_allocate(size)?;
        let copied = size.min(old_size);

        self.arena
            .bytes_mut()
            .copy_within(old.offset()..old.offset() + copied, new.offset());
        self.release(old)?;

        self.metrics.record_reallocation();
        logging::log_reallocation(old.offset(), new.offset(), copied);

        Ok(Some(new))
    }

    /// The bytes a caller may use behind `ptr`. At least as many as were
    /// requested, possibly more.
    pub fn usable_size(&self, ptr: Payload) -> Result<usize, AllocError> {
        let block = self.owned_block(ptr)?;

        Ok(block.usable_size(self.arena.bytes()))
    }

    pub fn payload(&self, ptr: Payload) -> Result<&[u8], AllocError> {
        let len = self.usable_size(ptr)?;

        Ok(&self.arena.bytes()[ptr.offset()..ptr.offset() + len])
    }

    pub fn payload_mut(&mut self, ptr: Payload) -> Result<&mut [u8], AllocError> {
        let len = self.usable_size(ptr)?;

        Ok(&mut self.arena.bytes_mut()[ptr.offset()..ptr.offset() + len])
    }

    pub fn metrics(&self) -> &HeapMetrics {
        &self.metrics
    }

    pub fn config(&self) -> &HeapConfig {
        &self.config
    }

    pub fn arena(&self) -> &A {
        &self.arena
    }

    pub fn low_bound(&self) -> usize {
        self.arena.low_bound()
    }

    pub fn high_bound(&self) -> usize {
        self.arena.high_bound()
    }

    pub fn current_size(&self) -> usize {
        self.arena.size()
    }

    #[cfg(test)]
    pub(crate) fn arena_mut(&mut self) -> &mut A {
        &mut self.arena
    }
}
