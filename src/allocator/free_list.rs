use super::block::Block;
use super::constants::BUCKETS_COUNT;
use super::size_class::{bucket_head, find_bucket, set_bucket_head};

// Free blocks are pushed onto the head of their bucket, there is no ordering
// by size or address inside a bucket.
pub fn add_to_bucket(mem: &mut [u8], block: Block, bucket: usize) {
    let head = bucket_head(mem, bucket);

    block.set_next(mem, head);
    block.set_prev(mem, None);

    if let Some(head) = head {
        head.set_prev(mem, Some(block));
    }

    set_bucket_head(mem, bucket, Some(block));
}

pub fn remove_from_bucket(mem: &mut [u8], block: Block, bucket: usize) {
    let next = block.next(mem);
    let prev = block.prev(mem);

    match prev {
        None => {
            debug_assert_eq!(bucket_head(mem, bucket), Some(block));

            set_bucket_head(mem, bucket, next);
        }
        Some(prev) => prev.set_next(mem, next),
    }

    if let Some(next) = next {
        next.set_prev(mem, prev);
    }

    block.set_next(mem, None);
    block.set_prev(mem, None);
}

// Every block the heap creates fits a bucket, the arena is capped at the
// largest bucket size.
fn bucket_of(mem: &[u8], block: Block) -> usize {
    let bucket = find_bucket(block.get_size(mem));

    debug_assert!(bucket.is_some());

    bucket.unwrap_or(BUCKETS_COUNT - 1)
}

pub fn add_to_seglist(mem: &mut [u8], block: Block) {
    let bucket = bucket_of(mem, block);

    add_to_bucket(mem, block, bucket)
}

pub fn remove_from_seglist(mem: &mut [u8], block: Block) {
    let bucket = bucket_of(mem, block);

    remove_from_bucket(mem, block, bucket)
}

/// Walks one bucket's list from its head.
pub struct BucketIter<'a> {
    mem: &'a [u8],
    cursor: Option<Block>,
}

impl<'a> BucketIter<'a> {
    pub fn new(mem: &'a [u8], bucket: usize) -> Self {
        Self {
            mem,
            cursor: bucket_head(mem, bucket),
        }
    }
}

impl Iterator for BucketIter<'_> {
    type Item = Block;

    fn next(&mut self) -> Option<Block> {
        let block = self.cursor?;

        self.cursor = block.next(self.mem);

        Some(block)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::allocator::constants::{DIRECTORY_SIZE, MIN_BLOCK_SIZE};
    use crate::allocator::header::Header;
    use crate::allocator::size_class::clear_directory;

    const BUCKET: usize = 5;

    // A directory followed by `count` free minimum sized blocks.
    fn free_blocks(count: usize) -> (Vec<u8>, Vec<Block>) {
        let mut mem = vec![0; DIRECTORY_SIZE + 4 + count * MIN_BLOCK_SIZE];
        let mut blocks = vec![];

        clear_directory(&mut mem);

        for i in 0..count {
            let block = Block::at(DIRECTORY_SIZE + 4 + i * MIN_BLOCK_SIZE);

            block.write_tags(&mut mem, Header::free(MIN_BLOCK_SIZE));
            blocks.push(block);
        }

        (mem, blocks)
    }

    fn listed(mem: &[u8], bucket: usize) -> Vec<Block> {
        BucketIter::new(mem, bucket).collect()
    }

    #[test]
    fn adds_at_the_head() {
        let (mut mem, blocks) = free_blocks(3);

        for &block in &blocks {
            add_to_bucket(&mut mem, block, BUCKET);
        }

        assert_eq!(listed(&mem, BUCKET), vec![blocks[2], blocks[1], blocks[0]]);
        assert_eq!(blocks[2].prev(&mem), None);
        assert_eq!(blocks[1].prev(&mem), Some(blocks[2]));
        assert_eq!(blocks[0].prev(&mem), Some(blocks[1]));
    }

    #[test]
    fn removing_the_only_block_empties_the_bucket() {
        let (mut mem, blocks) = free_blocks(1);

        add_to_bucket(&mut mem, blocks[0], BUCKET);
        remove_from_bucket(&mut mem, blocks[0], BUCKET);

        assert_eq!(bucket_head(&mem, BUCKET), None);
        assert_eq!(blocks[0].next(&mem), None);
        assert_eq!(blocks[0].prev(&mem), None);
    }

    #[test]
    fn removing_the_head_promotes_its_next() {
        let (mut mem, blocks) = free_blocks(2);

        add_to_bucket(&mut mem, blocks[0], BUCKET);
        add_to_bucket(&mut mem, blocks[1], BUCKET);
        remove_from_bucket(&mut mem, blocks[1], BUCKET);

        assert_eq!(listed(&mem, BUCKET), vec![blocks[0]]);
        assert_eq!(blocks[0].prev(&mem), None);
    }

    #[test]
    fn removing_from_the_middle_and_tail() {
        let (mut mem, blocks) = free_blocks(4);

        for &block in &blocks {
            add_to_bucket(&mut mem, block, BUCKET);
        }

        remove_from_bucket(&mut mem, blocks[2], BUCKET);
        assert_eq!(listed(&mem, BUCKET), vec![blocks[3], blocks[1], blocks[0]]);
        assert_eq!(blocks[1].prev(&mem), Some(blocks[3]));

        remove_from_bucket(&mut mem, blocks[0], BUCKET);
        assert_eq!(listed(&mem, BUCKET), vec![blocks[3], blocks[1]]);
        assert_eq!(blocks[1].next(&mem), None);
    }

    #[test]
    fn seglist_picks_the_bucket_from_the_header() {
        let (mut mem, blocks) = free_blocks(1);

        add_to_seglist(&mut mem, blocks[0]);
        assert_eq!(bucket_head(&mem, 5), Some(blocks[0]));

        remove_from_seglist(&mut mem, blocks[0]);
        assert_eq!(bucket_head(&mem, 5), None);
    }
}
