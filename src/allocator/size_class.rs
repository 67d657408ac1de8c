use super::block::{read_link, write_link, Block};
use super::constants::{BUCKETS_COUNT, WSIZE};

/// The lowest bucket `k` such that `size <= 2^k`, or `None` if the size is
/// beyond every bucket.
pub fn find_bucket(size: usize) -> Option<usize> {
    (0..BUCKETS_COUNT).find(|bucket| size <= 1 << bucket)
}

fn slot_offset(bucket: usize) -> usize {
    debug_assert!(bucket < BUCKETS_COUNT);

    bucket * WSIZE
}

// The directory lives in the first BUCKETS_COUNT words of the managed range.
pub fn bucket_head(mem: &[u8], bucket: usize) -> Option<Block> {
    read_link(mem, slot_offset(bucket))
}

pub fn set_bucket_head(mem: &mut [u8], bucket: usize, head: Option<Block>) {
    write_link(mem, slot_offset(bucket), head)
}

pub fn clear_directory(mem: &mut [u8]) {
    for bucket in 0..BUCKETS_COUNT {
        set_bucket_head(mem, bucket, None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::allocator::constants::{DIRECTORY_SIZE, MAX_BLOCK_SIZE, MIN_BLOCK_SIZE};

    #[test]
    fn powers_of_two_land_in_their_own_bucket() {
        assert_eq!(find_bucket(1), Some(0));
        assert_eq!(find_bucket(32), Some(5));
        assert_eq!(find_bucket(4096), Some(12));
        assert_eq!(find_bucket(MAX_BLOCK_SIZE), Some(31));
    }

    #[test]
    fn sizes_round_up_to_the_next_bucket() {
        assert_eq!(find_bucket(MIN_BLOCK_SIZE + 8), Some(6));
        assert_eq!(find_bucket(72), Some(7));
        assert_eq!(find_bucket(4104), Some(13));
    }

    #[test]
    fn nothing_covers_past_the_last_bucket() {
        assert_eq!(find_bucket(MAX_BLOCK_SIZE + 8), None);
    }

    #[test]
    fn directory_starts_empty() {
        let mut mem = vec![0xff; DIRECTORY_SIZE];

        clear_directory(&mut mem);

        for bucket in 0..BUCKETS_COUNT {
            assert_eq!(bucket_head(&mem, bucket), None);
        }

        set_bucket_head(&mut mem, 7, Some(Block::at(140)));
        assert_eq!(bucket_head(&mem, 7), Some(Block::at(140)));
        assert_eq!(bucket_head(&mem, 6), None);
    }
}
