const ALLOC_BIT: u32 = 0x1;
const SIZE_MASK: u32 = !0x7;

/// A boundary tag: a block's size and allocated flag packed into one word.
///
/// Sizes are always multiples of 8, which leaves the low three bits free. Only
/// bit 0 is used.
#[repr(transparent)]
#[derive(PartialEq, Eq, Copy, Clone, Debug)]
pub struct Header(u32);

impl Header {
    pub fn new(size: usize, allocated: bool) -> Self {
        debug_assert!(size % 8 == 0);
        debug_assert!(size <= u32::MAX as usize);

        Header(size as u32 | if allocated { ALLOC_BIT } else { 0 })
    }

    pub fn allocated(size: usize) -> Self {
        Self::new(size, true)
    }

    pub fn free(size: usize) -> Self {
        Self::new(size, false)
    }

    pub fn get_size(&self) -> usize {
        (self.0 & SIZE_MASK) as usize
    }

    pub fn is_allocated(&self) -> bool {
        self.0 & ALLOC_BIT != 0
    }

    pub fn is_free(&self) -> bool {
        !self.is_allocated()
    }

    pub fn as_word(&self) -> u32 {
        self.0
    }
}

impl From<u32> for Header {
    fn from(word: u32) -> Self {
        Header(word)
    }
}
