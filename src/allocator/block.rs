use super::constants::{DSIZE, EMPTY, WSIZE};
use super::header::Header;

pub fn read_word(mem: &[u8], offset: usize) -> u32 {
    let mut word = [0; WSIZE];

    word.copy_from_slice(&mem[offset..offset + WSIZE]);

    u32::from_le_bytes(word)
}

pub fn write_word(mem: &mut [u8], offset: usize, value: u32) {
    mem[offset..offset + WSIZE].copy_from_slice(&value.to_le_bytes());
}

pub fn read_link(mem: &[u8], offset: usize) -> Option<Block> {
    match read_word(mem, offset) as usize {
        EMPTY => None,
        block => Some(Block::at(block)),
    }
}

pub fn write_link(mem: &mut [u8], offset: usize, link: Option<Block>) {
    let value = link.map_or(EMPTY, |block| block.offset());

    write_word(mem, offset, value as u32);
}

/// A handle to a block: the offset of its header word.
///
/// ```text
///   allocated:  | header | payload ............................ | footer |
///   free:       | header | next | prev | unused ............... | footer |
///               ^ block  ^ payload
/// ```
///
/// The handle carries no borrow of the memory, every accessor takes the
/// managed bytes explicitly.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Block(usize);

impl Block {
    pub fn at(offset: usize) -> Self {
        Block(offset)
    }

    pub fn from_payload(payload: usize) -> Self {
        Block(payload - WSIZE)
    }

    pub fn offset(self) -> usize {
        self.0
    }

    pub fn payload(self) -> usize {
        self.0 + WSIZE
    }

    pub fn header(self, mem: &[u8]) -> Header {
        Header::from(read_word(mem, self.0))
    }

    pub fn footer(self, mem: &[u8]) -> Header {
        Header::from(read_word(mem, self.footer_offset(mem)))
    }

    pub fn footer_offset(self, mem: &[u8]) -> usize {
        self.0 + self.get_size(mem) - WSIZE
    }

    pub fn get_size(self, mem: &[u8]) -> usize {
        self.header(mem).get_size()
    }

    pub fn is_allocated(self, mem: &[u8]) -> bool {
        self.header(mem).is_allocated()
    }

    pub fn usable_size(self, mem: &[u8]) -> usize {
        self.get_size(mem) - DSIZE
    }

    /// Writes the header, then the footer where the new header says it goes.
    pub fn write_tags(self, mem: &mut [u8], tag: Header) {
        write_word(mem, self.0, tag.as_word());

        let footer = self.footer_offset(mem);

        write_word(mem, footer, tag.as_word());
    }

    // The block physically after this one. For the last real block this is
    // the epilogue.
    pub fn successor(self, mem: &[u8]) -> Block {
        Block(self.0 + self.get_size(mem))
    }

    pub fn predecessor_tag(self, mem: &[u8]) -> Header {
        Header::from(read_word(mem, self.0 - WSIZE))
    }

    // The block physically before this one, found through its footer. For
    // the first real block this is the prologue.
    pub fn predecessor(self, mem: &[u8]) -> Block {
        Block(self.0 - self.predecessor_tag(mem).get_size())
    }

    pub fn next(self, mem: &[u8]) -> Option<Block> {
        read_link(mem, self.0 + WSIZE)
    }

    pub fn prev(self, mem: &[u8]) -> Option<Block> {
        read_link(mem, self.0 + DSIZE)
    }

    pub fn set_next(self, mem: &mut [u8], next: Option<Block>) {
        write_link(mem, self.0 + WSIZE, next)
    }

    pub fn set_prev(self, mem: &mut [u8], prev: Option<Block>) {
        write_link(mem, self.0 + DSIZE, prev)
    }
}
