mod arena;
mod block;
mod check;
pub(crate) mod constants;
mod free_list;
mod header;
mod heap;
mod size_class;


pub use arena::{Arena, VecArena};
pub use check::BlockInfo;
pub use heap::{Heap, Payload};
