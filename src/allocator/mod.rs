//! Memory managers backing every structure the engine creates.
//!
//! Engine structures live in [`Pool`]s, which keep their slots in fixed size
//! typed segments. A segment is charged to the manager through
//! [`MemoryManager::allocate`] and its storage is handed back through
//! [`MemoryManager::recycle`] once the pool lets go of it.
//!
//! Two personalities share one call surface. [`SimpleMemoryManager`] drops
//! recycled storage at once and releases every grant individually.
//! [`ArenaMemoryManager`] bump-allocates grants from fixed size chunks, keeps
//! recycled storage parked in the chunk it was charged to and only gives
//! memory back in bulk. Blocks are handles rather than pointers, so a block
//! used after its memory was reclaimed is detected instead of aliasing.

pub mod arena;
pub mod pool;
pub mod simple;

pub use arena::{ArenaConfig, ArenaMemoryManager};
pub use pool::Pool;
pub use simple::SimpleMemoryManager;

use std::any::{Any, TypeId};

use crate::error::ClipperError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    Slot,
    Chunk,
    BigChunk,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Block {
    pub kind: BlockKind,
    pub index: usize,
    pub offset: usize,
    pub len: usize,
    pub(crate) epoch: u32,
}

pub trait MemoryManager {
    fn allocate(&mut self, n: usize) -> Result<Block, ClipperError>;

    fn deallocate(&mut self, block: Block, n: usize);

    /// Takes back emptied storage that was charged to `block`. Managers that
    /// do not retain memory drop it.
    fn recycle(&mut self, block: &Block, kind: TypeId, storage: Box<dyn Any>);

    /// Storage of type `kind` parked where `block` was carved from, if any.
    fn reuse(&mut self, block: &Block, kind: TypeId) -> Option<Box<dyn Any>>;

    /// Reclaims memory in bulk. Blocks handed out before the call are invalid afterwards.
    fn reset(&mut self);

    /// Like `reset`, additionally returning spare memory to the system.
    fn free(&mut self);

    fn is_arena(&self) -> bool;

    fn is_live(&self, block: &Block) -> bool;

    /// Preferred size in bytes of one grant when many small objects are stored together.
    fn segment_size(&self) -> usize;

    /// Bytes currently held on behalf of the engine, granted or retained.
    fn reserved_bytes(&self) -> usize;
}
