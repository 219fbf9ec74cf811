use std::any::{Any, TypeId};

use crate::allocator::{Block, BlockKind, MemoryManager};
use crate::constants::{ARENA_ALIGNMENT, DEFAULT_CHUNK_SIZE};
use crate::error::ClipperError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArenaConfig {
    pub chunk_size: usize,
    pub initial_chunks: usize,
    /// Serve requests larger than `chunk_size` from dedicated blocks instead of failing.
    pub allow_big_chunks: bool,
    pub print_debug_messages: bool,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            initial_chunks: 1,
            allow_big_chunks: true,
            print_debug_messages: false,
        }
    }
}

impl ArenaConfig {
    pub fn new(chunk_size: usize, initial_chunks: usize) -> Self {
        Self {
            chunk_size,
            initial_chunks,
            ..Self::default()
        }
    }
}

#[inline(always)]
fn align(n: usize) -> usize {
    (n + ARENA_ALIGNMENT - 1) / ARENA_ALIGNMENT * ARENA_ALIGNMENT
}

/// Storage a pool handed back, parked in the chunk it was charged to.
struct Parked {
    kind: TypeId,
    bytes: usize,
    storage: Box<dyn Any>,
}

#[derive(Default)]
struct Chunk {
    parked: Vec<Parked>,
}

impl Chunk {
    fn retained_bytes(&self) -> usize {
        self.parked.iter().map(|parked| parked.bytes).sum()
    }
}

/// Bump allocator over a growable list of fixed size chunks.
///
/// `deallocate` does nothing; memory comes back only through `reset` (rewind
/// to the first chunk, drop oversized blocks) or `free` (additionally drop all
/// chunks but the first together with the storage parked in them). At least
/// one chunk always exists, so a zero sized request still yields a valid block.
pub struct ArenaMemoryManager {
    config: ArenaConfig,
    chunks: Vec<Chunk>,
    big_chunks: Vec<usize>,
    current_chunk: usize,
    cursor: usize,
    epoch: u32,
}

impl ArenaMemoryManager {
    pub fn new(config: ArenaConfig) -> Self {
        let chunk_count = config.initial_chunks.max(1);
        let config = ArenaConfig {
            initial_chunks: chunk_count,
            ..config
        };

        Self {
            config,
            chunks: (0..chunk_count).map(|_| Chunk::default()).collect(),
            big_chunks: Vec::new(),
            current_chunk: 0,
            cursor: 0,
            epoch: 0,
        }
    }

    pub fn config(&self) -> &ArenaConfig {
        &self.config
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    pub fn big_chunk_count(&self) -> usize {
        self.big_chunks.len()
    }

    pub fn current_chunk(&self) -> usize {
        self.current_chunk
    }

    /// Bytes of pool storage parked in the chunks, waiting to be reused.
    pub fn retained_bytes(&self) -> usize {
        self.chunks.iter().map(Chunk::retained_bytes).sum()
    }

    fn allocate_big_chunk(&mut self, n: usize) -> Result<Block, ClipperError> {
        if !self.config.allow_big_chunks {
            log::error!(
                "arena chunk size {} is smaller than requested allocation size {}",
                self.config.chunk_size,
                n
            );
            return Err(ClipperError::ChunkTooSmall {
                requested: n,
                chunk_size: self.config.chunk_size,
            });
        }

        if self.config.print_debug_messages {
            log::warn!(
                "arena chunk size {} is smaller than requested allocation size {}, using a dedicated block",
                self.config.chunk_size,
                n
            );
        }

        self.big_chunks.push(n);

        Ok(Block {
            kind: BlockKind::BigChunk,
            index: self.big_chunks.len() - 1,
            offset: 0,
            len: n,
            epoch: self.epoch,
        })
    }
}

impl MemoryManager for ArenaMemoryManager {
    fn allocate(&mut self, n: usize) -> Result<Block, ClipperError> {
        let n = align(n);

        if self.cursor + n > self.config.chunk_size {
            if n > self.config.chunk_size {
                return self.allocate_big_chunk(n);
            }

            self.current_chunk += 1;
            if self.current_chunk >= self.chunks.len() {
                self.chunks.push(Chunk::default());
            }
            self.cursor = 0;
        }

        let block = Block {
            kind: BlockKind::Chunk,
            index: self.current_chunk,
            offset: self.cursor,
            len: n,
            epoch: self.epoch,
        };
        self.cursor += n;

        Ok(block)
    }

    fn deallocate(&mut self, _block: Block, _n: usize) {}

    fn recycle(&mut self, block: &Block, kind: TypeId, storage: Box<dyn Any>) {
        if block.kind != BlockKind::Chunk {
            return;
        }

        // chunks outlive `reset`, so stale blocks still name a valid chunk
        if let Some(chunk) = self.chunks.get_mut(block.index) {
            chunk.parked.retain(|parked| parked.kind != kind);
            chunk.parked.push(Parked {
                kind,
                bytes: block.len,
                storage,
            });
        }
    }

    fn reuse(&mut self, block: &Block, kind: TypeId) -> Option<Box<dyn Any>> {
        if block.kind != BlockKind::Chunk {
            return None;
        }

        let chunk = self.chunks.get_mut(block.index)?;
        let position = chunk.parked.iter().position(|parked| parked.kind == kind)?;

        Some(chunk.parked.swap_remove(position).storage)
    }

    fn reset(&mut self) {
        self.current_chunk = 0;
        self.cursor = 0;
        self.big_chunks.clear();
        self.epoch = self.epoch.wrapping_add(1);
    }

    fn free(&mut self) {
        self.chunks.truncate(1);
        self.chunks.shrink_to_fit();

        if let Some(first) = self.chunks.first_mut() {
            first.parked.clear();
        }

        self.reset();
    }

    fn is_arena(&self) -> bool {
        true
    }

    fn is_live(&self, block: &Block) -> bool {
        if block.epoch != self.epoch {
            return false;
        }

        match block.kind {
            BlockKind::Chunk => {
                block.index < self.current_chunk
                    || (block.index == self.current_chunk && block.offset + block.len <= self.cursor)
            }
            BlockKind::BigChunk => block.index < self.big_chunks.len(),
            BlockKind::Slot => false,
        }
    }

    fn segment_size(&self) -> usize {
        self.config.chunk_size / ARENA_ALIGNMENT * ARENA_ALIGNMENT
    }

    fn reserved_bytes(&self) -> usize {
        self.chunks.len() * self.config.chunk_size + self.big_chunks.iter().sum::<usize>()
    }
}
