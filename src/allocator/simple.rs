use std::any::{Any, TypeId};

use crate::allocator::{Block, BlockKind, MemoryManager};
use crate::constants::SIMPLE_SEGMENT_SIZE;
use crate::error::ClipperError;

/// Immediate allocator: every grant is tracked on its own and released one by
/// one. Recycled storage is dropped straight away.
pub struct SimpleMemoryManager {
    slots: Vec<(u32, Option<usize>)>,
    free_list: Vec<usize>,
    live_bytes: usize,
}

impl SimpleMemoryManager {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free_list: Vec::new(),
            live_bytes: 0,
        }
    }

    pub fn live_blocks(&self) -> usize {
        self.slots.len() - self.free_list.len()
    }

    /// Bytes granted and not yet deallocated.
    pub fn live_bytes(&self) -> usize {
        self.live_bytes
    }
}

impl Default for SimpleMemoryManager {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryManager for SimpleMemoryManager {
    fn allocate(&mut self, n: usize) -> Result<Block, ClipperError> {
        let index = match self.free_list.pop() {
            Some(index) => {
                let slot = &mut self.slots[index];
                slot.0 = slot.0.wrapping_add(1);
                slot.1 = Some(n);
                index
            }
            None => {
                self.slots.push((0, Some(n)));
                self.slots.len() - 1
            }
        };

        self.live_bytes += n;

        Ok(Block {
            kind: BlockKind::Slot,
            index,
            offset: 0,
            len: n,
            epoch: self.slots[index].0,
        })
    }

    fn deallocate(&mut self, block: Block, _n: usize) {
        if !self.is_live(&block) {
            return;
        }

        self.slots[block.index].1 = None;
        self.free_list.push(block.index);
        self.live_bytes -= block.len;
    }

    fn recycle(&mut self, _block: &Block, _kind: TypeId, storage: Box<dyn Any>) {
        drop(storage);
    }

    fn reuse(&mut self, _block: &Block, _kind: TypeId) -> Option<Box<dyn Any>> {
        None
    }

    fn reset(&mut self) {}

    fn free(&mut self) {}

    fn is_arena(&self) -> bool {
        false
    }

    fn is_live(&self, block: &Block) -> bool {
        matches!(
            self.slots.get(block.index),
            Some((epoch, Some(_))) if block.kind == BlockKind::Slot && *epoch == block.epoch
        )
    }

    fn reserved_bytes(&self) -> usize {
        self.live_bytes
    }

    fn segment_size(&self) -> usize {
        SIMPLE_SEGMENT_SIZE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deallocate_releases_and_reuses_slot() {
        let mut manager = SimpleMemoryManager::new();
        let a = manager.allocate(16).unwrap();
        let b = manager.allocate(8).unwrap();
        assert_eq!(manager.live_blocks(), 2);
        assert_eq!(manager.live_bytes(), 24);

        manager.deallocate(a, 16);
        assert_eq!(manager.live_blocks(), 1);
        assert_eq!(manager.live_bytes(), 8);
        assert!(!manager.is_live(&a));

        let c = manager.allocate(4).unwrap();
        assert_eq!(c.index, a.index);
        assert!(!manager.is_live(&a), "stale handle must not alias the new block");
        assert!(manager.is_live(&c));
        assert!(manager.is_live(&b));
    }

    #[test]
    fn reset_keeps_blocks_alive() {
        let mut manager = SimpleMemoryManager::new();
        let block = manager.allocate(32).unwrap();
        manager.reset();
        manager.free();
        assert!(manager.is_live(&block));
    }

    #[test]
    fn double_deallocate_is_ignored() {
        let mut manager = SimpleMemoryManager::new();
        let block = manager.allocate(32).unwrap();
        manager.deallocate(block, 32);
        manager.deallocate(block, 32);
        assert_eq!(manager.live_blocks(), 0);
        assert_eq!(manager.live_bytes(), 0);
    }

    #[test]
    fn recycled_storage_is_never_handed_back() {
        let mut manager = SimpleMemoryManager::new();
        let block = manager.allocate(64).unwrap();
        manager.recycle(&block, TypeId::of::<Vec<u64>>(), Box::new(Vec::<u64>::with_capacity(8)));
        assert!(manager.reuse(&block, TypeId::of::<Vec<u64>>()).is_none());
    }
}
