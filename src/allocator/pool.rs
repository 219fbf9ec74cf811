use crate::allocator::{Block, MemoryManager};
use crate::error::ClipperError;
use std::any::TypeId;
use std::mem::size_of;
use std::ops::{Index, IndexMut};

struct Segment<T> {
    items: Vec<T>,
    block: Block,
}

/// Index addressed slot store. Slots are numbered from 1 so that 0 can act as
/// the "no link" value inside the structures that reference each other.
///
/// Slots live in fixed size segments. Every segment is a block granted by the
/// engine's memory manager, and its backing vector is handed back to that
/// manager on `release` so an arena can give the same storage to the next run.
/// A segment never grows past its capacity, so slot addresses stay put.
pub struct Pool<T> {
    segments: Vec<Segment<T>>,
    segment_len: usize,
    len: usize,
}

impl<T: 'static> Pool<T> {
    pub fn new() -> Self {
        Self {
            segments: Vec::new(),
            segment_len: 0,
            len: 0,
        }
    }

    #[inline(always)]
    fn segment_bytes(&self) -> usize {
        self.segment_len * size_of::<T>()
    }

    fn grow(&mut self, manager: &mut dyn MemoryManager) -> Result<(), ClipperError> {
        if self.segments.is_empty() {
            self.segment_len = (manager.segment_size() / size_of::<T>().max(1)).max(1);
        }

        let block = manager.allocate(self.segment_bytes())?;
        let items = manager
            .reuse(&block, TypeId::of::<Vec<T>>())
            .and_then(|storage| storage.downcast::<Vec<T>>().ok())
            .map(|storage| *storage)
            .filter(|items| items.capacity() >= self.segment_len)
            .unwrap_or_else(|| Vec::with_capacity(self.segment_len));

        self.segments.push(Segment { items, block });

        Ok(())
    }

    pub fn alloc(&mut self, manager: &mut dyn MemoryManager, value: T) -> Result<usize, ClipperError> {
        if self.len == self.segments.len() * self.segment_len {
            self.grow(manager)?;
        } else if self.len % self.segment_len == 0 {
            let bytes = self.segment_bytes();
            let segment = &mut self.segments[self.len / self.segment_len];

            // segments kept across an arena reset have to be charged again
            if !manager.is_live(&segment.block) {
                segment.block = manager.allocate(bytes)?;
            }
        }

        let segment_len = self.segment_len;
        self.segments[self.len / segment_len].items.push(value);
        self.len += 1;

        Ok(self.len)
    }

    /// Drops every slot. Indices handed out before are dead afterwards.
    ///
    /// An arena only reclaims memory in bulk, so its segments stay with the
    /// pool and are refilled in place. Any other manager gets them back now.
    pub fn clear(&mut self, manager: &mut dyn MemoryManager) {
        if manager.is_arena() {
            self.segments.iter_mut().for_each(|segment| segment.items.clear());
        } else {
            self.release(manager);
        }

        self.len = 0;
    }

    /// Drops every slot and hands all segment storage back to `manager`.
    pub fn release(&mut self, manager: &mut dyn MemoryManager) {
        let bytes = self.segment_bytes();

        for mut segment in self.segments.drain(..) {
            segment.items.clear();
            manager.recycle(&segment.block, TypeId::of::<Vec<T>>(), Box::new(segment.items));
            manager.deallocate(segment.block, bytes);
        }

        self.len = 0;
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline(always)]
    pub fn contains(&self, index: usize) -> bool {
        index != 0 && index <= self.len
    }

    /// Number of segments currently held, live or kept for refilling.
    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    pub fn indices(&self) -> std::ops::RangeInclusive<usize> {
        1..=self.len
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        self.segments.iter().flat_map(|segment| segment.items.iter())
    }
}

impl<T: 'static> Default for Pool<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Index<usize> for Pool<T> {
    type Output = T;

    #[inline(always)]
    fn index(&self, index: usize) -> &T {
        let slot = index - 1;
        &self.segments[slot / self.segment_len].items[slot % self.segment_len]
    }
}

impl<T> IndexMut<usize> for Pool<T> {
    #[inline(always)]
    fn index_mut(&mut self, index: usize) -> &mut T {
        let slot = index - 1;
        let segment_len = self.segment_len;
        &mut self.segments[slot / segment_len].items[slot % segment_len]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::allocator::{ArenaConfig, ArenaMemoryManager, SimpleMemoryManager};

    #[test]
    fn indices_start_at_one() {
        let mut manager = SimpleMemoryManager::new();
        let mut pool: Pool<u64> = Pool::new();
        let a = pool.alloc(&mut manager, 10).unwrap();
        let b = pool.alloc(&mut manager, 20).unwrap();
        assert_eq!((a, b), (1, 2));
        assert_eq!(pool[b], 20);
        pool[a] = 11;
        assert_eq!(pool[a], 11);
        assert!(!pool.contains(0));
        assert!(pool.contains(2));
        assert!(!pool.contains(3));
    }

    #[test]
    fn slots_span_segments_in_order() {
        let mut manager = ArenaMemoryManager::new(ArenaConfig::new(32, 1));
        let mut pool: Pool<u64> = Pool::new();
        for value in 0..10u64 {
            pool.alloc(&mut manager, value).unwrap();
        }
        // four u64 slots per 32 byte chunk
        assert_eq!(pool.segment_count(), 3);
        assert_eq!(manager.chunk_count(), 3);
        assert_eq!(pool[5], 4);
        assert_eq!(pool[10], 9);
        assert_eq!(pool.iter().copied().collect::<Vec<_>>(), (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn clear_returns_segments_to_simple_manager() {
        let mut manager = SimpleMemoryManager::new();
        let mut pool: Pool<[u8; 40]> = Pool::new();
        for _ in 0..5 {
            pool.alloc(&mut manager, [0; 40]).unwrap();
        }
        assert_eq!(manager.live_blocks(), 1);
        // 102 slots of 40 bytes fit the 4 KiB segment
        assert_eq!(manager.live_bytes(), 102 * 40);
        pool.clear(&mut manager);
        assert_eq!(manager.live_blocks(), 0);
        assert_eq!(pool.segment_count(), 0);
        assert!(pool.is_empty());
    }

    #[test]
    fn arena_clear_refills_segments_in_place() {
        let mut manager = ArenaMemoryManager::new(ArenaConfig::new(64, 1));
        let mut pool: Pool<u64> = Pool::new();
        for value in 0..12u64 {
            pool.alloc(&mut manager, value).unwrap();
        }
        let chunks = manager.chunk_count();

        for _ in 0..20 {
            pool.clear(&mut manager);
            for value in 0..12u64 {
                pool.alloc(&mut manager, value).unwrap();
            }
        }
        assert_eq!(pool.segment_count(), 2);
        assert_eq!(manager.chunk_count(), chunks);
    }

    #[test]
    fn arena_hands_released_storage_to_next_run() {
        let mut manager = ArenaMemoryManager::new(ArenaConfig::new(256, 1));
        let mut pool: Pool<u64> = Pool::new();
        pool.alloc(&mut manager, 1).unwrap();
        let address: *const u64 = &pool[1];

        pool.release(&mut manager);
        assert_eq!(manager.retained_bytes(), 256);
        manager.reset();

        pool.alloc(&mut manager, 2).unwrap();
        assert_eq!(&pool[1] as *const u64, address);
        assert_eq!(manager.retained_bytes(), 0);
    }

    #[test]
    fn slot_larger_than_chunk_surfaces_configuration_error() {
        let mut manager = ArenaMemoryManager::new(ArenaConfig {
            allow_big_chunks: false,
            ..ArenaConfig::new(16, 1)
        });
        let mut pool: Pool<[u64; 8]> = Pool::new();
        assert!(matches!(
            pool.alloc(&mut manager, [0; 8]),
            Err(ClipperError::ChunkTooSmall { requested: 64, chunk_size: 16 })
        ));
        assert!(pool.is_empty());
    }
}
