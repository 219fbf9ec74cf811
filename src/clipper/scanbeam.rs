use std::collections::BinaryHeap;

/// Pending sweep positions, popped largest first with duplicates collapsed.
#[derive(Debug, Default)]
pub struct Scanbeam {
    heap: BinaryHeap<i64>,
}

impl Scanbeam {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline(always)]
    pub fn insert(&mut self, y: i64) {
        self.heap.push(y);
    }

    pub fn pop(&mut self) -> Option<i64> {
        let y = self.heap.pop()?;

        while self.heap.peek() == Some(&y) {
            self.heap.pop();
        }

        Some(y)
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn clear(&mut self) {
        self.heap.clear();
    }
}
