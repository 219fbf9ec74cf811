use crate::clipper::constants::UNASSIGNED;

/// A vertex where a left and a right bound start. Either bound may be absent
/// (index 0) when the minimum sits on the end of an open path.
#[derive(Debug, Clone, Copy)]
pub struct LocalMinimum {
    pub y: i64,
    pub left_bound: usize,
    pub right_bound: usize,
}

impl LocalMinimum {
    pub fn new(y: i64, left_bound: usize, right_bound: usize) -> Self {
        Self {
            y,
            left_bound,
            right_bound,
        }
    }

    #[inline(always)]
    pub fn has_left(&self) -> bool {
        self.left_bound != UNASSIGNED
    }

    #[inline(always)]
    pub fn has_right(&self) -> bool {
        self.right_bound != UNASSIGNED
    }
}

/// Minima ordered by descending y with a cursor for the sweep.
#[derive(Debug, Default)]
pub struct MinimaList {
    items: Vec<LocalMinimum>,
    current: usize,
}

impl MinimaList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, minimum: LocalMinimum) {
        self.items.push(minimum);
    }

    /// Sorts by descending y, keeping insertion order among equal y.
    pub fn sort(&mut self) {
        self.items.sort_by(|a, b| b.y.cmp(&a.y));
        self.current = 0;
    }

    pub fn rewind(&mut self) {
        self.current = 0;
    }

    pub fn pop(&mut self, y: i64) -> Option<LocalMinimum> {
        match self.items.get(self.current) {
            Some(minimum) if minimum.y == y => {
                self.current += 1;
                Some(*minimum)
            }
            _ => None,
        }
    }

    #[inline(always)]
    pub fn is_pending(&self) -> bool {
        self.current < self.items.len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, LocalMinimum> {
        self.items.iter()
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.current = 0;
    }
}
