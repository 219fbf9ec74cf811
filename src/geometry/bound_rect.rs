use crate::geometry::point::Point;
use crate::utils::number::Number;

/// Axis-aligned bounds. `top` holds the smallest `y`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BoundRect<T: Number> {
    pub left: T,
    pub top: T,
    pub right: T,
    pub bottom: T,
}

pub type IntRect = BoundRect<i64>;

impl<T: Number> BoundRect<T> {
    pub fn new(left: T, top: T, right: T, bottom: T) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub fn from_point(point: &Point<T>) -> Self {
        Self::new(point.x, point.y, point.x, point.y)
    }

    pub fn extend(&mut self, point: &Point<T>) {
        self.left = self.left.min_num(point.x);
        self.right = self.right.max_num(point.x);
        self.top = self.top.min_num(point.y);
        self.bottom = self.bottom.max_num(point.y);
    }

    pub fn width(&self) -> T {
        self.right - self.left
    }

    pub fn height(&self) -> T {
        self.bottom - self.top
    }
}
