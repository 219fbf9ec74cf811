pub mod bound_rect;
pub mod point;
pub mod polygon;

pub use bound_rect::IntRect;
pub use point::{DoublePoint, IntPoint, Path, Paths, Point};
