use crate::clipper::constants::{HI_RANGE, LO_RANGE};
use crate::error::ClipperError;
use crate::utils::almost_equal::AlmostEqual;
use crate::utils::number::Number;

/// Integer or floating 2D coordinate. With the `xyz` feature every point also
/// carries a `z` tag that follows the point through clipping but never takes
/// part in comparisons.
#[derive(Debug, Clone, Copy, Default)]
pub struct Point<T: Number> {
    pub x: T,
    pub y: T,
    #[cfg(feature = "xyz")]
    pub z: T,
}

pub type IntPoint = Point<i64>;

pub type DoublePoint = Point<f64>;

pub type Path = Vec<IntPoint>;

pub type Paths = Vec<Path>;

impl<T: Number> PartialEq for Point<T> {
    #[inline(always)]
    fn eq(&self, other: &Self) -> bool {
        self.x == other.x && self.y == other.y
    }
}

impl<T: Number> Point<T> {
    #[inline(always)]
    pub fn new(x: T, y: T) -> Self {
        Self {
            x,
            y,
            #[cfg(feature = "xyz")]
            z: T::zero(),
        }
    }

    #[cfg(feature = "xyz")]
    #[inline(always)]
    pub fn with_z(x: T, y: T, z: T) -> Self {
        Self { x, y, z }
    }

    #[inline(always)]
    pub fn set(&mut self, x: T, y: T) -> &mut Self {
        self.x = x;
        self.y = y;
        self
    }

    #[inline(always)]
    pub fn update(&mut self, other: &Self) -> &mut Self {
        *self = *other;
        self
    }

    #[inline(always)]
    pub fn add(&self, other: &Self) -> Self {
        Self::new(self.x + other.x, self.y + other.y)
    }

    #[inline(always)]
    pub fn sub(&self, other: &Self) -> Self {
        Self::new(self.x - other.x, self.y - other.y)
    }

    #[inline(always)]
    pub fn scale_up(&self, value: T) -> Self {
        Self::new(self.x * value, self.y * value)
    }

    #[inline(always)]
    pub fn reverse(&self) -> Self {
        Self::new(-self.x, -self.y)
    }

    #[inline(always)]
    pub fn dot(&self, other: &Self) -> T {
        self.x * other.x + self.y * other.y
    }

    #[inline(always)]
    pub fn cross(&self, other: &Self) -> T {
        self.x * other.y - self.y * other.x
    }

    #[inline(always)]
    pub fn len2(&self, other: &Self) -> T {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    #[inline(always)]
    pub fn almost_equal(&self, other: &Self, tolerance: T) -> bool {
        self.x.almost_equal(other.x, Some(tolerance)) && self.y.almost_equal(other.y, Some(tolerance))
    }

    #[inline(always)]
    pub fn to_double(&self) -> DoublePoint {
        DoublePoint::new(self.x.as_f64(), self.y.as_f64())
    }
}

impl IntPoint {
    /// Switches `use_full_range` on for coordinates beyond the fast range and
    /// rejects coordinates that 128-bit products cannot hold either.
    pub fn range_test(&self, use_full_range: &mut bool) -> Result<(), ClipperError> {
        let (x, y) = (self.x.unsigned_abs(), self.y.unsigned_abs());

        if *use_full_range {
            if x > HI_RANGE as u64 || y > HI_RANGE as u64 {
                return Err(ClipperError::CoordinateOutOfRange { x: self.x, y: self.y });
            }
        } else if x > LO_RANGE as u64 || y > LO_RANGE as u64 {
            *use_full_range = true;
            return self.range_test(use_full_range);
        }

        Ok(())
    }
}

impl DoublePoint {
    #[inline(always)]
    pub fn length(&self) -> f64 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    /// Unit normal of the segment `pt1 -> pt2`, zero for coincident points.
    pub fn unit_normal(pt1: &IntPoint, pt2: &IntPoint) -> Self {
        if pt2.x == pt1.x && pt2.y == pt1.y {
            return Self::new(0.0, 0.0);
        }

        let dx = (pt2.x - pt1.x) as f64;
        let dy = (pt2.y - pt1.y) as f64;
        let f = 1.0 / (dx * dx + dy * dy).sqrt();

        Self::new(dy * f, -dx * f)
    }

    #[inline(always)]
    pub fn clipper_round(&self) -> IntPoint {
        IntPoint::new(i64::from_f64_rounded(self.x), i64::from_f64_rounded(self.y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_test_escalates_then_rejects() {
        let mut full = false;

        IntPoint::new(1000, -1000).range_test(&mut full).unwrap();
        assert!(!full);

        IntPoint::new(LO_RANGE + 1, 0).range_test(&mut full).unwrap();
        assert!(full);

        assert!(matches!(
            IntPoint::new(0, i64::MIN).range_test(&mut full),
            Err(ClipperError::CoordinateOutOfRange { x: 0, y: i64::MIN })
        ));
    }

    #[test]
    fn equality_ignores_tag() {
        let a = IntPoint::new(3, 4);
        let mut b = IntPoint::new(3, 4);
        #[cfg(feature = "xyz")]
        {
            b.z = 7;
        }
        b.set(3, 4);
        assert_eq!(a, b);
        assert_ne!(a, IntPoint::new(4, 3));
    }

    #[test]
    fn unit_normal_points_right_of_travel() {
        let n = DoublePoint::unit_normal(&IntPoint::new(0, 0), &IntPoint::new(10, 0));
        assert!(n.x.abs() < 1e-12);
        assert!((n.y + 1.0).abs() < 1e-12);
        let zero = DoublePoint::unit_normal(&IntPoint::new(5, 5), &IntPoint::new(5, 5));
        assert_eq!(zero, DoublePoint::new(0.0, 0.0));
    }

    #[test]
    fn arithmetic_helpers() {
        let a = IntPoint::new(2, 3);
        let b = IntPoint::new(5, 7);
        assert_eq!(a.add(&b), IntPoint::new(7, 10));
        assert_eq!(b.sub(&a), IntPoint::new(3, 4));
        assert_eq!(a.len2(&b), 25);
        assert_eq!(a.cross(&b), 2 * 7 - 3 * 5);
        assert_eq!(DoublePoint::new(-1.5, 2.5).clipper_round(), IntPoint::new(-2, 3));
    }
}
