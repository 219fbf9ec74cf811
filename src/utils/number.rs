use crate::constants::TOL_F64;
use crate::utils::{almost_equal::AlmostEqual, round::ClipperRound};
use num_traits::{FromPrimitive, Num, Signed, ToPrimitive};
use std::fmt::Debug;

pub trait Number:
    Num + Copy + Debug + Default + PartialOrd + FromPrimitive + ToPrimitive + Signed + AlmostEqual + ClipperRound
{
    fn min_num(self, other: Self) -> Self;
    fn max_num(self, other: Self) -> Self;
    fn tol() -> Self;

    /// Lossy conversion used by geometric helpers that work in floating point.
    #[inline(always)]
    fn as_f64(self) -> f64 {
        self.to_f64().unwrap_or(0.0)
    }

    /// Rounds half away from zero into `Self`, saturating at the type bounds.
    #[inline(always)]
    fn from_f64_rounded(value: f64) -> Self {
        let rounded = value.clipper_rounded();
        Self::from_f64(rounded).unwrap_or_else(|| {
            if rounded < 0.0 {
                Self::min_value_num()
            } else {
                Self::max_value_num()
            }
        })
    }

    fn min_value_num() -> Self;
    fn max_value_num() -> Self;
}

impl Number for f64 {
    #[inline(always)]
    fn min_num(self, other: Self) -> Self {
        self.min(other)
    }
    #[inline(always)]
    fn max_num(self, other: Self) -> Self {
        self.max(other)
    }
    #[inline(always)]
    fn tol() -> Self {
        TOL_F64
    }
    #[inline(always)]
    fn from_f64_rounded(value: f64) -> Self {
        value
    }
    fn min_value_num() -> Self {
        f64::MIN
    }
    fn max_value_num() -> Self {
        f64::MAX
    }
}

impl Number for i64 {
    #[inline(always)]
    fn min_num(self, other: Self) -> Self {
        self.min(other)
    }
    #[inline(always)]
    fn max_num(self, other: Self) -> Self {
        self.max(other)
    }
    #[inline(always)]
    fn tol() -> Self {
        0
    }
    fn min_value_num() -> Self {
        i64::MIN
    }
    fn max_value_num() -> Self {
        i64::MAX
    }
}

impl Number for i32 {
    #[inline(always)]
    fn min_num(self, other: Self) -> Self {
        self.min(other)
    }
    #[inline(always)]
    fn max_num(self, other: Self) -> Self {
        self.max(other)
    }
    #[inline(always)]
    fn tol() -> Self {
        0
    }
    fn min_value_num() -> Self {
        i32::MIN
    }
    fn max_value_num() -> Self {
        i32::MAX
    }
}
