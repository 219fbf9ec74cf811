pub const UNASSIGNED: usize = 0;

/// Output index marking an edge that never produces output (open path ends).
pub const SKIP: usize = usize::MAX;

pub const HORIZONTAL: f64 = -1.0e40;

pub const LO_RANGE: i64 = 0x3FFF_FFFF;

pub const HI_RANGE: i64 = 0x3FFF_FFFF_FFFF_FFFF;

pub const TOLERANCE: f64 = 1.0e-20;

pub const TWO_PI: f64 = std::f64::consts::PI * 2.0;

pub const DEF_ARC_TOLERANCE: f64 = 0.25;

pub const DEF_MITER_LIMIT: f64 = 2.0;

pub const DEF_CLEAN_DISTANCE: f64 = 1.415;

#[inline(always)]
pub fn near_zero(value: f64) -> bool {
    value > -TOLERANCE && value < TOLERANCE
}
