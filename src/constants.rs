pub const TOL_F64: f64 = 1e-9;

pub const TOL_F32: f32 = 1e-6;

pub const ARENA_ALIGNMENT: usize = 8;

pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

pub const SIMPLE_SEGMENT_SIZE: usize = 4 * 1024;
