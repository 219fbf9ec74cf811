//! Binary exchange of path sets with other processes.
//!
//! Every value is a little-endian `i64` or `f64`. A path set is written as
//! its path count followed by, for each path, the declared point count and
//! the interleaved coordinates. The prefixed layout writes every point count
//! before any coordinate so a streaming reader can size its buffers first.

pub mod iopaths;

pub use iopaths::{
    paths_serialized_size, read_clipper_paths, read_double_paths, read_double_paths_unscaled, read_prefixed_clipper_paths, write_clipper_paths,
    write_clipper_slice, write_double_paths, write_prefixed_clipper_paths, IoErrorPolicy, IoPaths,
};

/// Whether written paths repeat their first point after the last one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PathCloseMode {
    #[default]
    Open,
    Loop,
}
