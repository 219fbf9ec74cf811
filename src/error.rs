use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IoDirection {
    Read,
    Write,
}

impl fmt::Display for IoDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IoDirection::Read => write!(f, "read"),
            IoDirection::Write => write!(f, "write"),
        }
    }
}

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ClipperError {
    #[error("chunk size {chunk_size} is smaller than requested allocation size {requested}")]
    ChunkTooSmall { requested: usize, chunk_size: usize },
    #[error("coordinate ({x}, {y}) is outside the supported range")]
    CoordinateOutOfRange { x: i64, y: i64 },
    #[error("execute called while another execute is in progress")]
    ExecuteLocked,
    #[error("open paths can only be added as subject paths")]
    OpenPathsNotSupported,
    #[error("intersections could not be ordered for processing")]
    IntersectionOrder,
    #[error("local maxima without a matching pair edge")]
    MaximaResolution,
    #[error("short {direction} in {function}: intended {expected} bytes, transferred {actual}")]
    Io {
        direction: IoDirection,
        function: &'static str,
        expected: usize,
        actual: usize,
        #[source]
        source: std::io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_carry_sizes() {
        let err = ClipperError::ChunkTooSmall {
            requested: 4096,
            chunk_size: 1024,
        };
        assert_eq!(
            err.to_string(),
            "chunk size 1024 is smaller than requested allocation size 4096"
        );

        let err = ClipperError::Io {
            direction: IoDirection::Read,
            function: "read_clipper_paths",
            expected: 16,
            actual: 3,
            source: std::io::Error::from(std::io::ErrorKind::UnexpectedEof),
        };
        assert_eq!(
            err.to_string(),
            "short read in read_clipper_paths: intended 16 bytes, transferred 3"
        );
    }
}
