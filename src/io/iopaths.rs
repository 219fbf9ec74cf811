use std::io::{ErrorKind, Read, Write};

use crate::error::{ClipperError, IoDirection};
use crate::geometry::point::{DoublePoint, IntPoint, Path, Paths};
use crate::io::PathCloseMode;

const WORD: usize = std::mem::size_of::<i64>();
const POINT: usize = 2 * WORD;

fn io_error(
    direction: IoDirection,
    function: &'static str,
    expected: usize,
    actual: usize,
    source: std::io::Error,
) -> ClipperError {
    ClipperError::Io {
        direction,
        function,
        expected,
        actual,
        source,
    }
}

/// Fills `buf` completely, reporting how many bytes arrived when it cannot.
fn read_bytes<R: Read>(reader: &mut R, buf: &mut [u8], function: &'static str) -> Result<(), ClipperError> {
    let mut filled = 0;

    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => {
                let source = std::io::Error::from(ErrorKind::UnexpectedEof);
                return Err(io_error(IoDirection::Read, function, buf.len(), filled, source));
            }
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => {}
            Err(e) => return Err(io_error(IoDirection::Read, function, buf.len(), filled, e)),
        }
    }

    Ok(())
}

fn write_bytes<W: Write>(writer: &mut W, buf: &[u8], function: &'static str) -> Result<(), ClipperError> {
    let mut written = 0;

    while written < buf.len() {
        match writer.write(&buf[written..]) {
            Ok(0) => {
                let source = std::io::Error::from(ErrorKind::WriteZero);
                return Err(io_error(IoDirection::Write, function, buf.len(), written, source));
            }
            Ok(n) => written += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => {}
            Err(e) => return Err(io_error(IoDirection::Write, function, buf.len(), written, e)),
        }
    }

    Ok(())
}

fn read_i64<R: Read>(reader: &mut R, function: &'static str) -> Result<i64, ClipperError> {
    let mut buf = [0u8; WORD];

    read_bytes(reader, &mut buf, function)?;

    Ok(i64::from_le_bytes(buf))
}

fn read_count<R: Read>(reader: &mut R, function: &'static str) -> Result<usize, ClipperError> {
    let value = read_i64(reader, function)?;

    usize::try_from(value).map_err(|_| {
        let source = std::io::Error::new(ErrorKind::InvalidData, format!("negative count {}", value));
        io_error(IoDirection::Read, function, WORD, WORD, source)
    })
}

fn read_int_point<R: Read>(reader: &mut R, function: &'static str) -> Result<IntPoint, ClipperError> {
    let mut buf = [0u8; POINT];

    read_bytes(reader, &mut buf, function)?;

    let (x, y) = buf.split_at(WORD);

    Ok(IntPoint::new(
        i64::from_le_bytes(x.try_into().unwrap_or_default()),
        i64::from_le_bytes(y.try_into().unwrap_or_default()),
    ))
}

fn read_double_pair<R: Read>(reader: &mut R, function: &'static str) -> Result<(f64, f64), ClipperError> {
    let mut buf = [0u8; POINT];

    read_bytes(reader, &mut buf, function)?;

    let (x, y) = buf.split_at(WORD);

    Ok((
        f64::from_le_bytes(x.try_into().unwrap_or_default()),
        f64::from_le_bytes(y.try_into().unwrap_or_default()),
    ))
}

fn declared_count(path: &Path, add_last: bool) -> i64 {
    path.len() as i64 + i64::from(add_last && !path.is_empty())
}

fn add_last(paths: &Paths, mode: PathCloseMode) -> bool {
    mode == PathCloseMode::Loop && !paths.is_empty()
}

fn encode_int_points(path: &Path, add_last: bool, out: &mut Vec<u8>) {
    for pt in path.iter().chain(path.first().filter(|_| add_last)) {
        out.extend_from_slice(&pt.x.to_le_bytes());
        out.extend_from_slice(&pt.y.to_le_bytes());
    }
}

/// Number of bytes [`write_clipper_paths`] produces for `paths`.
pub fn paths_serialized_size(paths: &Paths, mode: PathCloseMode) -> usize {
    let points: usize = paths.iter().map(|path| path.len()).sum();
    let mut words = 2 * points + 1 + paths.len();

    if add_last(paths, mode) {
        words += 2 * paths.iter().filter(|path| !path.is_empty()).count();
    }

    words * WORD
}

/// Appends the path set stored in `reader` to `paths`.
pub fn read_clipper_paths<R: Read>(reader: &mut R, paths: &mut Paths) -> Result<(), ClipperError> {
    const FUNCTION: &str = "read_clipper_paths";
    let count = read_count(reader, FUNCTION)?;

    for _ in 0..count {
        let points = read_count(reader, FUNCTION)?;
        let mut path = Path::new();

        for _ in 0..points {
            path.push(read_int_point(reader, FUNCTION)?);
        }

        paths.push(path);
    }

    Ok(())
}

pub fn write_clipper_paths<W: Write>(writer: &mut W, paths: &Paths, mode: PathCloseMode) -> Result<(), ClipperError> {
    const FUNCTION: &str = "write_clipper_paths";
    let add_last = add_last(paths, mode);

    write_bytes(writer, &(paths.len() as i64).to_le_bytes(), FUNCTION)?;

    for path in paths {
        let mut buf = Vec::with_capacity(WORD + (path.len() + 1) * POINT);

        buf.extend_from_slice(&declared_count(path, add_last).to_le_bytes());
        encode_int_points(path, add_last, &mut buf);
        write_bytes(writer, &buf, FUNCTION)?;
    }

    Ok(())
}

pub fn write_prefixed_clipper_paths<W: Write>(
    writer: &mut W,
    paths: &Paths,
    mode: PathCloseMode,
) -> Result<(), ClipperError> {
    const FUNCTION: &str = "write_prefixed_clipper_paths";
    let add_last = add_last(paths, mode);
    let mut header = Vec::with_capacity((paths.len() + 1) * WORD);

    header.extend_from_slice(&(paths.len() as i64).to_le_bytes());

    for path in paths {
        header.extend_from_slice(&declared_count(path, add_last).to_le_bytes());
    }

    write_bytes(writer, &header, FUNCTION)?;

    for path in paths {
        let mut buf = Vec::with_capacity((path.len() + 1) * POINT);

        encode_int_points(path, add_last, &mut buf);
        write_bytes(writer, &buf, FUNCTION)?;
    }

    Ok(())
}

pub fn read_prefixed_clipper_paths<R: Read>(reader: &mut R, paths: &mut Paths) -> Result<(), ClipperError> {
    const FUNCTION: &str = "read_prefixed_clipper_paths";
    let count = read_count(reader, FUNCTION)?;
    let mut sizes = Vec::new();

    for _ in 0..count {
        sizes.push(read_count(reader, FUNCTION)?);
    }

    for points in sizes {
        let mut path = Path::new();

        for _ in 0..points {
            path.push(read_int_point(reader, FUNCTION)?);
        }

        paths.push(path);
    }

    Ok(())
}

/// Reads `f64` coordinates, multiplying them by `scaling` and truncating.
fn read_double_layout<R: Read, P, F>(
    reader: &mut R,
    function: &'static str,
    mut point: F,
) -> Result<Vec<Vec<P>>, ClipperError>
where
    F: FnMut(f64, f64) -> P,
{
    let count = read_count(reader, function)?;
    let mut result = Vec::new();

    for _ in 0..count {
        let points = read_count(reader, function)?;
        let mut path = Vec::new();

        for _ in 0..points {
            let (x, y) = read_double_pair(reader, function)?;
            path.push(point(x, y));
        }

        result.push(path);
    }

    Ok(result)
}

pub fn read_double_paths<R: Read>(reader: &mut R, paths: &mut Paths, scaling: f64) -> Result<(), ClipperError> {
    let read = read_double_layout(reader, "read_double_paths", |x, y| {
        IntPoint::new((x * scaling) as i64, (y * scaling) as i64)
    })?;

    paths.extend(read);

    Ok(())
}

/// Reads a double path set as stored, without scaling onto the integer grid.
pub fn read_double_paths_unscaled<R: Read>(reader: &mut R) -> Result<Vec<Vec<DoublePoint>>, ClipperError> {
    read_double_layout(reader, "read_double_paths_unscaled", DoublePoint::new)
}

pub fn write_double_paths<W: Write>(
    writer: &mut W,
    paths: &Paths,
    scaling: f64,
    mode: PathCloseMode,
) -> Result<(), ClipperError> {
    const FUNCTION: &str = "write_double_paths";
    let add_last = add_last(paths, mode);

    write_bytes(writer, &(paths.len() as i64).to_le_bytes(), FUNCTION)?;

    for path in paths {
        let mut buf = Vec::with_capacity(WORD + (path.len() + 1) * POINT);

        buf.extend_from_slice(&declared_count(path, add_last).to_le_bytes());

        for pt in path.iter().chain(path.first().filter(|_| add_last)) {
            buf.extend_from_slice(&(pt.x as f64 * scaling).to_le_bytes());
            buf.extend_from_slice(&(pt.y as f64 * scaling).to_le_bytes());
        }

        write_bytes(writer, &buf, FUNCTION)?;
    }

    Ok(())
}

/// Writes the z heights of a slice ahead of its contours.
pub fn write_clipper_slice<W: Write>(
    writer: &mut W,
    paths: &Paths,
    zs: &[f64],
    mode: PathCloseMode,
) -> Result<(), ClipperError> {
    const FUNCTION: &str = "write_clipper_slice";
    let mut buf = Vec::with_capacity((zs.len() + 1) * WORD);

    buf.extend_from_slice(&(zs.len() as i64).to_le_bytes());

    for z in zs {
        buf.extend_from_slice(&z.to_le_bytes());
    }

    write_bytes(writer, &buf, FUNCTION)?;
    write_clipper_paths(writer, paths, mode)
}

/// What an [`IoPaths`] does when a transfer comes up short.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IoErrorPolicy {
    /// Hand the failure back to the caller.
    #[default]
    Report,
    /// Log the failure and terminate the process.
    Exit,
}

/// A stream bound to an error policy.
pub struct IoPaths<S> {
    stream: S,
    policy: IoErrorPolicy,
}

impl<S> IoPaths<S> {
    pub fn new(stream: S, policy: IoErrorPolicy) -> Self {
        Self { stream, policy }
    }

    pub fn policy(&self) -> IoErrorPolicy {
        self.policy
    }

    pub fn get_ref(&self) -> &S {
        &self.stream
    }

    pub fn into_inner(self) -> S {
        self.stream
    }

    fn handle<T>(&self, result: Result<T, ClipperError>) -> Result<T, ClipperError> {
        match (result, self.policy) {
            (Err(err), IoErrorPolicy::Exit) => {
                log::error!("{}", err);
                std::process::exit(-1);
            }
            (result, _) => result,
        }
    }
}

impl<S: Read> IoPaths<S> {
    pub fn read_clipper_paths(&mut self, paths: &mut Paths) -> Result<(), ClipperError> {
        let result = read_clipper_paths(&mut self.stream, paths);
        self.handle(result)
    }

    pub fn read_prefixed_clipper_paths(&mut self, paths: &mut Paths) -> Result<(), ClipperError> {
        let result = read_prefixed_clipper_paths(&mut self.stream, paths);
        self.handle(result)
    }

    pub fn read_double_paths(&mut self, paths: &mut Paths, scaling: f64) -> Result<(), ClipperError> {
        let result = read_double_paths(&mut self.stream, paths, scaling);
        self.handle(result)
    }

    pub fn read_double_paths_unscaled(&mut self) -> Result<Vec<Vec<DoublePoint>>, ClipperError> {
        let result = read_double_paths_unscaled(&mut self.stream);
        self.handle(result)
    }
}

impl<S: Write> IoPaths<S> {
    pub fn write_clipper_paths(&mut self, paths: &Paths, mode: PathCloseMode) -> Result<(), ClipperError> {
        let result = write_clipper_paths(&mut self.stream, paths, mode);
        self.handle(result)
    }

    pub fn write_prefixed_clipper_paths(&mut self, paths: &Paths, mode: PathCloseMode) -> Result<(), ClipperError> {
        let result = write_prefixed_clipper_paths(&mut self.stream, paths, mode);
        self.handle(result)
    }

    pub fn write_double_paths(&mut self, paths: &Paths, scaling: f64, mode: PathCloseMode) -> Result<(), ClipperError> {
        let result = write_double_paths(&mut self.stream, paths, scaling, mode);
        self.handle(result)
    }

    pub fn write_clipper_slice(&mut self, paths: &Paths, zs: &[f64], mode: PathCloseMode) -> Result<(), ClipperError> {
        let result = write_clipper_slice(&mut self.stream, paths, zs, mode);
        self.handle(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn square() -> Path {
        vec![
            IntPoint::new(0, 0),
            IntPoint::new(10, 0),
            IntPoint::new(10, 10),
            IntPoint::new(0, 10),
        ]
    }

    fn words(bytes: &[u8]) -> Vec<i64> {
        bytes
            .chunks_exact(WORD)
            .map(|chunk| i64::from_le_bytes(chunk.try_into().unwrap()))
            .collect()
    }

    /// Accepts at most `limit` bytes, then refuses to write.
    struct Limited {
        written: Vec<u8>,
        limit: usize,
    }

    impl Write for Limited {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            let n = buf.len().min(self.limit - self.written.len());
            self.written.extend_from_slice(&buf[..n]);
            Ok(n)
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn clipper_paths_layout() {
        let paths = vec![square(), vec![IntPoint::new(-1, 2)]];
        let mut buf = Vec::new();

        write_clipper_paths(&mut buf, &paths, PathCloseMode::Open).unwrap();

        assert_eq!(buf.len(), paths_serialized_size(&paths, PathCloseMode::Open));
        assert_eq!(
            words(&buf),
            vec![2, 4, 0, 0, 10, 0, 10, 10, 0, 10, 1, -1, 2]
        );

        let mut read = Paths::new();
        read_clipper_paths(&mut Cursor::new(buf), &mut read).unwrap();

        assert_eq!(read, paths);
    }

    #[test]
    fn loop_mode_repeats_first_point() {
        let paths = vec![square()];
        let mut buf = Vec::new();

        write_clipper_paths(&mut buf, &paths, PathCloseMode::Loop).unwrap();

        assert_eq!(buf.len(), paths_serialized_size(&paths, PathCloseMode::Loop));

        let mut read = Paths::new();
        read_clipper_paths(&mut Cursor::new(buf), &mut read).unwrap();

        assert_eq!(read[0].len(), 5);
        assert_eq!(read[0][4], read[0][0]);
    }

    #[test]
    fn prefixed_layout_puts_counts_first() {
        let paths = vec![square(), square()];
        let mut buf = Vec::new();

        write_prefixed_clipper_paths(&mut buf, &paths, PathCloseMode::Open).unwrap();

        assert_eq!(&words(&buf)[..3], &[2, 4, 4]);

        let mut read = vec![vec![IntPoint::new(7, 7)]];
        read_prefixed_clipper_paths(&mut Cursor::new(buf), &mut read).unwrap();

        assert_eq!(read.len(), 3);
        assert_eq!(read[1], square());
        assert_eq!(read[2], square());
    }

    #[test]
    fn double_paths_apply_scaling() {
        let paths = vec![square()];
        let mut buf = Vec::new();

        write_double_paths(&mut buf, &paths, 0.5, PathCloseMode::Open).unwrap();

        let mut read = Paths::new();
        read_double_paths(&mut Cursor::new(buf), &mut read, 4.0).unwrap();

        assert_eq!(read[0][2], IntPoint::new(20, 20));
    }

    #[test]
    fn double_paths_keep_fractions_when_unscaled() {
        let paths = vec![square(), vec![IntPoint::new(-3, 1)]];
        let mut buf = Vec::new();

        write_double_paths(&mut buf, &paths, 0.25, PathCloseMode::Open).unwrap();

        let read = read_double_paths_unscaled(&mut Cursor::new(buf)).unwrap();

        assert_eq!(read.len(), 2);
        assert_eq!(read[0].len(), 4);
        assert_eq!(read[0][2], DoublePoint::new(2.5, 2.5));
        assert_eq!(read[1], vec![DoublePoint::new(-0.75, 0.25)]);
    }

    #[test]
    fn unscaled_read_reports_truncated_input() {
        let mut buf = Vec::new();

        write_double_paths(&mut buf, &vec![square()], 1.0, PathCloseMode::Open).unwrap();
        buf.truncate(buf.len() - 4);

        assert!(matches!(
            read_double_paths_unscaled(&mut Cursor::new(buf)),
            Err(ClipperError::Io { .. })
        ));
    }

    #[test]
    fn slice_starts_with_heights() {
        let mut buf = Vec::new();

        write_clipper_slice(&mut buf, &vec![square()], &[1.5, 2.5], PathCloseMode::Open).unwrap();

        assert_eq!(i64::from_le_bytes(buf[..8].try_into().unwrap()), 2);
        assert_eq!(f64::from_le_bytes(buf[8..16].try_into().unwrap()), 1.5);

        let mut read = Paths::new();
        read_clipper_paths(&mut Cursor::new(&buf[24..]), &mut read).unwrap();

        assert_eq!(read, vec![square()]);
    }

    #[test]
    fn short_read_is_reported_with_counts() {
        let mut buf = Vec::new();

        write_clipper_paths(&mut buf, &vec![square()], PathCloseMode::Open).unwrap();
        buf.truncate(buf.len() - 3);

        let mut reader = IoPaths::new(Cursor::new(buf), IoErrorPolicy::Report);
        let mut read = Paths::new();

        match reader.read_clipper_paths(&mut read) {
            Err(ClipperError::Io {
                direction,
                expected,
                actual,
                ..
            }) => {
                assert_eq!(direction, IoDirection::Read);
                assert_eq!(expected, POINT);
                assert_eq!(actual, POINT - 3);
            }
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn negative_count_is_rejected() {
        let buf = (-1i64).to_le_bytes().to_vec();
        let mut read = Paths::new();

        assert!(matches!(
            read_clipper_paths(&mut Cursor::new(buf), &mut read),
            Err(ClipperError::Io { direction: IoDirection::Read, .. })
        ));
    }

    #[test]
    fn short_write_is_reported() {
        let mut writer = IoPaths::new(
            Limited {
                written: Vec::new(),
                limit: 12,
            },
            IoErrorPolicy::Report,
        );

        match writer.write_clipper_paths(&vec![square()], PathCloseMode::Open) {
            Err(ClipperError::Io {
                direction,
                function,
                expected,
                actual,
                ..
            }) => {
                assert_eq!(direction, IoDirection::Write);
                assert_eq!(function, "write_clipper_paths");
                assert_eq!(expected, WORD + 4 * POINT);
                assert_eq!(actual, 4);
            }
            other => panic!("unexpected result {:?}", other),
        }

        assert_eq!(writer.get_ref().written.len(), 12);
    }
}
