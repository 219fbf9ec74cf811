use std::io::Cursor;

use vatti_clipper::error::IoDirection;
use vatti_clipper::io::{paths_serialized_size, IoErrorPolicy, IoPaths, PathCloseMode};
use vatti_clipper::{ClipType, Clipper, ClipperConfig, ClipperError, IntPoint, Paths, PolyFillType, PolyType, SimpleMemoryManager};

fn clipped() -> Paths {
    let mut manager = SimpleMemoryManager::new();
    let mut clipper = Clipper::new(&mut manager, ClipperConfig::new());
    let outer = vec![
        IntPoint::new(0, 0),
        IntPoint::new(100, 0),
        IntPoint::new(100, 100),
        IntPoint::new(0, 100),
    ];
    let inner = vec![
        IntPoint::new(25, 25),
        IntPoint::new(75, 25),
        IntPoint::new(75, 75),
        IntPoint::new(25, 75),
    ];

    clipper.add_path(&outer, PolyType::Subject, true).unwrap();
    clipper.add_path(&inner, PolyType::Clip, true).unwrap();
    clipper.execute(ClipType::Difference, PolyFillType::NonZero).unwrap()
}

#[test]
fn test_clip_result_survives_round_trip() {
    let solution = clipped();
    let mut writer = IoPaths::new(Vec::new(), IoErrorPolicy::Report);

    writer.write_clipper_paths(&solution, PathCloseMode::Open).unwrap();

    let bytes = writer.into_inner();

    assert_eq!(bytes.len(), paths_serialized_size(&solution, PathCloseMode::Open));

    let mut reader = IoPaths::new(Cursor::new(bytes), IoErrorPolicy::Report);
    let mut read = Paths::new();

    reader.read_clipper_paths(&mut read).unwrap();

    assert_eq!(read, solution);
}

#[test]
fn test_prefixed_and_double_layouts_agree() {
    let solution = clipped();
    let mut prefixed = IoPaths::new(Vec::new(), IoErrorPolicy::Report);
    let mut doubles = IoPaths::new(Vec::new(), IoErrorPolicy::Report);

    prefixed
        .write_prefixed_clipper_paths(&solution, PathCloseMode::Loop)
        .unwrap();
    doubles
        .write_double_paths(&solution, 0.01, PathCloseMode::Loop)
        .unwrap();

    let mut from_prefixed = Paths::new();
    let mut from_doubles = Paths::new();

    IoPaths::new(Cursor::new(prefixed.into_inner()), IoErrorPolicy::Report)
        .read_prefixed_clipper_paths(&mut from_prefixed)
        .unwrap();
    IoPaths::new(Cursor::new(doubles.into_inner()), IoErrorPolicy::Report)
        .read_double_paths(&mut from_doubles, 100.0)
        .unwrap();

    assert_eq!(from_prefixed.len(), solution.len());

    for (looped, path) in from_prefixed.iter().zip(&solution) {
        assert_eq!(looped.len(), path.len() + 1);
        assert_eq!(looped.first(), looped.last());
    }

    for (a, b) in from_doubles.iter().zip(&from_prefixed) {
        for (p, q) in a.iter().zip(b) {
            assert!((p.x - q.x).abs() <= 1 && (p.y - q.y).abs() <= 1);
        }
    }
}

#[test]
fn test_truncated_stream_is_reported() {
    let solution = clipped();
    let mut bytes = Vec::new();

    vatti_clipper::io::write_clipper_paths(&mut bytes, &solution, PathCloseMode::Open).unwrap();
    bytes.truncate(20);

    let mut reader = IoPaths::new(Cursor::new(bytes), IoErrorPolicy::Report);
    let mut read = Paths::new();

    match reader.read_clipper_paths(&mut read) {
        Err(ClipperError::Io {
            direction,
            function,
            expected,
            actual,
            ..
        }) => {
            assert_eq!(direction, IoDirection::Read);
            assert_eq!(function, "read_clipper_paths");
            assert_eq!(expected, 16);
            assert_eq!(actual, 4);
        }
        other => panic!("unexpected result {:?}", other),
    }
}
