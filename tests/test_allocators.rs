use vatti_clipper::geometry::polygon::area;
use vatti_clipper::{
    ArenaConfig, ArenaMemoryManager, ClipType, Clipper, ClipperConfig, ClipperError, ClipperOffset, EndType,
    IntPoint, JoinType, MemoryManager, Path, PolyFillType, PolyType,
};

fn star(cx: i64, cy: i64, r: i64) -> Path {
    (0..10)
        .map(|i| {
            let radius = if i % 2 == 0 { r as f64 } else { r as f64 * 0.4 };
            let angle = std::f64::consts::PI * i as f64 / 5.0;
            IntPoint::new(
                cx + (radius * angle.cos()).round() as i64,
                cy + (radius * angle.sin()).round() as i64,
            )
        })
        .collect()
}

#[test]
fn test_arena_reset_between_runs() {
    let mut manager = ArenaMemoryManager::new(ArenaConfig::new(4096, 1));
    let mut areas = Vec::new();

    for _ in 0..3 {
        {
            let mut clipper = Clipper::new(&mut manager, ClipperConfig::new());

            clipper.add_path(&star(0, 0, 1000), PolyType::Subject, true).unwrap();
            clipper.add_path(&star(300, 0, 1000), PolyType::Clip, true).unwrap();

            let solution = clipper.execute(ClipType::Union, PolyFillType::NonZero).unwrap();

            areas.push(solution.iter().map(|path| area(path)).sum::<f64>());
        }

        manager.reset();

        assert_eq!(manager.current_chunk(), 0);
        assert_eq!(manager.big_chunk_count(), 0);
    }

    assert!(areas[0] > 0.0);
    assert!(areas.iter().all(|a| *a == areas[0]));
}

#[test]
fn test_arena_without_big_chunks_reports_configuration_error() {
    let config = ArenaConfig {
        allow_big_chunks: false,
        ..ArenaConfig::new(16, 1)
    };
    let mut manager = ArenaMemoryManager::new(config);
    let mut clipper = Clipper::new(&mut manager, ClipperConfig::new());

    match clipper.add_path(&star(0, 0, 100), PolyType::Subject, true) {
        Err(ClipperError::ChunkTooSmall { requested, chunk_size }) => {
            assert_eq!(chunk_size, 16);
            assert!(requested > chunk_size);
        }
        other => panic!("unexpected result {:?}", other),
    }
}

#[test]
fn test_offset_round_trip_on_arena() {
    let mut manager = ArenaMemoryManager::new(ArenaConfig::default());
    let square: Path = vec![
        IntPoint::new(0, 0),
        IntPoint::new(200, 0),
        IntPoint::new(200, 200),
        IntPoint::new(0, 200),
    ];

    let grown = {
        let mut offset = ClipperOffset::with_defaults(&mut manager);
        offset.add_path(&square, JoinType::Miter, EndType::ClosedPolygon).unwrap();
        offset.execute(25.0).unwrap()
    };

    let shrunk = {
        let mut offset = ClipperOffset::with_defaults(&mut manager);
        offset.add_paths(&grown, JoinType::Miter, EndType::ClosedPolygon).unwrap();
        offset.execute(-25.0).unwrap()
    };

    manager.free();

    assert_eq!(shrunk.len(), 1);
    assert_eq!(area(&shrunk[0]), area(&square));
}

#[test]
fn test_offset_clear_keeps_arena_from_growing() {
    let mut manager = ArenaMemoryManager::new(ArenaConfig::new(1024, 1));
    let mut offset = ClipperOffset::with_defaults(&mut manager);
    let mut reserved = Vec::new();

    for _ in 0..6 {
        offset
            .add_paths(&[star(0, 0, 500), star(2000, 0, 500)], JoinType::Round, EndType::ClosedPolygon)
            .unwrap();

        let solution = offset.execute(20.0).unwrap();

        assert_eq!(solution.len(), 2);

        offset.clear();
        reserved.push(offset.memory_manager().reserved_bytes());
    }

    assert!(reserved[0] > 1024);
    assert!(reserved.iter().all(|bytes| *bytes == reserved[0]));
}

#[test]
fn test_clipper_storage_is_parked_for_the_next_run() {
    let mut manager = ArenaMemoryManager::new(ArenaConfig::new(4096, 1));
    let mut parked = Vec::new();

    for _ in 0..3 {
        {
            let mut clipper = Clipper::new(&mut manager, ClipperConfig::new());

            clipper.add_path(&star(0, 0, 1000), PolyType::Subject, true).unwrap();
            clipper.execute(ClipType::Union, PolyFillType::NonZero).unwrap();
        }

        parked.push(manager.retained_bytes());
        manager.reset();
    }

    assert!(parked[0] > 0);
    assert!(parked.iter().all(|bytes| *bytes == parked[0]));

    manager.free();
    assert_eq!(manager.retained_bytes(), 0);
}
