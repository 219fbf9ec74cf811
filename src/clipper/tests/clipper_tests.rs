use crate::allocator::{ArenaConfig, ArenaMemoryManager, MemoryManager, SimpleMemoryManager};
use crate::clipper::clipper::Clipper;
use crate::clipper::enums::{ClipType, PolyFillType, PolyType};
use crate::clipper_config::ClipperConfig;
use crate::geometry::point::{IntPoint, Path, Paths};
use crate::geometry::polygon::area;
use serde::Deserialize;
use std::fs;

#[derive(Debug, Deserialize)]
struct TestInput {
    #[serde(rename = "subjectPolygons")]
    subject_polygons: Vec<Vec<[i64; 2]>>,
    #[serde(rename = "clipPolygons")]
    clip_polygons: Vec<Vec<[i64; 2]>>,
    #[serde(rename = "clipType")]
    clip_type: u8,
    #[serde(rename = "fillType")]
    fill_type: u8,
}

#[derive(Debug, Deserialize)]
struct TestOutput {
    count: Option<usize>,
    area: f64,
}

#[derive(Debug, Deserialize)]
struct TestCase {
    id: String,
    input: TestInput,
    output: TestOutput,
}

#[derive(Debug, Deserialize)]
struct TestSuite {
    id: String,
    data: Vec<TestCase>,
}

#[derive(Debug, Deserialize)]
struct TestDataStructure {
    suites: Vec<TestSuite>,
}

fn load_test_data() -> TestDataStructure {
    let json_path = concat!(env!("CARGO_MANIFEST_DIR"), "/src/clipper/__data__/clipper.json");
    let json_content = fs::read_to_string(json_path).expect("Failed to read clipper test data file");
    serde_json::from_str(&json_content).expect("Failed to parse clipper test data")
}

fn find_case<'a>(data: &'a TestDataStructure, suite_id: &str, case_id: &str) -> &'a TestCase {
    data.suites
        .iter()
        .find(|s| s.id == suite_id)
        .unwrap_or_else(|| panic!("{} suite not found", suite_id))
        .data
        .iter()
        .find(|d| d.id == case_id)
        .unwrap_or_else(|| panic!("{} test not found", case_id))
}

fn create_paths(polygons: &[Vec<[i64; 2]>]) -> Paths {
    polygons
        .iter()
        .map(|points| points.iter().map(|[x, y]| IntPoint::new(*x, *y)).collect())
        .collect()
}

fn execute_clipper_operation(manager: &mut dyn MemoryManager, input: &TestInput, config: ClipperConfig) -> Paths {
    let mut clipper = Clipper::new(manager, config);

    clipper
        .add_paths(&create_paths(&input.subject_polygons), PolyType::Subject, true)
        .unwrap();
    clipper
        .add_paths(&create_paths(&input.clip_polygons), PolyType::Clip, true)
        .unwrap();

    let clip_type = ClipType::try_from(input.clip_type).expect("Invalid ClipType");
    let fill_type = PolyFillType::try_from(input.fill_type).expect("Invalid PolyFillType");

    clipper.execute(clip_type, fill_type).expect("Clipper execution failed")
}

fn total_area(paths: &Paths) -> f64 {
    paths.iter().map(|path| area(path)).sum()
}

fn check_case(suite_id: &str, case_id: &str) {
    let test_data = load_test_data();
    let data = find_case(&test_data, suite_id, case_id);
    let mut manager = SimpleMemoryManager::new();
    let solution = execute_clipper_operation(&mut manager, &data.input, ClipperConfig::new());

    if let Some(count) = data.output.count {
        assert_eq!(solution.len(), count, "{}/{}: path count", suite_id, case_id);
    }

    assert_eq!(total_area(&solution), data.output.area, "{}/{}: area", suite_id, case_id);

    for path in &solution {
        assert!(path.len() >= 3, "{}/{}: degenerate output path", suite_id, case_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlapping_squares_union() {
        check_case("overlapping_squares", "union");
    }

    #[test]
    fn test_overlapping_squares_intersection() {
        check_case("overlapping_squares", "intersection");
    }

    #[test]
    fn test_overlapping_squares_difference() {
        check_case("overlapping_squares", "difference");
    }

    #[test]
    fn test_overlapping_squares_xor() {
        check_case("overlapping_squares", "xor");
    }

    #[test]
    fn test_disjoint_squares() {
        check_case("disjoint_squares", "intersection");
        check_case("disjoint_squares", "union");
        check_case("disjoint_squares", "difference");
    }

    #[test]
    fn test_nested_squares() {
        check_case("nested_squares", "union_swallows_inner");
        check_case("nested_squares", "difference_leaves_hole");
    }

    #[test]
    fn test_fill_rules() {
        check_case("fill_rules", "even_odd_drops_overlap");
        check_case("fill_rules", "non_zero_keeps_overlap");
        check_case("fill_rules", "bowtie_splits");
    }

    #[test]
    fn test_every_case_matches_on_arena() {
        let test_data = load_test_data();
        let mut manager = ArenaMemoryManager::new(ArenaConfig::default());

        for suite in &test_data.suites {
            for data in &suite.data {
                let solution = execute_clipper_operation(&mut manager, &data.input, ClipperConfig::new());

                assert_eq!(total_area(&solution), data.output.area, "{}/{}", suite.id, data.id);

                manager.reset();
            }
        }
    }

    #[test]
    fn test_reverse_solution_flips_orientation() {
        let test_data = load_test_data();
        let data = find_case(&test_data, "overlapping_squares", "union");
        let mut manager = SimpleMemoryManager::new();
        let config = ClipperConfig {
            reverse_solution: true,
            ..ClipperConfig::new()
        };
        let solution = execute_clipper_operation(&mut manager, &data.input, config);

        assert_eq!(total_area(&solution), -data.output.area);
    }

    #[test]
    fn test_union_with_itself_is_identity() {
        let square: Path = vec![
            IntPoint::new(0, 0),
            IntPoint::new(40, 0),
            IntPoint::new(40, 30),
            IntPoint::new(0, 30),
        ];

        for fill_type in [PolyFillType::EvenOdd, PolyFillType::NonZero] {
            let mut manager = SimpleMemoryManager::new();
            let mut clipper = Clipper::new(&mut manager, ClipperConfig::new());

            clipper.add_path(&square, PolyType::Subject, true).unwrap();
            clipper.add_path(&square, PolyType::Clip, true).unwrap();

            let solution = clipper.execute(ClipType::Union, fill_type).unwrap();

            assert_eq!(solution.len(), 1);
            assert_eq!(solution[0].len(), 4);
            assert_eq!(area(&solution[0]).abs(), 1200.0);

            for pt in &square {
                assert!(solution[0].contains(pt));
            }
        }
    }

    #[test]
    fn test_engine_is_reusable_after_clear() {
        let test_data = load_test_data();
        let data = find_case(&test_data, "overlapping_squares", "intersection");
        let mut manager = SimpleMemoryManager::new();
        let mut clipper = Clipper::new(&mut manager, ClipperConfig::new());

        for _ in 0..2 {
            clipper
                .add_paths(&create_paths(&data.input.subject_polygons), PolyType::Subject, true)
                .unwrap();
            clipper
                .add_paths(&create_paths(&data.input.clip_polygons), PolyType::Clip, true)
                .unwrap();

            let solution = clipper.execute(ClipType::Intersection, PolyFillType::NonZero).unwrap();

            assert_eq!(total_area(&solution), 25.0);

            clipper.clear();
        }
    }

    #[test]
    fn test_strictly_simple_result_has_no_degenerate_rings() {
        let mut manager = SimpleMemoryManager::new();
        let config = ClipperConfig {
            strictly_simple: true,
            ..ClipperConfig::new()
        };
        let mut clipper = Clipper::new(&mut manager, config);
        let touching: Paths = vec![
            vec![
                IntPoint::new(0, 0),
                IntPoint::new(10, 0),
                IntPoint::new(10, 10),
                IntPoint::new(0, 10),
            ],
            vec![
                IntPoint::new(10, 10),
                IntPoint::new(20, 10),
                IntPoint::new(20, 20),
                IntPoint::new(10, 20),
            ],
            vec![
                IntPoint::new(30, 0),
                IntPoint::new(40, 10),
                IntPoint::new(40, 0),
                IntPoint::new(30, 10),
            ],
        ];

        clipper.add_paths(&touching, PolyType::Subject, true).unwrap();

        let solution = clipper.execute(ClipType::Union, PolyFillType::NonZero).unwrap();

        assert!(!solution.is_empty());
        assert!(solution.iter().all(|path| path.len() >= 3));
        assert_eq!(total_area(&solution), 250.0);
    }

    #[test]
    fn test_strictly_simple_random_clips_keep_closed_rings_whole() {
        let mut seed: u64 = 1121;
        let mut next = move |bound: i64| {
            seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            ((seed >> 33) % bound as u64) as i64
        };
        let config = ClipperConfig {
            strictly_simple: true,
            ..ClipperConfig::new()
        };
        let clip_types = [ClipType::Intersection, ClipType::Union, ClipType::Difference, ClipType::Xor];
        let mut checked = 0;

        for round in 0..200 {
            let subject: Path = (0..7).map(|_| IntPoint::new(next(120), next(120))).collect();
            let clip: Path = (0..7).map(|_| IntPoint::new(next(120), next(120))).collect();
            let mut manager = SimpleMemoryManager::new();
            let mut clipper = Clipper::new(&mut manager, config);

            clipper.add_path(&subject, PolyType::Subject, true).unwrap();
            clipper.add_path(&clip, PolyType::Clip, true).unwrap();

            if let Ok(solution) = clipper.execute_with(
                clip_types[round % 4],
                PolyFillType::EvenOdd,
                PolyFillType::NonZero,
            ) {
                assert!(solution.iter().all(|path| path.len() >= 3), "round {}", round);
                checked += 1;
            }
        }

        assert!(checked > 150);
    }
}
