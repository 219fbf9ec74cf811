use wasm_bindgen::prelude::*;
use web_sys::js_sys::Int32Array;

pub mod allocator;
pub mod clipper;
pub mod clipper_config;
pub mod constants;
pub mod error;
pub mod geometry;
pub mod io;
pub mod utils;

pub use crate::allocator::{ArenaConfig, ArenaMemoryManager, MemoryManager, SimpleMemoryManager};
pub use crate::clipper::{ClipType, Clipper, ClipperOffset, EndType, JoinType, PolyFillType, PolyTree, PolyType};
pub use crate::clipper_config::ClipperConfig;
pub use crate::error::ClipperError;
pub use crate::geometry::{IntPoint, IntRect, Path, Paths};

use crate::geometry::polygon::area;

/// Reads paths packed as `[count, offset_0 .. offset_n, x0, y0, x1, y1, ..]`,
/// offsets being relative to the start of the coordinate section.
pub fn unpack_paths(mem_seg: &[i32]) -> Paths {
    let count = match mem_seg.first() {
        Some(count) if *count > 0 => *count as usize,
        _ => return Paths::new(),
    };

    if mem_seg.len() < 1 + count {
        return Paths::new();
    }

    let data = &mem_seg[1 + count..];
    let offsets = &mem_seg[1..1 + count];

    (0..count)
        .map(|i| {
            let start = (offsets[i].max(0) as usize).min(data.len());
            let end = offsets
                .get(i + 1)
                .map_or(data.len(), |end| (*end).max(0) as usize)
                .clamp(start, data.len());

            data[start..end]
                .chunks_exact(2)
                .map(|chunk| IntPoint::new(chunk[0] as i64, chunk[1] as i64))
                .collect()
        })
        .collect()
}

pub fn pack_paths(paths: &Paths) -> Vec<i32> {
    let total_points: usize = paths.iter().map(|path| path.len()).sum();
    let header_len = 1 + paths.len();
    let mut out = Vec::with_capacity(header_len + total_points * 2);
    let mut running: usize = 0;

    out.push(paths.len() as i32);

    for path in paths {
        out.push(running as i32);
        running += path.len() * 2;
    }

    for pt in paths.iter().flatten() {
        out.push(pt.x.clamp(i32::MIN as i64, i32::MAX as i64) as i32);
        out.push(pt.y.clamp(i32::MIN as i64, i32::MAX as i64) as i32);
    }

    out
}

fn to_int32_array(values: &[i32]) -> Int32Array {
    let out = Int32Array::new_with_length(values.len() as u32);
    out.copy_from(values);
    out
}

/// Boolean operation between two packed path sets, both filled with `fill_type`.
pub fn clip_polygons(
    subject: &[i32],
    clip: &[i32],
    clip_type: ClipType,
    fill_type: PolyFillType,
) -> Result<Paths, ClipperError> {
    let mut manager = SimpleMemoryManager::new();
    let mut clipper = Clipper::new(&mut manager, ClipperConfig::new());

    clipper.add_paths(&unpack_paths(subject), PolyType::Subject, true)?;
    clipper.add_paths(&unpack_paths(clip), PolyType::Clip, true)?;
    clipper.execute(clip_type, fill_type)
}

pub fn offset_polygons(
    paths: &[i32],
    delta: f64,
    join_type: JoinType,
    end_type: EndType,
    miter_limit: f64,
    arc_tolerance: f64,
) -> Result<Paths, ClipperError> {
    let mut manager = SimpleMemoryManager::new();
    let mut offset = ClipperOffset::new(&mut manager, miter_limit, arc_tolerance);

    offset.add_paths(&unpack_paths(paths), join_type, end_type)?;
    offset.execute(delta)
}

#[wasm_bindgen]
pub fn clip_polygons_wasm(subject: &[i32], clip: &[i32], clip_type: u8, fill_type: u8) -> Int32Array {
    let (Ok(clip_type), Ok(fill_type)) = (ClipType::try_from(clip_type), PolyFillType::try_from(fill_type)) else {
        log::error!("unknown clip type {} or fill type {}", clip_type, fill_type);
        return Int32Array::new_with_length(0);
    };

    match clip_polygons(subject, clip, clip_type, fill_type) {
        Ok(solution) => to_int32_array(&pack_paths(&solution)),
        Err(err) => {
            log::error!("clip_polygons_wasm: {}", err);
            Int32Array::new_with_length(0)
        }
    }
}

#[wasm_bindgen]
pub fn offset_polygons_wasm(
    paths: &[i32],
    delta: f64,
    join_type: u8,
    end_type: u8,
    miter_limit: f64,
    arc_tolerance: f64,
) -> Int32Array {
    let (Ok(join_type), Ok(end_type)) = (JoinType::try_from(join_type), EndType::try_from(end_type)) else {
        log::error!("unknown join type {} or end type {}", join_type, end_type);
        return Int32Array::new_with_length(0);
    };

    match offset_polygons(paths, delta, join_type, end_type, miter_limit, arc_tolerance) {
        Ok(solution) => to_int32_array(&pack_paths(&solution)),
        Err(err) => {
            log::error!("offset_polygons_wasm: {}", err);
            Int32Array::new_with_length(0)
        }
    }
}

/// Signed area of a flat `[x0, y0, x1, y1, ..]` contour.
#[wasm_bindgen]
pub fn polygon_area_wasm(points: &[i32]) -> f64 {
    let path: Path = points
        .chunks_exact(2)
        .map(|chunk| IntPoint::new(chunk[0] as i64, chunk[1] as i64))
        .collect();

    area(&path)
}

/// `level` follows `log::LevelFilter` ordering: 0 off through 5 trace.
#[wasm_bindgen]
pub fn init_console_logger(level: u8) {
    let filter = match level {
        0 => log::LevelFilter::Off,
        1 => log::LevelFilter::Error,
        2 => log::LevelFilter::Warn,
        3 => log::LevelFilter::Info,
        4 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    utils::wasm_logger::init_logger(filter);
}
