// Vatti sweep-line clipping on integer coordinates, with the polygon offset
// engine and the helpers built on top of both.

pub mod clipper;
pub mod clipper_base;
pub mod clipper_offset;
pub mod constants;
pub mod enums;
pub mod intersect_node;
pub mod join;
pub mod local_minima;
pub mod out_pt;
pub mod out_rec;
pub mod poly_tree;
pub mod scanbeam;
pub mod t_edge;
pub mod utils;

#[cfg(test)]
mod local_minima_test;
#[cfg(test)]
mod scanbeam_test;
#[cfg(test)]
pub mod tests;

pub use clipper::Clipper;
#[cfg(feature = "xyz")]
pub use clipper::ZFillCallback;
pub use clipper_offset::ClipperOffset;
pub use constants::*;
pub use enums::*;
pub use poly_tree::{
    closed_paths_from_poly_tree, open_paths_from_poly_tree, poly_tree_to_paths, PolyNode, PolyNodeRef, PolyTree,
};
