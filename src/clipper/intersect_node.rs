use crate::geometry::point::IntPoint;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntersectNode {
    pub edge1: usize,
    pub edge2: usize,
    pub pt: IntPoint,
}

impl IntersectNode {
    pub fn new(edge1: usize, edge2: usize, pt: IntPoint) -> Self {
        Self { edge1, edge2, pt }
    }
}

/// Left to right snapshot of the active edges, used to check that every
/// intersection is applied between neighbours.
#[derive(Debug, Default)]
pub struct EdgeOrder {
    order: Vec<usize>,
    position: HashMap<usize, usize>,
}

impl EdgeOrder {
    pub fn from_sequence<I: IntoIterator<Item = usize>>(edges: I) -> Self {
        let order: Vec<usize> = edges.into_iter().collect();
        let position = order.iter().enumerate().map(|(i, edge)| (*edge, i)).collect();

        Self { order, position }
    }

    pub fn adjacent(&self, edge1: usize, edge2: usize) -> bool {
        match (self.position.get(&edge1), self.position.get(&edge2)) {
            (Some(a), Some(b)) => a.abs_diff(*b) == 1,
            _ => false,
        }
    }

    pub fn swap(&mut self, edge1: usize, edge2: usize) {
        if let (Some(&a), Some(&b)) = (self.position.get(&edge1), self.position.get(&edge2)) {
            self.order.swap(a, b);
            self.position.insert(edge1, b);
            self.position.insert(edge2, a);
        }
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.order
    }
}

/// Sorts `nodes` bottom-most first, then reorders so that each intersection
/// joins edges that are adjacent at the moment it is processed. Returns false
/// when no such order exists.
pub fn fixup_intersection_order(nodes: &mut [IntersectNode], order: &mut EdgeOrder) -> bool {
    nodes.sort_by(|a, b| b.pt.y.cmp(&a.pt.y));

    let count = nodes.len();

    for i in 0..count {
        if !order.adjacent(nodes[i].edge1, nodes[i].edge2) {
            let mut j = i + 1;

            while j < count && !order.adjacent(nodes[j].edge1, nodes[j].edge2) {
                j += 1;
            }

            if j == count {
                return false;
            }

            nodes.swap(i, j);
        }

        order.swap(nodes[i].edge1, nodes[i].edge2);
    }

    true
}
