use crate::allocator::{MemoryManager, Pool};
use crate::clipper::constants::UNASSIGNED;
use crate::clipper::enums::{EndType, JoinType};
use crate::error::ClipperError;
use crate::geometry::point::{Path, Paths};

#[derive(Debug, Clone)]
pub struct PolyNode {
    pub contour: Path,
    childs: Vec<usize>,
    parent: usize,
    index: usize,
    pub(crate) is_open: bool,
    pub(crate) join_type: JoinType,
    pub(crate) end_type: EndType,
}

impl PolyNode {
    fn new(contour: Path, join_type: JoinType, end_type: EndType) -> Self {
        Self {
            contour,
            childs: Vec::new(),
            parent: UNASSIGNED,
            index: 0,
            is_open: false,
            join_type,
            end_type,
        }
    }
}

/// Nested result of a clip. Node ids are pool indices; the root itself has no
/// node and is addressed through the tree. Nodes live as long as the engine
/// that produced the tree keeps its result.
#[derive(Default)]
pub struct PolyTree {
    nodes: Pool<PolyNode>,
    childs: Vec<usize>,
    dropped: usize,
}

impl PolyTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self, manager: &mut dyn MemoryManager) {
        self.nodes.clear(manager);
        self.childs.clear();
        self.dropped = 0;
    }

    /// Like `clear`, but also hands the node storage back to `manager`.
    pub(crate) fn release(&mut self, manager: &mut dyn MemoryManager) {
        self.nodes.release(manager);
        self.childs.clear();
        self.dropped = 0;
    }

    pub(crate) fn add_node(
        &mut self,
        manager: &mut dyn MemoryManager,
        contour: Path,
        join_type: JoinType,
        end_type: EndType,
    ) -> Result<usize, ClipperError> {
        self.nodes.alloc(manager, PolyNode::new(contour, join_type, end_type))
    }

    /// Attaches `child` under `parent`, 0 meaning the root.
    pub(crate) fn add_child(&mut self, parent: usize, child: usize) {
        let index = if parent == UNASSIGNED {
            self.childs.push(child);
            self.childs.len() - 1
        } else {
            self.nodes[parent].childs.push(child);
            self.nodes[parent].childs.len() - 1
        };

        self.nodes[child].parent = parent;
        self.nodes[child].index = index;
    }

    pub(crate) fn set_open(&mut self, id: usize, is_open: bool) {
        self.nodes[id].is_open = is_open;
    }

    pub(crate) fn node_ref(&self, id: usize) -> &PolyNode {
        &self.nodes[id]
    }

    pub(crate) fn node_mut(&mut self, id: usize) -> &mut PolyNode {
        &mut self.nodes[id]
    }

    /// Drops a single enclosing node and lifts its children to the root.
    /// Clears the tree when there is nothing to lift.
    pub(crate) fn unwrap_outer(&mut self, manager: &mut dyn MemoryManager) {
        if self.childs.len() != 1 || self.nodes[self.childs[0]].childs.is_empty() {
            self.clear(manager);
            return;
        }

        let outer = self.childs[0];
        let lifted = std::mem::take(&mut self.nodes[outer].childs);

        self.childs.clear();
        self.dropped += 1;

        for child in lifted {
            self.add_child(UNASSIGNED, child);
        }
    }

    pub fn node(&self, id: usize) -> PolyNodeRef<'_> {
        PolyNodeRef { tree: self, id }
    }

    pub fn child_count(&self) -> usize {
        self.childs.len()
    }

    pub fn childs(&self) -> impl Iterator<Item = PolyNodeRef<'_>> + '_ {
        self.childs.iter().map(move |id| self.node(*id))
    }

    pub fn get_first(&self) -> Option<PolyNodeRef<'_>> {
        self.childs.first().map(|id| self.node(*id))
    }

    /// Number of contours in the tree. An enclosing node that was dropped after
    /// a negative offset is not counted.
    pub fn total(&self) -> usize {
        self.nodes.len() - self.dropped
    }

    fn child_ids(&self, parent: usize) -> &[usize] {
        if parent == UNASSIGNED {
            &self.childs
        } else {
            &self.nodes[parent].childs
        }
    }

    fn next_sibling_up(&self, id: usize) -> Option<usize> {
        if id == UNASSIGNED {
            return None;
        }

        let node = &self.nodes[id];
        let siblings = self.child_ids(node.parent);

        match siblings.get(node.index + 1) {
            Some(next) => Some(*next),
            None => self.next_sibling_up(node.parent),
        }
    }

    fn collect(&self, id: usize, open: Option<bool>, paths: &mut Paths) {
        let node = &self.nodes[id];

        if !node.contour.is_empty() && open.map_or(true, |open| node.is_open == open) {
            paths.push(node.contour.clone());
        }

        for child in &node.childs {
            self.collect(*child, open, paths);
        }
    }
}

/// Borrowed view of one node of a [`PolyTree`].
#[derive(Clone, Copy)]
pub struct PolyNodeRef<'a> {
    tree: &'a PolyTree,
    id: usize,
}

impl<'a> PolyNodeRef<'a> {
    pub fn id(&self) -> usize {
        self.id
    }

    pub fn contour(&self) -> &'a Path {
        &self.tree.nodes[self.id].contour
    }

    pub fn child_count(&self) -> usize {
        self.tree.nodes[self.id].childs.len()
    }

    pub fn childs(&self) -> impl Iterator<Item = PolyNodeRef<'a>> + 'a {
        let tree = self.tree;

        tree.nodes[self.id].childs.iter().map(move |id| tree.node(*id))
    }

    pub fn parent(&self) -> Option<PolyNodeRef<'a>> {
        match self.tree.nodes[self.id].parent {
            UNASSIGNED => None,
            parent => Some(self.tree.node(parent)),
        }
    }

    /// Position among the parent's children.
    pub fn index(&self) -> usize {
        self.tree.nodes[self.id].index
    }

    pub fn is_open(&self) -> bool {
        self.tree.nodes[self.id].is_open
    }

    pub fn join_type(&self) -> JoinType {
        self.tree.nodes[self.id].join_type
    }

    pub fn end_type(&self) -> EndType {
        self.tree.nodes[self.id].end_type
    }

    /// Holes sit at odd depth: children of the root are outers.
    pub fn is_hole(&self) -> bool {
        let mut result = false;
        let mut node = self.parent();

        while let Some(parent) = node {
            result = !result;
            node = parent.parent();
        }

        result
    }

    /// Next node in depth-first order.
    pub fn get_next(&self) -> Option<PolyNodeRef<'a>> {
        match self.tree.nodes[self.id].childs.first() {
            Some(first) => Some(self.tree.node(*first)),
            None => self.tree.next_sibling_up(self.id).map(|id| self.tree.node(id)),
        }
    }
}

pub fn poly_tree_to_paths(tree: &PolyTree) -> Paths {
    let mut result = Paths::with_capacity(tree.total());

    for child in &tree.childs {
        tree.collect(*child, None, &mut result);
    }

    result
}

pub fn closed_paths_from_poly_tree(tree: &PolyTree) -> Paths {
    let mut result = Paths::with_capacity(tree.total());

    for child in &tree.childs {
        tree.collect(*child, Some(false), &mut result);
    }

    result
}

/// Open paths are always direct children of the root.
pub fn open_paths_from_poly_tree(tree: &PolyTree) -> Paths {
    tree.childs()
        .filter(|node| node.is_open())
        .map(|node| node.contour().clone())
        .collect()
}
