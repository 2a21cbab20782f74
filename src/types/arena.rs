//! Arena storage for one conversion's node forest.
//!
//! Nodes are addressed by [`NodeId`]; tree shape lives in the `children_of` /
//! `parent_of` maps so rewrites such as frame inlining only touch those maps.

use std::collections::HashMap;
use std::ops::{Index, IndexMut};

use super::node::Node;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, Default)]
pub struct NodeArena {
    nodes: Vec<Node>,
    roots: Vec<NodeId>,
    parent_of: HashMap<NodeId, NodeId>,
    children_of: HashMap<NodeId, Vec<NodeId>>,
    inlined_from: HashMap<NodeId, String>,
}

impl NodeArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a node without linking it anywhere.
    pub fn alloc(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        id
    }

    pub fn push_root(&mut self, id: NodeId) {
        self.parent_of.remove(&id);
        self.roots.push(id);
    }

    /// Allocate `node` and append it as the last child of `parent` (or as a root).
    pub fn insert(&mut self, parent: Option<NodeId>, node: Node) -> NodeId {
        let id = self.alloc(node);
        match parent {
            Some(parent) => self.append_child(parent, id),
            None => self.push_root(id),
        }
        id
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.parent_of.insert(child, parent);
        self.children_of.entry(parent).or_default().push(child);
    }

    /// Replace the child list of `parent`, re-pointing every child at it.
    pub fn set_children(&mut self, parent: NodeId, children: Vec<NodeId>) {
        for child in &children {
            self.parent_of.insert(*child, parent);
        }
        self.children_of.insert(parent, children);
    }

    pub fn set_roots(&mut self, roots: Vec<NodeId>) {
        for root in &roots {
            self.parent_of.remove(root);
        }
        self.roots = roots;
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        self.parent_of.get(&id).copied()
    }

    pub fn children_of(&self, id: NodeId) -> &[NodeId] {
        self.children_of
            .get(&id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn has_children(&self, id: NodeId) -> bool {
        !self.children_of(id).is_empty()
    }

    /// Record that `id` was lifted out of the inlined frame `frame_id`.
    pub fn mark_inlined(&mut self, id: NodeId, frame_id: impl Into<String>) {
        self.inlined_from.insert(id, frame_id.into());
    }

    pub fn inlined_from(&self, id: NodeId) -> Option<&str> {
        self.inlined_from.get(&id).map(String::as_str)
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0)
    }

    /// Number of allocated nodes, linked or not.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Linked nodes in document order (pre-order, roots first to last).
    pub fn depth_first(&self) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack: Vec<NodeId> = self.roots.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            order.push(id);
            stack.extend(self.children_of(id).iter().rev().copied());
        }
        order
    }

    /// Number of ancestors of `id`.
    pub fn depth(&self, id: NodeId) -> usize {
        let mut depth = 0;
        let mut current = id;
        while let Some(parent) = self.parent_of(current) {
            depth += 1;
            current = parent;
        }
        depth
    }

    pub fn find_by_figma_id(&self, figma_id: &str) -> Option<NodeId> {
        self.depth_first()
            .into_iter()
            .find(|id| self[*id].base.id == figma_id)
    }
}

impl Index<NodeId> for NodeArena {
    type Output = Node;

    fn index(&self, id: NodeId) -> &Self::Output {
        &self.nodes[id.0]
    }
}

impl IndexMut<NodeId> for NodeArena {
    fn index_mut(&mut self, id: NodeId) -> &mut Self::Output {
        &mut self.nodes[id.0]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{NodeBase, NodeKind};

    fn rect(id: &str) -> Node {
        Node::new(NodeBase::new(id, id), NodeKind::Rectangle)
    }

    #[test]
    fn insert_links_parent_and_children() {
        let mut arena = NodeArena::new();
        let root = arena.insert(None, rect("root"));
        let a = arena.insert(Some(root), rect("a"));
        let b = arena.insert(Some(root), rect("b"));

        assert_eq!(arena.roots(), &[root]);
        assert_eq!(arena.children_of(root), &[a, b]);
        assert_eq!(arena.parent_of(b), Some(root));
        assert_eq!(arena.parent_of(root), None);
        assert_eq!(arena.depth(b), 1);
    }

    #[test]
    fn depth_first_visits_in_document_order() {
        let mut arena = NodeArena::new();
        let root = arena.insert(None, rect("root"));
        let a = arena.insert(Some(root), rect("a"));
        let a1 = arena.insert(Some(a), rect("a1"));
        let b = arena.insert(Some(root), rect("b"));
        let second = arena.insert(None, rect("second"));

        assert_eq!(arena.depth_first(), vec![root, a, a1, b, second]);
        assert_eq!(arena.find_by_figma_id("a1"), Some(a1));
    }

    #[test]
    fn set_children_rewrites_tree_shape_only() {
        let mut arena = NodeArena::new();
        let root = arena.insert(None, rect("root"));
        let frame = arena.insert(Some(root), rect("frame"));
        let inner = arena.insert(Some(frame), rect("inner"));

        arena.set_children(root, vec![inner]);
        arena.mark_inlined(inner, "frame");

        assert_eq!(arena.children_of(root), &[inner]);
        assert_eq!(arena.parent_of(inner), Some(root));
        assert_eq!(arena.inlined_from(inner), Some("frame"));
        assert_eq!(arena[inner].base.id, "inner");
    }
}
