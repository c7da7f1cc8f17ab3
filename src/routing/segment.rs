//! Segment trie holding the registered entry points.
//!
//! # Responsibilities
//! - Store one node per distinct path segment prefix
//! - Keep static children, at most one dynamic child, and an optional entry point per node
//! - Prune nodes that no longer lead to any entry point
//!
//! # Design Decisions
//! - Nodes live in an arena and refer to each other by `NodeId`
//! - `parent` is a navigational index only; children are owned by their slot in the arena
//! - Freed slots are recycled, so ids are only meaningful while the node is attached
//! - The empty-text (trailing slash) child is always the first static child

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::routing::entry_point::{split_segments, EntryPoint, PatternSegment};

/// Index of a node in the segment arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

impl NodeId {
    pub const ROOT: NodeId = NodeId(0);
}

#[derive(Debug, Clone, Default)]
struct PathSegment {
    text: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    dynamic_child: Option<NodeId>,
    entry_point: Option<Arc<EntryPoint>>,
}

impl PathSegment {
    fn is_dead(&self) -> bool {
        self.children.is_empty() && self.dynamic_child.is_none() && self.entry_point.is_none()
    }
}

/// Arena-backed trie of path segments.
#[derive(Debug, Clone)]
pub struct SegmentTree {
    nodes: Vec<PathSegment>,
    free: Vec<NodeId>,
}

impl Default for SegmentTree {
    fn default() -> Self {
        Self::new()
    }
}

impl SegmentTree {
    /// Create a tree holding only the root.
    pub fn new() -> Self {
        Self {
            nodes: vec![PathSegment::default()],
            free: Vec::new(),
        }
    }

    /// Build a tree from scratch, registering entry points in order.
    pub fn from_entry_points<'a, I>(entry_points: I) -> Self
    where
        I: IntoIterator<Item = &'a Arc<EntryPoint>>,
    {
        let mut tree = Self::new();
        for ep in entry_points {
            tree.insert(ep.clone());
        }
        tree
    }

    fn node(&self, id: NodeId) -> &PathSegment {
        &self.nodes[id.0]
    }

    fn node_mut(&mut self, id: NodeId) -> &mut PathSegment {
        &mut self.nodes[id.0]
    }

    fn alloc(&mut self, text: &str, parent: NodeId) -> NodeId {
        let segment = PathSegment {
            text: text.to_string(),
            parent: Some(parent),
            ..PathSegment::default()
        };
        match self.free.pop() {
            Some(id) => {
                *self.node_mut(id) = segment;
                id
            }
            None => {
                self.nodes.push(segment);
                NodeId(self.nodes.len() - 1)
            }
        }
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    pub fn text(&self, id: NodeId) -> &str {
        &self.node(id).text
    }

    pub fn entry_point(&self, id: NodeId) -> Option<&Arc<EntryPoint>> {
        self.node(id).entry_point.as_ref()
    }

    /// Static child with exactly this text.
    pub fn static_child(&self, id: NodeId, text: &str) -> Option<NodeId> {
        self.node(id)
            .children
            .iter()
            .copied()
            .find(|child| self.node(*child).text == text)
    }

    pub fn first_static_child(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).children.first().copied()
    }

    pub fn dynamic_child(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).dynamic_child
    }

    /// Descend along `path`, creating nodes as needed, and return the terminal node.
    fn descend_or_create(&mut self, path: &str) -> NodeId {
        let mut current = NodeId::ROOT;
        for (_, segment) in split_segments(path) {
            current = match PatternSegment::parse(segment) {
                PatternSegment::Placeholder(_) => match self.dynamic_child(current) {
                    Some(child) => child,
                    None => {
                        let child = self.alloc("", current);
                        self.node_mut(current).dynamic_child = Some(child);
                        child
                    }
                },
                PatternSegment::Static(text) => match self.static_child(current, text) {
                    Some(child) => child,
                    None => {
                        let child = self.alloc(text, current);
                        let children = &mut self.node_mut(current).children;
                        if text.is_empty() {
                            children.insert(0, child);
                        } else {
                            children.push(child);
                        }
                        child
                    }
                },
            };
        }
        current
    }

    /// Find the node an entry point with this pattern would occupy.
    pub fn find(&self, path: &str) -> Option<NodeId> {
        let mut current = NodeId::ROOT;
        for (_, segment) in split_segments(path) {
            current = match PatternSegment::parse(segment) {
                PatternSegment::Placeholder(_) => self.dynamic_child(current)?,
                PatternSegment::Static(text) => self.static_child(current, text)?,
            };
        }
        Some(current)
    }

    /// Attach an entry point at the node for its path.
    ///
    /// Returns the entry point previously attached there, if any.
    pub fn insert(&mut self, ep: Arc<EntryPoint>) -> Option<Arc<EntryPoint>> {
        let id = self.descend_or_create(ep.path());
        self.node_mut(id).entry_point.replace(ep)
    }

    /// Replace the entry point on a node, pruning the node if it ends up dead.
    pub fn set_entry_point(&mut self, id: NodeId, ep: Option<Arc<EntryPoint>>) {
        self.node_mut(id).entry_point = ep;
        self.prune(id);
    }

    /// Remove `id` and every ancestor that no longer leads anywhere.
    ///
    /// Stops at the first live ancestor; the root is never removed.
    pub fn prune(&mut self, id: NodeId) {
        let mut current = id;
        while let Some(parent) = self.node(current).parent {
            if !self.node(current).is_dead() {
                break;
            }

            let parent_node = self.node_mut(parent);
            if parent_node.dynamic_child == Some(current) {
                parent_node.dynamic_child = None;
            } else {
                parent_node.children.retain(|child| *child != current);
            }

            *self.node_mut(current) = PathSegment::default();
            self.free.push(current);
            current = parent;
        }
    }

    /// True when nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.node(NodeId::ROOT).is_dead()
    }

    /// Number of nodes reachable from the root, the root included.
    pub fn node_count(&self) -> usize {
        self.nodes.len() - self.free.len()
    }

    /// Structural snapshot, used to compare trees.
    pub fn shape(&self) -> SegmentShape {
        self.shape_of(NodeId::ROOT)
    }

    fn shape_of(&self, id: NodeId) -> SegmentShape {
        let node = self.node(id);
        SegmentShape {
            entry_point: node.entry_point.as_ref().map(RouteIdentity::of),
            static_children: node
                .children
                .iter()
                .map(|child| (self.node(*child).text.clone(), self.shape_of(*child)))
                .collect(),
            dynamic_child: node.dynamic_child.map(|child| Box::new(self.shape_of(child))),
        }
    }

    /// Check the structural invariants of the tree.
    ///
    /// Returns a description of the first violation found.
    pub fn check_invariants(&self) -> Result<(), String> {
        self.check_node(NodeId::ROOT)
    }

    fn check_node(&self, id: NodeId) -> Result<(), String> {
        let node = self.node(id);
        if id != NodeId::ROOT && node.is_dead() {
            return Err(format!("dead node '{}' left in tree", node.text));
        }
        for (i, child) in node.children.iter().enumerate() {
            let child_node = self.node(*child);
            if child_node.parent != Some(id) {
                return Err(format!("static child '{}' has a wrong parent", child_node.text));
            }
            if i > 0 && child_node.text.is_empty() {
                return Err("trailing slash child is not the first child".to_string());
            }
            self.check_node(*child)?;
        }
        if let Some(child) = node.dynamic_child {
            if self.node(child).parent != Some(id) {
                return Err("dynamic child has a wrong parent".to_string());
            }
            self.check_node(child)?;
        }
        Ok(())
    }
}

/// Identity of an entry point attached to a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteIdentity {
    pub path: String,
    addr: usize,
}

impl RouteIdentity {
    fn of(ep: &Arc<EntryPoint>) -> Self {
        Self {
            path: ep.path().to_string(),
            addr: Arc::as_ptr(ep) as usize,
        }
    }
}

/// Order-insensitive structural view of a segment tree.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SegmentShape {
    pub entry_point: Option<RouteIdentity>,
    pub static_children: BTreeMap<String, SegmentShape>,
    pub dynamic_child: Option<Box<SegmentShape>>,
}
