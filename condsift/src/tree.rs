//! Arena-backed syntax tree with per-node comment attachment slots.
//!
//! This is the concrete form of the tree contract the resolver operates
//! against: ordered children, three ordered comment slots per node, a
//! structural delete primitive, and dynamic sibling lookup. Nodes are
//! identified by stable indices into an arena; deletion detaches a node
//! from its parent without invalidating any `NodeId`.

use compact_str::CompactString;
use smallvec::SmallVec;

/// One comment attached to a syntax-tree node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    /// Comment text without delimiters (`//`, `/* */`, `#`, ...).
    pub text: CompactString,
    /// Line number (1-indexed).
    pub line: usize,
    /// Column (byte offset within line, zero-indexed).
    pub column: usize,
    /// Deferred-deletion marker. Ignored comments are invisible to
    /// directive scanning and are physically removed by the cleanup
    /// sweep on traversal exit.
    pub ignore: bool,
}

impl Comment {
    /// Create a comment at the given source location.
    #[must_use]
    pub fn new(text: impl Into<CompactString>, line: usize, column: usize) -> Self {
        Self {
            text: text.into(),
            line,
            column,
            ignore: false,
        }
    }
}

/// Selects one of a node's three comment attachment slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    /// Comments above the node in source.
    Leading,
    /// Comments directly after the node on the same logical line.
    Trailing,
    /// Comments inside an otherwise-childless body (e.g. an empty block).
    Inner,
}

/// Ordered comment sequence for one attachment slot.
pub type CommentSlot = SmallVec<[Comment; 2]>;

/// Stable handle to a node in a [`Tree`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

impl NodeId {
    /// Arena index of this node.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// A single syntax-tree node.
#[derive(Debug, Clone, Default)]
pub struct Node {
    /// Opaque source text of the node itself (not including children).
    pub text: CompactString,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    /// Comments above the node.
    pub leading: CommentSlot,
    /// Comments directly after the node.
    pub trailing: CommentSlot,
    /// Comments inside an empty body.
    pub inner: CommentSlot,
    detached: bool,
}

impl Node {
    /// Parent of this node, `None` for the root.
    #[must_use]
    pub const fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Ordered children of this node.
    #[must_use]
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Whether the node was structurally deleted from the tree.
    #[must_use]
    pub const fn is_detached(&self) -> bool {
        self.detached
    }

    /// Shared access to one comment slot.
    #[must_use]
    pub fn slot(&self, slot: Slot) -> &CommentSlot {
        match slot {
            Slot::Leading => &self.leading,
            Slot::Trailing => &self.trailing,
            Slot::Inner => &self.inner,
        }
    }

    /// Mutable access to one comment slot.
    pub fn slot_mut(&mut self, slot: Slot) -> &mut CommentSlot {
        match slot {
            Slot::Leading => &mut self.leading,
            Slot::Trailing => &mut self.trailing,
            Slot::Inner => &mut self.inner,
        }
    }
}

/// Arena of nodes forming one syntax tree.
#[derive(Debug, Clone)]
pub struct Tree {
    nodes: Vec<Node>,
    root: NodeId,
}

impl Tree {
    /// Create a tree holding a single root node with the given text.
    #[must_use]
    pub fn new(root_text: impl Into<CompactString>) -> Self {
        let root = Node {
            text: root_text.into(),
            ..Node::default()
        };
        Self {
            nodes: vec![root],
            root: NodeId(0),
        }
    }

    /// Root node handle.
    #[must_use]
    pub const fn root(&self) -> NodeId {
        self.root
    }

    /// Shared access to a node.
    #[must_use]
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    /// Mutable access to a node.
    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    /// Append a new child node under `parent` and return its handle.
    pub fn add_child(&mut self, parent: NodeId, text: impl Into<CompactString>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            text: text.into(),
            parent: Some(parent),
            ..Node::default()
        });
        self.nodes[parent.0].children.push(id);
        id
    }

    /// Next sibling of `id`, re-derived from the current child list so
    /// the answer stays correct across mid-traversal deletions.
    #[must_use]
    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.nodes[id.0].parent?;
        let siblings = &self.nodes[parent.0].children;
        let pos = siblings.iter().position(|&c| c == id)?;
        siblings.get(pos + 1).copied()
    }

    /// Previous sibling of `id`, re-derived like [`Self::next_sibling`].
    #[must_use]
    pub fn prev_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.nodes[id.0].parent?;
        let siblings = &self.nodes[parent.0].children;
        let pos = siblings.iter().position(|&c| c == id)?;
        pos.checked_sub(1).map(|p| siblings[p])
    }

    /// Structurally delete `id`: unlink it from its parent's child list
    /// and mark the whole subtree detached. The node's own comments go
    /// with it. Handles into the subtree remain valid but report
    /// [`Node::is_detached`].
    pub fn remove_node(&mut self, id: NodeId) {
        if let Some(parent) = self.nodes[id.0].parent {
            self.nodes[parent.0].children.retain(|&c| c != id);
        }
        self.detach_subtree(id);
    }

    fn detach_subtree(&mut self, id: NodeId) {
        self.nodes[id.0].detached = true;
        let children = self.nodes[id.0].children.clone();
        for child in children {
            self.detach_subtree(child);
        }
    }

    /// Empty one comment slot of a node in place.
    pub fn clear_slot(&mut self, id: NodeId, slot: Slot) {
        self.node_mut(id).slot_mut(slot).clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sibling_lookup_tracks_deletions() {
        let mut tree = Tree::new("root");
        let a = tree.add_child(tree.root(), "a");
        let b = tree.add_child(tree.root(), "b");
        let c = tree.add_child(tree.root(), "c");

        assert_eq!(tree.next_sibling(a), Some(b));
        tree.remove_node(b);
        assert_eq!(tree.next_sibling(a), Some(c));
        assert_eq!(tree.prev_sibling(c), Some(a));
        assert!(tree.node(b).is_detached());
    }

    #[test]
    fn remove_node_detaches_descendants() {
        let mut tree = Tree::new("root");
        let a = tree.add_child(tree.root(), "a");
        let inner = tree.add_child(a, "inner");

        tree.remove_node(a);
        assert!(tree.node(a).is_detached());
        assert!(tree.node(inner).is_detached());
        assert!(tree.node(tree.root()).children().is_empty());
    }

    #[test]
    fn root_has_no_siblings() {
        let tree = Tree::new("root");
        assert_eq!(tree.next_sibling(tree.root()), None);
        assert_eq!(tree.prev_sibling(tree.root()), None);
    }
}
