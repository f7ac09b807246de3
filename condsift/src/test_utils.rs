//! Test support: compact tree construction and text snapshots.
//!
//! Serialization is not part of the core contract, so the snapshot here
//! is deliberately crude: comments render as `/*text*/` and everything
//! is joined with single spaces. It exists to make assertions about
//! which nodes and comments survived a resolution pass.

use crate::tree::{Comment, NodeId, Tree};

/// Shorthand for building a [`Comment`] at a source location.
#[must_use]
pub fn comment(text: &str, line: usize, column: usize) -> Comment {
    Comment::new(text, line, column)
}

/// Append a child with leading comments in one call.
pub fn leaf_with_leading(tree: &mut Tree, parent: NodeId, text: &str, leading: &[&str]) -> NodeId {
    let id = tree.add_child(parent, text);
    for (i, c) in leading.iter().enumerate() {
        tree.node_mut(id).leading.push(Comment::new(*c, i + 1, 0));
    }
    id
}

/// Texts of the surviving children of `parent`, in order.
#[must_use]
pub fn child_texts(tree: &Tree, parent: NodeId) -> Vec<String> {
    tree.node(parent)
        .children()
        .iter()
        .map(|&c| tree.node(c).text.to_string())
        .collect()
}

/// Render the whole tree to a single line of space-separated tokens.
#[must_use]
pub fn snapshot(tree: &Tree) -> String {
    let mut out = Vec::new();
    walk(tree, tree.root(), &mut out);
    out.join(" ")
}

fn walk(tree: &Tree, id: NodeId, out: &mut Vec<String>) {
    let node = tree.node(id);
    for c in &node.leading {
        out.push(format!("/*{}*/", c.text));
    }
    if !node.text.is_empty() {
        out.push(node.text.to_string());
    }
    for &child in node.children() {
        walk(tree, child, out);
    }
    for c in &node.inner {
        out.push(format!("/*{}*/", c.text));
    }
    for c in &node.trailing {
        out.push(format!("/*{}*/", c.text));
    }
}
