//! Directive resolution: branch selection, removal, and cleanup sweep.
//!
//! One [`Resolver`] performs a single depth-first pass over one tree.
//! On node entry it resolves the inner comment slot, then any chain
//! anchored in the node's leading comments; on exit it sweeps comments
//! marked for deferred deletion. The top-level entry point never fails:
//! every recoverable condition degrades to "leave code, drop only the
//! directive markers we are certain about", surfacing evaluation
//! problems as [`Diagnostic`]s.

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

use crate::chain::{build_chain, scan, validate, ChainItem, DirectiveKind};
use crate::context::EvalContext;
use crate::expr;
use crate::tree::{NodeId, Slot, Tree};

/// A warning produced while resolving one directive, carrying the
/// originating comment's source location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// Description of the problem.
    pub message: String,
    /// File being transformed.
    pub file: PathBuf,
    /// Line number of the offending directive comment.
    pub line: usize,
    /// Column of the offending directive comment.
    pub col: usize,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} at {}:{}:{}",
            self.message,
            self.file.display(),
            self.line,
            self.col
        )
    }
}

/// Resolves conditional-compilation comment directives in one tree.
pub struct Resolver<'a> {
    context: &'a EvalContext,
    filename: PathBuf,
    /// Diagnostics collected during the pass.
    pub diagnostics: Vec<Diagnostic>,
}

impl<'a> Resolver<'a> {
    /// Creates a resolver for one pass over one tree.
    #[must_use]
    pub fn new(context: &'a EvalContext, filename: impl Into<PathBuf>) -> Self {
        Self {
            context,
            filename: filename.into(),
            diagnostics: Vec::new(),
        }
    }

    /// Runs the pass, mutating `tree` in place.
    pub fn run(&mut self, tree: &mut Tree) {
        let root = tree.root();
        self.visit_children(tree, root);
    }

    /// Depth-first visit of `parent`'s children. Positions are re-derived
    /// after every step because resolving one child's chain can delete
    /// that child and/or any number of its later siblings.
    fn visit_children(&mut self, tree: &mut Tree, parent: NodeId) {
        let mut index = 0;
        loop {
            let Some(&child) = tree.node(parent).children().get(index) else {
                break;
            };
            self.enter(tree, child);
            if tree.node(child).is_detached() {
                // The slot at `index` now holds the next surviving sibling.
                continue;
            }
            self.visit_children(tree, child);
            Self::sweep(tree, child);
            index = tree
                .node(parent)
                .children()
                .iter()
                .position(|&c| c == child)
                .map_or(index, |pos| pos + 1);
        }
    }

    /// Entry processing for one node: inner slot first, then any chain
    /// anchored in the leading slot.
    fn enter(&mut self, tree: &mut Tree, node: NodeId) {
        if !tree.node(node).inner.is_empty() {
            // An inner slot lives in a childless body, so a directive run
            // found there guards no content; it is stripped without
            // evaluation, together with anything caught between its first
            // and last marker.
            let run = scan(tree, node, Slot::Inner);
            Self::remove_range(tree, &run);
        }

        if tree.node(node).leading.is_empty() {
            return;
        }

        let chain = build_chain(tree, node);
        if chain.is_empty() {
            return;
        }

        if !validate(&chain) {
            // Invalid directive syntax never deletes code, only the
            // unparseable markers themselves.
            Self::mark_chain_directives(tree, &chain);
            return;
        }

        let mut has_error = false;
        let mut selected = None;
        for (i, item) in chain.iter().enumerate() {
            let Some(directive) = item.directive() else {
                continue;
            };
            let truth = match directive.kind {
                DirectiveKind::Else => true,
                DirectiveKind::EndIf => false,
                DirectiveKind::If | DirectiveKind::ElseIf => {
                    match expr::evaluate(&directive.condition, self.context) {
                        Ok(value) => value.truthy(),
                        Err(err) => {
                            self.diagnostics.push(Diagnostic {
                                message: err.to_string(),
                                file: self.filename.clone(),
                                line: directive.line,
                                col: directive.column,
                            });
                            has_error = true;
                            false
                        }
                    }
                }
            };
            if truth {
                selected = Some(i);
                break;
            }
        }

        if has_error {
            // With an unreliable branch outcome it is unsafe to delete
            // code that might have been intended to survive.
            Self::mark_chain_directives(tree, &chain);
            return;
        }

        match selected {
            // No branch matched and no #else: the whole chain goes.
            None => Self::remove_range(tree, &chain),
            Some(index) => {
                Self::remove_range(tree, &chain[..=index]);
                let next_directive = chain
                    .iter()
                    .skip(index + 1)
                    .position(|item| item.directive().is_some())
                    .map(|pos| pos + index + 1);
                if let Some(next) = next_directive {
                    Self::remove_range(tree, &chain[next..]);
                }
            }
        }
    }

    /// Physically delete everything in `range` from the tree/comments.
    ///
    /// Comment removal is expressed as ignore-marking (swept on exit)
    /// so that indices other in-flight computations hold into the same
    /// slot stay valid; node deletion and interior full-slot clears are
    /// immediate. Deletions at a slot's boundary only ever trim a
    /// contiguous prefix or suffix.
    fn remove_range(tree: &mut Tree, range: &[ChainItem]) {
        match range {
            [] => {}
            [ChainItem::Normal(node)] => tree.remove_node(*node),
            [ChainItem::Directive(d)] => {
                Self::mark_comments(tree, d.node, d.slot, d.index, Some(d.index + 1));
            }
            _ => {
                if range.iter().all(|item| item.directive().is_some()) {
                    // Pure directive run: one contiguous comment span in
                    // one slot, marked in one operation.
                    let (Some(first), Some(last)) =
                        (range[0].directive(), range[range.len() - 1].directive())
                    else {
                        return;
                    };
                    Self::mark_comments(tree, first.node, first.slot, first.index, Some(last.index + 1));
                    return;
                }

                match &range[0] {
                    ChainItem::Normal(node) => tree.remove_node(*node),
                    ChainItem::Directive(d) => {
                        Self::mark_comments(tree, d.node, d.slot, d.index, None);
                    }
                }
                match &range[range.len() - 1] {
                    ChainItem::Normal(node) => tree.remove_node(*node),
                    ChainItem::Directive(d) => {
                        Self::mark_comments(tree, d.node, d.slot, 0, Some(d.index + 1));
                    }
                }
                for item in &range[1..range.len() - 1] {
                    match item {
                        ChainItem::Normal(node) => tree.remove_node(*node),
                        // An interior slot contributes nothing once any of
                        // its directives is being deleted.
                        ChainItem::Directive(d) => tree.clear_slot(d.node, d.slot),
                    }
                }
            }
        }
    }

    /// Mark `slot[start..end]` for deferred deletion (`end = None` marks
    /// through the end of the slot).
    fn mark_comments(tree: &mut Tree, node: NodeId, slot: Slot, start: usize, end: Option<usize>) {
        let comments = tree.node_mut(node).slot_mut(slot);
        let end = end.unwrap_or(comments.len());
        for comment in comments.iter_mut().take(end).skip(start) {
            comment.ignore = true;
        }
    }

    /// Conservative degradation: mark every directive marker in the
    /// chain for deletion, touch nothing else.
    fn mark_chain_directives(tree: &mut Tree, chain: &[ChainItem]) {
        for item in chain {
            if let Some(d) = item.directive() {
                if let Some(comment) = tree.node_mut(d.node).slot_mut(d.slot).get_mut(d.index) {
                    comment.ignore = true;
                }
            }
        }
    }

    /// Exit processing: purge comments marked during entry.
    fn sweep(tree: &mut Tree, node: NodeId) {
        for slot in [Slot::Leading, Slot::Trailing, Slot::Inner] {
            tree.node_mut(node).slot_mut(slot).retain(|c| !c.ignore);
        }
    }
}

/// Resolve all directive chains in `tree` against `context`, in place.
/// Returns the diagnostics emitted along the way; never fails.
pub fn resolve(
    tree: &mut Tree,
    context: &EvalContext,
    filename: impl Into<PathBuf>,
) -> Vec<Diagnostic> {
    let mut resolver = Resolver::new(context, filename);
    resolver.run(tree);
    resolver.diagnostics
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::Comment;

    #[test]
    fn diagnostic_display_includes_location() {
        let diagnostic = Diagnostic {
            message: "MISSING is not defined".to_owned(),
            file: PathBuf::from("src/app.js"),
            line: 12,
            col: 4,
        };
        assert_eq!(
            diagnostic.to_string(),
            "MISSING is not defined at src/app.js:12:4"
        );
    }

    #[test]
    fn inner_slot_run_is_stripped_without_evaluation() {
        let mut tree = Tree::new("root");
        let body = tree.add_child(tree.root(), "[]");
        tree.node_mut(body).inner.push(Comment::new("#if false", 1, 2));
        tree.node_mut(body).inner.push(Comment::new("note", 2, 2));
        tree.node_mut(body).inner.push(Comment::new("#endif", 3, 2));

        let diagnostics = resolve(&mut tree, &EvalContext::new(), "test.js");
        assert!(diagnostics.is_empty());
        assert!(tree.node(body).inner.is_empty());
    }

    #[test]
    fn inner_slot_plain_comments_survive_outside_the_run() {
        let mut tree = Tree::new("root");
        let body = tree.add_child(tree.root(), "{}");
        tree.node_mut(body).inner.push(Comment::new("keep me", 1, 2));

        resolve(&mut tree, &EvalContext::new(), "test.js");
        assert_eq!(tree.node(body).inner.len(), 1);
    }
}
