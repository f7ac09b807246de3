//! Directive scanning and chain construction.
//!
//! A chain is the ordered sequence of directive comments and the content
//! nodes caught between them that together form one conditional block.
//! Chains are built fresh for every qualifying node during traversal and
//! discarded right after removal runs.

use compact_str::CompactString;

use crate::constants::{ELSEIF_PREFIX, ELSE_PREFIX, ENDIF_PREFIX, IF_PREFIX};
use crate::tree::{NodeId, Slot, Tree};

/// The four recognized directive kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectiveKind {
    /// `#if <condition>`, opens a chain.
    If,
    /// `#elseif <condition>`, an alternative branch.
    ElseIf,
    /// `#else`, the unconditional fallback branch.
    Else,
    /// `#endif`, closes a chain.
    EndIf,
}

/// A directive comment located in one slot of one node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    /// Which directive this is.
    pub kind: DirectiveKind,
    /// Condition source text; empty for `#else` / `#endif`.
    pub condition: CompactString,
    /// Node the comment is attached to.
    pub node: NodeId,
    /// Attachment slot within that node.
    pub slot: Slot,
    /// Position of the comment within the slot at scan time.
    pub index: usize,
    /// Source line of the comment (1-indexed), captured at scan time so
    /// diagnostics stay accurate once mutation starts.
    pub line: usize,
    /// Source column of the comment (zero-indexed).
    pub column: usize,
}

/// One element of a chain: a directive marker or a whole content node
/// sitting between two directives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChainItem {
    /// A recognized directive comment.
    Directive(Directive),
    /// A sibling tree node that is chain content, kept or deleted
    /// depending on the branch decision.
    Normal(NodeId),
}

impl ChainItem {
    /// The directive, if this item is one.
    #[must_use]
    pub const fn directive(&self) -> Option<&Directive> {
        match self {
            Self::Directive(d) => Some(d),
            Self::Normal(_) => None,
        }
    }

    /// Whether this item is a directive of the given kind.
    #[must_use]
    pub fn is_kind(&self, kind: DirectiveKind) -> bool {
        matches!(self, Self::Directive(d) if d.kind == kind)
    }
}

/// Classify trimmed comment text as a directive. Prefixes are tested in
/// priority order; `#if` and `#elseif` require the trailing space that
/// separates the keyword from its condition.
fn classify(text: &str) -> Option<(DirectiveKind, CompactString)> {
    if let Some(rest) = text.strip_prefix(IF_PREFIX) {
        return Some((DirectiveKind::If, rest.into()));
    }
    if let Some(rest) = text.strip_prefix(ELSEIF_PREFIX) {
        return Some((DirectiveKind::ElseIf, rest.into()));
    }
    if text.starts_with(ELSE_PREFIX) {
        return Some((DirectiveKind::Else, CompactString::default()));
    }
    if text.starts_with(ENDIF_PREFIX) {
        return Some((DirectiveKind::EndIf, CompactString::default()));
    }
    None
}

/// Scan one attachment slot of one node for directive comments, in
/// order. Comments already marked ignored are invisible. Scanning stops
/// right after an `#endif` is emitted: a closing directive always
/// terminates its slot, even if later comments exist.
#[must_use]
pub fn scan(tree: &Tree, node: NodeId, slot: Slot) -> Vec<ChainItem> {
    let mut items = Vec::new();
    for (index, comment) in tree.node(node).slot(slot).iter().enumerate() {
        if comment.ignore {
            continue;
        }
        let Some((kind, condition)) = classify(comment.text.trim()) else {
            continue;
        };
        items.push(ChainItem::Directive(Directive {
            kind,
            condition,
            node,
            slot,
            index,
            line: comment.line,
            column: comment.column,
        }));
        if kind == DirectiveKind::EndIf {
            break;
        }
    }
    items
}

/// Build one complete chain starting from a node with leading comments.
///
/// Walks forward through siblings: after each leading-slot scan, the
/// chain either closed on `#endif` or the current node becomes content
/// (a [`ChainItem::Normal`]) and the walk advances. A content node's
/// trailing comments are absorbed on advance; they are redundant with
/// the next sibling's leading comments and must not be double-processed.
/// On the last sibling the trailing slot is scanned instead, covering a
/// chain whose `#endif` rides as a trailing comment; end of sequence
/// forces termination either way.
///
/// For a non-empty chain the immediately preceding sibling's trailing
/// comments are detached: they belong to content already outside the
/// chain and must not interfere with its boundary handling.
///
/// An empty return means "nothing to do" and the caller must not mutate.
#[must_use]
pub fn build_chain(tree: &mut Tree, start: NodeId) -> Vec<ChainItem> {
    let mut chain: Vec<ChainItem> = Vec::new();
    let mut current = start;
    loop {
        chain.extend(scan(tree, current, Slot::Leading));
        if chain.is_empty() || chain[chain.len() - 1].is_kind(DirectiveKind::EndIf) {
            break;
        }

        chain.push(ChainItem::Normal(current));

        let Some(next) = tree.next_sibling(current) else {
            chain.extend(scan(tree, current, Slot::Trailing));
            break;
        };
        tree.clear_slot(current, Slot::Trailing);
        current = next;
    }

    if !chain.is_empty() {
        if let Some(prev) = tree.prev_sibling(start) {
            tree.clear_slot(prev, Slot::Trailing);
        }
    }
    chain
}

/// A chain is well-formed iff its single `#if` sits at index 0 and its
/// single `#endif` sits at the last index. Anything else (stray
/// `#endif`, `#elseif`/`#else` without an opener, missing terminator)
/// is invalid and must only ever cost the directive markers themselves.
#[must_use]
pub fn validate(chain: &[ChainItem]) -> bool {
    let last_if = chain.iter().rposition(|item| item.is_kind(DirectiveKind::If));
    let first_endif = chain
        .iter()
        .position(|item| item.is_kind(DirectiveKind::EndIf));
    last_if == Some(0) && first_endif == chain.len().checked_sub(1)
}
