//! End-to-end tests for directive resolution over whole trees.
#![allow(clippy::unwrap_used)]

use condsift::context::{EvalContext, Value};
use condsift::resolver::resolve;
use condsift::test_utils::{child_texts, leaf_with_leading, snapshot};
use condsift::tree::{Comment, Tree};

fn empty_ctx() -> EvalContext {
    EvalContext::new()
}

/// `[ // #if false \n // #endif \n ];` with an empty context resolves
/// to `[];`. The directives live in the array's inner slot.
#[test]
fn empty_array_with_inner_directives() {
    let mut tree = Tree::new("");
    let array = tree.add_child(tree.root(), "[];");
    tree.node_mut(array)
        .inner
        .push(Comment::new("#if false", 1, 2));
    tree.node_mut(array)
        .inner
        .push(Comment::new("#endif", 2, 2));

    let diagnostics = resolve(&mut tree, &empty_ctx(), "input.js");

    assert!(diagnostics.is_empty());
    assert_eq!(snapshot(&tree), "[];");
}

/// `[1, /*#if false*/ 2 /*#endif*/, 3]` resolves to `[1, 3]`.
#[test]
fn false_branch_element_is_removed() {
    let mut tree = Tree::new("");
    let array = tree.add_child(tree.root(), "[]");
    tree.add_child(array, "1");
    let two = leaf_with_leading(&mut tree, array, "2", &["#if false"]);
    tree.node_mut(two).trailing.push(Comment::new("#endif", 1, 20));
    leaf_with_leading(&mut tree, array, "3", &["#endif"]);

    let diagnostics = resolve(&mut tree, &empty_ctx(), "input.js");

    assert!(diagnostics.is_empty());
    assert_eq!(child_texts(&tree, array), vec!["1", "3"]);
    assert_eq!(snapshot(&tree), "[] 1 3");
}

/// `#if false` / `#elseif true` / `#else` around the values 2, 3, 4
/// keeps only the `#elseif` branch's value 3.
#[test]
fn elseif_branch_wins() {
    let mut tree = Tree::new("");
    let array = tree.add_child(tree.root(), "[]");
    leaf_with_leading(&mut tree, array, "2", &["#if false"]);
    leaf_with_leading(&mut tree, array, "3", &["#elseif true"]);
    let four = leaf_with_leading(&mut tree, array, "4", &["#else"]);
    tree.node_mut(four).trailing.push(Comment::new("#endif", 4, 10));

    let diagnostics = resolve(&mut tree, &empty_ctx(), "input.js");

    assert!(diagnostics.is_empty());
    assert_eq!(child_texts(&tree, array), vec!["3"]);
    assert_eq!(snapshot(&tree), "[] 3");
}

/// Nested chains: an outer `#if` around a function whose body carries an
/// inner `#if DEBUG` (false, plain comments and all) and an object with
/// a development/production/else chain.
#[test]
fn nested_chains_resolve_independently() {
    let ctx: EvalContext = [
        ("FUNC", Value::Bool(true)),
        ("DEBUG", Value::Bool(false)),
        ("MODE", Value::Str("production".to_owned())),
    ]
    .into_iter()
    .collect();

    let mut tree = Tree::new("");
    let root = tree.root();
    let before = leaf_with_leading(&mut tree, root, "let a = 1;", &["copyright"]);
    let func = leaf_with_leading(&mut tree, root, "function f()", &["#if FUNC"]);
    let _tail = leaf_with_leading(&mut tree, root, "f();", &["#endif"]);

    // Body: a debug statement guarded by #if DEBUG, closed on the next
    // statement, then the object fields guarded by their own chain.
    let dbg = leaf_with_leading(
        &mut tree,
        func,
        "console.log('debug');",
        &["#if DEBUG", "debug only"],
    );
    tree.node_mut(dbg).trailing.push(Comment::new("tail note", 2, 30));
    let obj = leaf_with_leading(&mut tree, func, "return {}", &["#endif"]);
    leaf_with_leading(&mut tree, obj, "development: true,", &["#if MODE === 'development'"]);
    leaf_with_leading(
        &mut tree,
        obj,
        "production: true,",
        &["#elseif MODE === 'production'"],
    );
    let unk = leaf_with_leading(&mut tree, obj, "mode: 'unknown',", &["#else"]);
    tree.node_mut(unk).trailing.push(Comment::new("#endif", 9, 20));

    let diagnostics = resolve(&mut tree, &ctx, "input.js");

    assert!(diagnostics.is_empty());
    // Outer chain kept the function and the statement after it.
    assert_eq!(
        child_texts(&tree, tree.root()),
        vec!["let a = 1;", "function f()", "f();"]
    );
    // Debug branch fully removed, object survives.
    assert_eq!(child_texts(&tree, func), vec!["return {}"]);
    // Only the production field remains.
    assert_eq!(child_texts(&tree, obj), vec!["production: true,"]);
    // The unrelated comment outside any chain is untouched; every
    // directive marker and the debug branch's own comments are gone.
    assert_eq!(
        snapshot(&tree),
        "/*copyright*/ let a = 1; function f() return {} production: true, f();"
    );
    assert_eq!(tree.node(before).leading.len(), 1);
}

/// If two branches would both evaluate true, only the first is kept.
#[test]
fn first_match_wins() {
    let mut tree = Tree::new("");
    let block = tree.add_child(tree.root(), "{}");
    leaf_with_leading(&mut tree, block, "first();", &["#if true"]);
    leaf_with_leading(&mut tree, block, "second();", &["#elseif true"]);
    leaf_with_leading(&mut tree, block, "after();", &["#endif"]);

    resolve(&mut tree, &empty_ctx(), "input.js");

    assert_eq!(child_texts(&tree, block), vec!["first();", "after();"]);
    assert_eq!(snapshot(&tree), "{} first(); after();");
}

/// With no true branch and no `#else`, the whole chain disappears and
/// the surviving siblings are byte-identical.
#[test]
fn no_branch_selected_removes_entire_chain() {
    let mut tree = Tree::new("");
    let block = tree.add_child(tree.root(), "{}");
    leaf_with_leading(&mut tree, block, "x = 1;", &["note"]);
    leaf_with_leading(&mut tree, block, "gone();", &["#if false"]);
    let after = leaf_with_leading(&mut tree, block, "after();", &["#endif", "after note"]);

    resolve(&mut tree, &empty_ctx(), "input.js");

    assert_eq!(child_texts(&tree, block), vec!["x = 1;", "after();"]);
    // Only the #endif marker was stripped from the closing node's slot.
    assert_eq!(tree.node(after).leading.len(), 1);
    assert_eq!(snapshot(&tree), "{} /*note*/ x = 1; /*after note*/ after();");
}

/// A chain closed by a trailing `#endif` on the only sibling deletes
/// that node outright when the branch is false.
#[test]
fn single_node_chain_with_trailing_endif() {
    let mut tree = Tree::new("");
    let block = tree.add_child(tree.root(), "{}");
    let only = leaf_with_leading(&mut tree, block, "gone();", &["#if false"]);
    tree.node_mut(only).trailing.push(Comment::new("#endif", 1, 20));

    resolve(&mut tree, &empty_ctx(), "input.js");

    assert!(child_texts(&tree, block).is_empty());
    assert_eq!(snapshot(&tree), "{}");
}

/// A missing `#endif` strips the directive markers but deletes no code.
#[test]
fn unterminated_chain_preserves_content() {
    let mut tree = Tree::new("");
    let block = tree.add_child(tree.root(), "{}");
    leaf_with_leading(&mut tree, block, "a();", &["#if false"]);
    leaf_with_leading(&mut tree, block, "b();", &["still here"]);

    let diagnostics = resolve(&mut tree, &empty_ctx(), "input.js");

    assert!(diagnostics.is_empty());
    assert_eq!(child_texts(&tree, block), vec!["a();", "b();"]);
    assert_eq!(snapshot(&tree), "{} a(); /*still here*/ b();");
}

/// A stray `#elseif`/`#else`/`#endif` without an opener is invalid:
/// only the markers are removed.
#[test]
fn stray_directives_preserve_content() {
    let mut tree = Tree::new("");
    let block = tree.add_child(tree.root(), "{}");
    leaf_with_leading(&mut tree, block, "a();", &["#elseif true", "#endif"]);
    leaf_with_leading(&mut tree, block, "b();", &["#endif"]);

    resolve(&mut tree, &empty_ctx(), "input.js");

    assert_eq!(child_texts(&tree, block), vec!["a();", "b();"]);
    assert_eq!(snapshot(&tree), "{} a(); b();");
}

/// An unbound name emits exactly one diagnostic per offending directive
/// and deletes no branch content anywhere in the chain.
#[test]
fn evaluation_error_is_conservative() {
    let mut tree = Tree::new("");
    let block = tree.add_child(tree.root(), "{}");
    let a = tree.add_child(block, "a();");
    tree.node_mut(a).leading.push(Comment::new("#if UNDEFINED", 7, 3));
    leaf_with_leading(&mut tree, block, "b();", &["#else"]);
    leaf_with_leading(&mut tree, block, "c();", &["#endif"]);

    let diagnostics = resolve(&mut tree, &empty_ctx(), "src/app.js");

    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].message, "UNDEFINED is not defined");
    assert_eq!(diagnostics[0].line, 7);
    assert_eq!(diagnostics[0].col, 3);
    assert_eq!(
        diagnostics[0].to_string(),
        "UNDEFINED is not defined at src/app.js:7:3"
    );
    // Both branches survive; only the markers are gone.
    assert_eq!(child_texts(&tree, block), vec!["a();", "b();", "c();"]);
    assert_eq!(snapshot(&tree), "{} a(); b(); c();");
}

/// Two failing conditions in one chain produce two diagnostics.
#[test]
fn one_diagnostic_per_offending_directive() {
    let mut tree = Tree::new("");
    let block = tree.add_child(tree.root(), "{}");
    leaf_with_leading(&mut tree, block, "a();", &["#if FIRST_MISSING"]);
    leaf_with_leading(&mut tree, block, "b();", &["#elseif SECOND_MISSING"]);
    leaf_with_leading(&mut tree, block, "c();", &["#endif"]);

    let diagnostics = resolve(&mut tree, &empty_ctx(), "input.js");

    assert_eq!(diagnostics.len(), 2);
    assert_eq!(diagnostics[0].message, "FIRST_MISSING is not defined");
    assert_eq!(diagnostics[1].message, "SECOND_MISSING is not defined");
    assert_eq!(child_texts(&tree, block), vec!["a();", "b();", "c();"]);
}

/// A branch selected before any erroring condition is evaluated keeps
/// normal deletion semantics: later branches are never evaluated.
#[test]
fn selection_stops_before_later_errors() {
    let mut tree = Tree::new("");
    let block = tree.add_child(tree.root(), "{}");
    leaf_with_leading(&mut tree, block, "kept();", &["#if true"]);
    leaf_with_leading(&mut tree, block, "dropped();", &["#elseif UNDEFINED"]);
    leaf_with_leading(&mut tree, block, "after();", &["#endif"]);

    let diagnostics = resolve(&mut tree, &empty_ctx(), "input.js");

    assert!(diagnostics.is_empty());
    assert_eq!(child_texts(&tree, block), vec!["kept();", "after();"]);
}

/// Re-running resolution on already-resolved output is a no-op.
#[test]
fn resolution_is_idempotent() {
    let mut tree = Tree::new("");
    let array = tree.add_child(tree.root(), "[]");
    tree.add_child(array, "1");
    let two = leaf_with_leading(&mut tree, array, "2", &["#if false"]);
    tree.node_mut(two).trailing.push(Comment::new("#endif", 1, 20));
    leaf_with_leading(&mut tree, array, "3", &["#endif"]);

    resolve(&mut tree, &empty_ctx(), "input.js");
    let first = snapshot(&tree);

    let diagnostics = resolve(&mut tree, &empty_ctx(), "input.js");
    assert!(diagnostics.is_empty());
    assert_eq!(snapshot(&tree), first);
}

/// Conditions evaluate against the caller-supplied context values.
#[test]
fn context_values_drive_selection() {
    let ctx = EvalContext::from_json_str(r#"{"TARGET": "wasm", "OPT_LEVEL": 2}"#).unwrap();

    let mut tree = Tree::new("");
    let block = tree.add_child(tree.root(), "{}");
    leaf_with_leading(&mut tree, block, "native();", &["#if TARGET == 'native'"]);
    leaf_with_leading(
        &mut tree,
        block,
        "wasm();",
        &["#elseif TARGET == 'wasm' && OPT_LEVEL >= 1"],
    );
    let last = leaf_with_leading(&mut tree, block, "fallback();", &["#else"]);
    tree.node_mut(last).trailing.push(Comment::new("#endif", 4, 12));

    let diagnostics = resolve(&mut tree, &ctx, "input.js");

    assert!(diagnostics.is_empty());
    assert_eq!(child_texts(&tree, block), vec!["wasm();"]);
}
