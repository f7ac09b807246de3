//! Core library for condsift: conditional-compilation comment directives
//! (`#if` / `#elseif` / `#else` / `#endif`) resolved against an
//! already-parsed syntax tree.
//!
//! Directives live in comments attached to tree nodes (leading, trailing
//! or inner slot). During one depth-first pass the resolver groups
//! consecutive directives and the sibling nodes between them into
//! chains, evaluates each branch condition against a caller-supplied
//! context, deletes the losing branches together with every directive
//! marker, and leaves all unrelated code and comments untouched.
//! Structural or evaluation problems never delete content: they degrade
//! to stripping the directive markers alone.

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

/// Module containing directive scanning, chain construction, and chain
/// validation.
pub mod chain;

/// Module for loading configuration.
pub mod config;

/// Module containing shared constants (directive prefixes, config file
/// names).
pub mod constants;

/// Module defining the evaluation context (option name → value mapping).
pub mod context;

/// Module containing the condition expression interpreter.
pub mod expr;

/// Module containing the resolver: branch selection, removal engine,
/// and cleanup sweep.
pub mod resolver;

/// Module containing test utilities.
/// This helps in writing tests for the resolver and its parts.
pub mod test_utils;

/// Module containing the arena syntax tree and comment slots.
pub mod tree;
