//! # hublink-script
//!
//! Generation and checking of adaptation scripts.
//!
//! Handles:
//! - **Script**: Typed script operations and their line-oriented text form.
//! - **Parser**: Lexing and parsing script text back into operations,
//!   plus dependency-order validation.
//! - **Graph**: Dependency graph between script operations using `petgraph`.
//! - **Binding**: The compact `port>Type.port` binding grammar.
//! - **Resolver**: Merging of requested attributes with type defaults.
//! - **Synth**: Synthesis of start, stop, and update scripts.

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod binding;
pub mod component;
pub mod graph;
pub mod parser;
pub mod resolver;
pub mod script;
pub mod synth;
