//! Formatted output helpers for CLI commands.
//!
//! Provides script listings, outcome lines, and error labelling.

use std::fmt::Write as _;

use hublink_common::error::HublinkError;
use hublink_runtime::engine::Outcome;
use hublink_script::script::Script;

/// A horizontal rule of `width` box-drawing characters.
#[must_use]
pub fn rule(width: usize) -> String {
    "\u{2550}".repeat(width)
}

/// Script text with one-based line numbers.
#[must_use]
pub fn numbered(script: &Script) -> String {
    let width = script.len().to_string().len();
    let mut out = String::new();
    for (idx, op) in script.iter().enumerate() {
        let _ = writeln!(out, "  {:>width$}  {op}", idx + 1);
    }
    out
}

/// One-line summary of a request outcome.
#[must_use]
pub fn describe_outcome(operation: &str, target: &str, outcome: &Outcome) -> String {
    if outcome.submitted {
        format!("  {operation} {target}: applied (request {})", outcome.request)
    } else {
        format!("  {operation} {target}: nothing to do (request {})", outcome.request)
    }
}

/// Prefixes linker errors with the request-level error kind.
#[must_use]
pub fn request_error(err: anyhow::Error) -> anyhow::Error {
    match err.downcast_ref::<HublinkError>().map(HublinkError::kind) {
        Some(kind) => err.context(kind.to_string()),
        None => err,
    }
}
