//! Linker engine for the hublink adaptation layer.
//!
//! Receives component lifecycle requests, turns them into adaptation
//! scripts against a fresh model snapshot, and submits the scripts to the
//! model service that owns the live model.

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod engine;
pub mod events;
pub mod queue;
pub mod service;
pub mod spool;
