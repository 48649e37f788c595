//! # hublink-sdk
//!
//! Public SDK for embedding the hublink linker in a Rust service.
//!
//! Provides three main entry points:
//! - [`StartRequestBuilder`](builder::StartRequestBuilder): Fluent API for describing a component to start.
//! - [`ScriptChecker`](checker::ScriptChecker): Parses and order-checks adaptation scripts against a model.
//! - [`EventListener`](event::EventListener): Follows the adaptation events of a linker.
//!
//! # Example
//!
//! ```rust,no_run
//! use hublink_sdk::builder::StartRequestBuilder;
//!
//! let props = StartRequestBuilder::new("org.activehome.Switch", "switch")
//!     .attribute("label", "hall")
//!     .binding("out>Light.in")
//!     .build();
//! ```

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod builder;
pub mod checker;
pub mod event;
