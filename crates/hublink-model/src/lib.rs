//! # hublink-model
//!
//! Read-only access to the distributed component model.
//!
//! This crate provides:
//! - **Model**: Plain data for nodes, component instances, packages,
//!   type definitions, and hubs.
//! - **Snapshot**: Versioned model handles and the cloner that turns them
//!   into independent [`ModelSnapshot`](snapshot::ModelSnapshot)s.
//! - **View**: The [`ModelView`](view::ModelView) query interface every
//!   resolution step reads through.
//! - **Lookup**: Running-component queries by type across nodes.
//! - **Store**: JSON persistence of model documents.

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod lookup;
pub mod model;
pub mod snapshot;
pub mod store;
pub mod typeref;
pub mod view;
