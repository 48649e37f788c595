//! Versioned model handles and immutable snapshots.
//!
//! The model service hands out a [`VersionedModel`] that shares the live
//! document. A [`ModelCloner`] turns it into a [`ModelSnapshot`] owned by
//! a single operation, so resolution never observes concurrent updates.

use std::sync::Arc;

use crate::model::{ComponentInstance, Hub, ModelRoot, Node, Package, TypeDefinition};
use crate::view::ModelView;

/// A model document as published by the model service, tagged with the
/// version it was published under.
#[derive(Debug, Clone)]
pub struct VersionedModel {
    /// Version tag assigned by the model service.
    pub uuid: uuid::Uuid,
    /// Shared document.
    pub model: Arc<ModelRoot>,
}

impl VersionedModel {
    /// Publishes a document under a fresh version tag.
    #[must_use]
    pub fn new(model: ModelRoot) -> Self {
        Self {
            uuid: uuid::Uuid::new_v4(),
            model: Arc::new(model),
        }
    }
}

/// An independent, immutable copy of the model at one version.
#[derive(Debug, Clone)]
pub struct ModelSnapshot {
    uuid: uuid::Uuid,
    root: ModelRoot,
}

impl ModelSnapshot {
    /// Wraps an owned document as a snapshot.
    #[must_use]
    pub const fn new(uuid: uuid::Uuid, root: ModelRoot) -> Self {
        Self { uuid, root }
    }

    /// Version the snapshot was taken from.
    #[must_use]
    pub const fn version(&self) -> &uuid::Uuid {
        &self.uuid
    }
}

impl From<ModelRoot> for ModelSnapshot {
    fn from(root: ModelRoot) -> Self {
        Self::new(uuid::Uuid::nil(), root)
    }
}

impl ModelView for ModelSnapshot {
    fn find_node(&self, name: &str) -> Option<&Node> {
        self.root.find_node(name)
    }

    fn find_package(&self, path: &str) -> Option<&Package> {
        self.root.find_package(path)
    }

    fn find_type_definition(&self, type_name: &str) -> Option<&TypeDefinition> {
        self.root.find_type_definition(type_name)
    }

    fn find_hub(&self, id: &str) -> Option<&Hub> {
        self.root.find_hub(id)
    }

    fn list_components(&self, node: &str) -> &[ComponentInstance] {
        self.root.list_components(node)
    }
}

/// Produces independent snapshots from versioned handles.
pub trait ModelCloner: Send + Sync {
    /// Copies the handle's document into a snapshot.
    fn clone_model(&self, handle: &VersionedModel) -> ModelSnapshot;
}

/// Cloner performing a full deep copy of the document.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeepCloner;

impl ModelCloner for DeepCloner {
    fn clone_model(&self, handle: &VersionedModel) -> ModelSnapshot {
        tracing::trace!(version = %handle.uuid, "cloning model");
        ModelSnapshot::new(handle.uuid, ModelRoot::clone(&handle.model))
    }
}
