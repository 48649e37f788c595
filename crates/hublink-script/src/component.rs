//! Requested component properties.
//!
//! A start request names a component type and an instance id, and carries
//! attribute values and port bindings. The resolver enriches it with
//! type defaults before synthesis.

use std::collections::BTreeMap;

use hublink_common::error::{HublinkError, Result};
use hublink_common::types::ComponentPath;
use serde::{Deserialize, Serialize};

/// Port name to destination tokens (`<node>.<componentId>.<port>`), in
/// the order they were requested or discovered.
pub type PortBindings = BTreeMap<String, Vec<String>>;

/// Everything needed to start one component instance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComponentProperties {
    /// Fully-qualified, optionally versioned, component type name.
    pub component_type: String,
    /// Instance id, unique within the node.
    pub id: String,
    /// Attribute values. Keys carrying the binding prefix hold binding
    /// specifications rather than plain values.
    pub attributes: BTreeMap<String, String>,
    /// Explicit destinations per source port.
    pub port_bindings: PortBindings,
}

impl ComponentProperties {
    /// Creates properties for a type and id with no attributes or bindings.
    #[must_use]
    pub fn new(component_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            component_type: component_type.into(),
            id: id.into(),
            ..Self::default()
        }
    }

    /// Checks that the identifying fields are present.
    ///
    /// # Errors
    ///
    /// Returns [`HublinkError::NotFound`] if the id or the type name is empty.
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(HublinkError::NotFound {
                kind: "component id",
                id: format!("start request for type \"{}\"", self.component_type),
            });
        }
        if self.component_type.trim().is_empty() {
            return Err(HublinkError::NotFound {
                kind: "component type",
                id: format!("start request for \"{}\"", self.id),
            });
        }
        Ok(())
    }

    /// Address of the instance on the given node.
    #[must_use]
    pub fn path(&self, node: &str) -> ComponentPath {
        ComponentPath::new(node, self.id.clone())
    }

    /// Attributes whose key carries the binding prefix.
    pub fn binding_attributes<'a>(
        &'a self,
        prefix: &'a str,
    ) -> impl Iterator<Item = (&'a String, &'a String)> + 'a {
        self.attributes
            .iter()
            .filter(move |(key, _)| key.starts_with(prefix))
    }

    /// Attributes whose key does not carry the binding prefix.
    pub fn plain_attributes<'a>(
        &'a self,
        prefix: &'a str,
    ) -> impl Iterator<Item = (&'a String, &'a String)> + 'a {
        self.attributes
            .iter()
            .filter(move |(key, _)| !key.starts_with(prefix))
    }
}
