//! Plain data making up a model document.
//!
//! The live model is owned by the external model service. These types
//! are what a snapshot of it contains; nothing in this workspace mutates
//! them after a snapshot is taken.

use serde::{Deserialize, Serialize};

/// Root of a model document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelRoot {
    /// Execution nodes and the components they host.
    pub nodes: Vec<Node>,
    /// Top-level packages of the type namespace.
    pub packages: Vec<Package>,
    /// Channels relaying bindings between ports.
    pub hubs: Vec<Hub>,
}

/// An execution node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Node {
    /// Node name, unique in the model.
    pub name: String,
    /// Component instances running on this node.
    pub components: Vec<ComponentInstance>,
}

impl Node {
    /// Finds a component instance by id.
    #[must_use]
    pub fn find_component(&self, id: &str) -> Option<&ComponentInstance> {
        self.components.iter().find(|c| c.name == id)
    }
}

/// A running component instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentInstance {
    /// Instance id, unique within its node.
    pub name: String,
    /// Declared type name, possibly qualified and versioned.
    pub type_definition: String,
}

/// A namespace in the type tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Package {
    /// Single path segment naming this package.
    pub name: String,
    /// Nested packages.
    pub packages: Vec<Package>,
    /// Types declared directly in this package.
    pub type_definitions: Vec<TypeDefinition>,
}

impl Package {
    /// Finds a direct child package.
    #[must_use]
    pub fn find_package(&self, name: &str) -> Option<&Self> {
        self.packages.iter().find(|p| p.name == name)
    }

    /// Finds a type declared directly in this package by simple name.
    ///
    /// When several versions of the type are declared the last one wins.
    #[must_use]
    pub fn find_type_definition(&self, simple_name: &str) -> Option<&TypeDefinition> {
        self.type_definitions
            .iter()
            .rev()
            .find(|td| td.name == simple_name)
    }
}

/// Declarative metadata for a component type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TypeDefinition {
    /// Simple type name.
    pub name: String,
    /// Declared version.
    pub version: Option<String>,
    /// Attributes the type accepts.
    pub dictionary: Vec<DictionaryAttribute>,
}

/// An attribute declared by a type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DictionaryAttribute {
    /// Attribute name.
    pub name: String,
    /// Value used when a request does not provide one.
    #[serde(default)]
    pub default_value: Option<String>,
}

/// A channel instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hub {
    /// Channel id.
    pub name: String,
    /// Channel type, e.g. `AsyncBroadcast`.
    pub type_definition: String,
}
