//! Domain primitive types used across the hublink workspace.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::CHANNEL_ID_PREFIX;

/// Fully-qualified address of a component instance: `<node>.<id>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ComponentPath {
    /// Node the component runs on.
    pub node: String,
    /// Component instance id, unique within its node.
    pub id: String,
}

impl ComponentPath {
    /// Creates a path from a node name and a component id.
    #[must_use]
    pub fn new(node: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            node: node.into(),
            id: id.into(),
        }
    }

    /// Returns the path of one of this component's ports or attributes.
    #[must_use]
    pub fn member(&self, name: &str) -> String {
        format!("{self}.{name}")
    }
}

impl fmt::Display for ComponentPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.node, self.id)
    }
}

/// Identifier of a broadcast channel relaying a binding.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChannelId(String);

impl ChannelId {
    /// Wraps an existing channel identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Derives the channel id for a binding: `chan_<port>_<node>_<component>`.
    ///
    /// The result only depends on its three inputs, so every binding that
    /// targets the same destination port from the same node shares a channel.
    #[must_use]
    pub fn derive(dest_port: &str, local_node: &str, dest_component: &str) -> Self {
        Self(format!(
            "{CHANNEL_ID_PREFIX}_{dest_port}_{local_node}_{dest_component}"
        ))
    }

    /// Returns the inner string representation.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Correlates the events and logs produced by one inbound request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestId(uuid::Uuid);

impl RequestId {
    /// Generates a random request ID.
    #[must_use]
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4())
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &uuid::Uuid {
        &self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identity of whoever issued a request, carried for logging only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequesterInfo {
    /// User or service name.
    pub name: String,
    /// Optional household or tenant the requester acts for.
    pub household: Option<String>,
}
