//! Configuration model for the linker service.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constants;
use crate::error::{HublinkError, Result};

/// Root configuration for the linker service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkerConfig {
    /// Name of the node scripts are generated for.
    pub node_name: String,
    /// Type given to channels created for bindings.
    pub channel_type: String,
    /// Attribute key prefix marking binding specifications.
    pub binding_prefix: String,
    /// Human-readable description of the service.
    pub description: String,
    /// Request path the service answers on.
    pub src: String,
}

impl Default for LinkerConfig {
    fn default() -> Self {
        Self {
            node_name: constants::DEFAULT_NODE_NAME.to_string(),
            channel_type: constants::DEFAULT_CHANNEL_TYPE.to_string(),
            binding_prefix: constants::DEFAULT_BINDING_PREFIX.to_string(),
            description: constants::DEFAULT_DESCRIPTION.to_string(),
            src: constants::DEFAULT_SRC.to_string(),
        }
    }
}

impl LinkerConfig {
    /// Creates a default configuration bound to the given node.
    #[must_use]
    pub fn for_node(node_name: impl Into<String>) -> Self {
        Self {
            node_name: node_name.into(),
            ..Self::default()
        }
    }

    /// Parses a configuration from YAML text. Missing keys take defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid YAML for this model or
    /// fails [`LinkerConfig::validate`].
    pub fn from_yaml(text: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(text).map_err(|e| HublinkError::Config {
            message: format!("cannot parse linker configuration: {e}"),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Loads a configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        tracing::debug!(path = %path.display(), "loading linker configuration");
        let text = std::fs::read_to_string(path).map_err(|e| HublinkError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_yaml(&text)
    }

    /// Checks that identifiers used in generated scripts are usable.
    ///
    /// # Errors
    ///
    /// Returns an error if the node name or channel type is empty or
    /// contains characters that would break a script line.
    pub fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("node_name", &self.node_name),
            ("channel_type", &self.channel_type),
        ] {
            if value.is_empty() {
                return Err(HublinkError::Config {
                    message: format!("{field} must not be empty"),
                });
            }
            if value.chars().any(|c| c.is_whitespace() || c == '.') {
                return Err(HublinkError::Config {
                    message: format!("{field} \"{value}\" must not contain whitespace or '.'"),
                });
            }
        }
        if self.binding_prefix.is_empty() {
            return Err(HublinkError::Config {
                message: "binding_prefix must not be empty".into(),
            });
        }
        Ok(())
    }
}
