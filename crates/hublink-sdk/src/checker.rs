//! Checks adaptation scripts before they are pushed.
//!
//! Wraps the script parser, order validator, and dependency graph into a
//! high-level API for SDK consumers.

use std::path::Path;

use hublink_common::error::{HublinkError, Result};
use hublink_model::view::ModelView;
use hublink_script::graph::reorder;
use hublink_script::parser::validator;
use hublink_script::script::Script;

/// A parsed script ready to be checked against a model.
#[derive(Debug, Clone, Default)]
pub struct ScriptChecker {
    script: Script,
}

impl ScriptChecker {
    /// Parses script text.
    ///
    /// # Errors
    ///
    /// Returns [`HublinkError::InvalidScript`] for the first bad line.
    pub fn parse(text: &str) -> Result<Self> {
        Ok(Self {
            script: Script::parse(text)?,
        })
    }

    /// Loads and parses a script file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        tracing::info!(path = %path.display(), "loading script");
        let text = std::fs::read_to_string(path).map_err(|e| HublinkError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse(&text)
    }

    /// The parsed script.
    #[must_use]
    pub const fn script(&self) -> &Script {
        &self.script
    }

    /// Checks the script against a model.
    ///
    /// # Errors
    ///
    /// Returns [`HublinkError::InvalidScript`] naming the first line that
    /// would not apply.
    pub fn check<V: ModelView + ?Sized>(&self, view: &V) -> Result<()> {
        validator::validate(&self.script, view)
    }

    /// The script with every operation moved after the operations that
    /// create its targets, keeping the written order otherwise.
    #[must_use]
    pub fn ordered(&self) -> Script {
        reorder(&self.script)
    }
}

impl From<Script> for ScriptChecker {
    fn from(script: Script) -> Self {
        Self { script }
    }
}
