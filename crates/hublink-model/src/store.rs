//! JSON persistence of model documents.
//!
//! Used by file-backed model services and by tests to load fixtures.

use std::path::Path;

use hublink_common::error::{HublinkError, Result};

use crate::model::ModelRoot;

/// Loads a model document from a JSON file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub fn load_model(path: &Path) -> Result<ModelRoot> {
    tracing::debug!(path = %path.display(), "loading model document");
    let text = std::fs::read_to_string(path).map_err(|e| HublinkError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(serde_json::from_str(&text)?)
}

/// Writes a model document to a JSON file, replacing it atomically.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn save_model(path: &Path, model: &ModelRoot) -> Result<()> {
    tracing::debug!(path = %path.display(), "saving model document");
    let text = serde_json::to_string_pretty(model)?;
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, text).map_err(|e| HublinkError::Io {
        path: tmp.clone(),
        source: e,
    })?;
    std::fs::rename(&tmp, path).map_err(|e| HublinkError::Io {
        path: path.to_path_buf(),
        source: e,
    })
}
