//! File-backed model service.
//!
//! Reads the model from a JSON document and accepts scripts by writing
//! them into a spool directory, one file per script, for an external
//! applier to pick up. File names sort in submission order.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock};

use chrono::Utc;
use hublink_common::constants::SCRIPT_EXTENSION;
use hublink_common::error::{HublinkError, Result};
use hublink_model::snapshot::VersionedModel;
use hublink_model::store::load_model;

use crate::service::{ApplyCallback, ModelService};

/// Model service over a model file and a spool directory.
#[derive(Debug)]
pub struct SpoolModelService {
    model_path: PathBuf,
    spool_dir: PathBuf,
    current: RwLock<VersionedModel>,
    sequence: AtomicU64,
}

impl SpoolModelService {
    /// Loads the model. The spool directory is created on first submission.
    ///
    /// # Errors
    ///
    /// Returns an error if the model cannot be loaded.
    pub fn open(model_path: &Path, spool_dir: &Path) -> Result<Self> {
        let model = load_model(model_path)?;
        tracing::info!(
            model = %model_path.display(),
            spool = %spool_dir.display(),
            nodes = model.nodes.len(),
            "spool model service ready"
        );
        Ok(Self {
            model_path: model_path.to_path_buf(),
            spool_dir: spool_dir.to_path_buf(),
            current: RwLock::new(VersionedModel::new(model)),
            sequence: AtomicU64::new(0),
        })
    }

    /// Re-reads the model file and publishes it under a new version.
    ///
    /// # Errors
    ///
    /// Returns an error if the model cannot be loaded. The previous model
    /// stays current in that case.
    pub fn reload(&self) -> Result<()> {
        let model = load_model(&self.model_path)?;
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = VersionedModel::new(model);
        Ok(())
    }

    /// Directory scripts are written to.
    #[must_use]
    pub fn spool_dir(&self) -> &Path {
        &self.spool_dir
    }

    /// Spooled script files, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the spool directory cannot be read.
    pub fn spooled(&self) -> Result<Vec<PathBuf>> {
        let io_err = |e| HublinkError::Io {
            path: self.spool_dir.clone(),
            source: e,
        };
        let mut files = Vec::new();
        if !self.spool_dir.exists() {
            return Ok(files);
        }
        for entry in std::fs::read_dir(&self.spool_dir).map_err(io_err)? {
            let path = entry.map_err(io_err)?.path();
            if path.extension().is_some_and(|ext| ext == SCRIPT_EXTENSION) {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }

    fn write_script(&self, script: &str) -> Result<PathBuf> {
        let stem = format!(
            "{}-{:06}-{}",
            Utc::now().format("%Y%m%dT%H%M%S%.6f"),
            self.sequence.fetch_add(1, Ordering::Relaxed),
            uuid::Uuid::new_v4().simple()
        );
        std::fs::create_dir_all(&self.spool_dir).map_err(|e| HublinkError::Io {
            path: self.spool_dir.clone(),
            source: e,
        })?;
        let path = self.spool_dir.join(format!("{stem}.{SCRIPT_EXTENSION}"));
        let tmp = self.spool_dir.join(format!("{stem}.tmp"));
        std::fs::write(&tmp, script).map_err(|e| HublinkError::Io {
            path: tmp.clone(),
            source: e,
        })?;
        std::fs::rename(&tmp, &path).map_err(|e| HublinkError::Io {
            path: path.clone(),
            source: e,
        })?;
        Ok(path)
    }
}

impl ModelService for SpoolModelService {
    fn current_model(&self) -> VersionedModel {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn submit_script(&self, script: String, on_complete: ApplyCallback) {
        match self.write_script(&script) {
            Ok(path) => {
                tracing::debug!(path = %path.display(), "script spooled");
                on_complete(true);
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to spool script");
                on_complete(false);
            }
        }
    }
}
