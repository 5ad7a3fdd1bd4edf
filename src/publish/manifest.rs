//! Unit manifest read by downstream sync consumers.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::PublishError;
use crate::unit::ContentUnit;

/// File name of the manifest inside a published tree.
pub const MANIFEST_FILE_NAME: &str = "manifest.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    pub repo_id: String,
    pub unit_count: usize,
    pub units: Vec<ContentUnit>,
}

impl Manifest {
    pub fn new(repo_id: impl Into<String>, units: Vec<ContentUnit>) -> Self {
        Self {
            repo_id: repo_id.into(),
            unit_count: units.len(),
            units,
        }
    }

    /// Write `dir/manifest.json` through a temporary file and a rename.
    pub fn write(&self, dir: &Path) -> Result<PathBuf, PublishError> {
        let path = dir.join(MANIFEST_FILE_NAME);
        let staging = dir.join(format!(".{MANIFEST_FILE_NAME}.tmp"));
        let io_err = |source| PublishError::Manifest {
            path: path.clone(),
            source,
        };

        let json = serde_json::to_vec_pretty(self)?;
        fs::write(&staging, json).map_err(io_err)?;
        fs::rename(&staging, &path).map_err(io_err)?;
        Ok(path)
    }

    pub fn read(path: &Path) -> Result<Self, PublishError> {
        let content = fs::read(path).map_err(|source| PublishError::Manifest {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(serde_json::from_slice(&content)?)
    }
}
