//! `[publish]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [publish]
//! root = "/var/lib/pubtree/published"
//! workers = 8                          # Optional, rayon's default otherwise
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::config::{ConfigDiagnostics, FieldPath};
use crate::utils::path::resolve_path;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PublishConfig {
    /// Directory under which public links are created.
    pub root: PathBuf,

    /// Size of the linking thread pool.
    pub workers: Option<usize>,
}

pub struct PublishFields {
    pub root: FieldPath,
    pub workers: FieldPath,
}

impl PublishConfig {
    pub const FIELDS: PublishFields = PublishFields {
        root: FieldPath::new("publish.root"),
        workers: FieldPath::new("publish.workers"),
    };

    pub fn normalize(&mut self, root: &Path) {
        if !self.root.as_os_str().is_empty() {
            self.root = resolve_path(&self.root, root);
        }
    }

    /// # Checks
    /// - `workers` is greater than zero
    /// - `root` is an existing directory, unless `[http]` supplies the root
    pub fn validate(&self, needs_root: bool, diag: &mut ConfigDiagnostics) {
        let fields = Self::FIELDS;
        if self.workers == Some(0) {
            diag.error(fields.workers, format!("{} must be greater than 0", fields.workers));
        }
        if needs_root {
            check_dir(fields.root, &self.root, diag);
        }
    }
}

/// Record an error unless `path` is an existing directory.
pub(super) fn check_dir(field: FieldPath, path: &Path, diag: &mut ConfigDiagnostics) {
    if path.as_os_str().is_empty() {
        diag.error(field, format!("{field} is required"));
    } else if !path.exists() {
        diag.error_with_hint(
            field,
            format!("{field} not found: {}", path.display()),
            "create the directory first",
        );
    } else if !path.is_dir() {
        diag.error(field, format!("{field} is not a directory: {}", path.display()));
    }
}
