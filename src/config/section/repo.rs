//! `[repo]` section configuration.
//!
//! The repository being published.
//!
//! # Example
//!
//! ```toml
//! [repo]
//! id = "zoo"
//! working_dir = "working/zoo"   # Relative to the config file
//! relative_url = "pub/zoo"      # Optional, defaults to id
//! protected = false
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::config::util::unsafe_segment;
use crate::config::{ConfigDiagnostics, FieldPath};
use crate::publish::Repository;
use crate::utils::path::resolve_path;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepoConfig {
    /// Repository id; also the namespace when `relative_url` is unset.
    pub id: String,

    /// Directory holding the unit links.
    pub working_dir: PathBuf,

    /// Publish prefix below the publish root.
    pub relative_url: Option<String>,

    /// Passed through to the serving layer.
    pub protected: bool,
}

pub struct RepoFields {
    pub id: FieldPath,
    pub working_dir: FieldPath,
    pub relative_url: FieldPath,
}

impl RepoConfig {
    pub const FIELDS: RepoFields = RepoFields {
        id: FieldPath::new("repo.id"),
        working_dir: FieldPath::new("repo.working_dir"),
        relative_url: FieldPath::new("repo.relative_url"),
    };

    pub fn normalize(&mut self, root: &Path) {
        if !self.working_dir.as_os_str().is_empty() {
            self.working_dir = resolve_path(&self.working_dir, root);
        }
    }

    /// # Checks
    /// - `id` is non-empty, without `.` or `..` segments
    /// - `working_dir` is set
    /// - `relative_url` has no `.` or `..` segment
    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        let fields = Self::FIELDS;
        if self.id.trim().is_empty() {
            diag.error(fields.id, format!("{} must not be empty", fields.id));
        } else if let Some(segment) = unsafe_segment(&self.id) {
            // The id doubles as the namespace when relative_url is unset
            diag.error(fields.id, format!("{} contains a `{segment}` segment", fields.id));
        }
        if self.working_dir.as_os_str().is_empty() {
            diag.error_with_hint(
                fields.working_dir,
                format!("{} is required", fields.working_dir),
                "point it at a directory owned by this repository",
            );
        }
        if let Some(segment) = self.relative_url.as_deref().and_then(unsafe_segment) {
            diag.error(
                fields.relative_url,
                format!("{} contains a `{segment}` segment", fields.relative_url),
            );
        }
    }

    pub fn repository(&self) -> Repository {
        Repository {
            id: self.id.clone(),
            working_dir: self.working_dir.clone(),
            relative_url: self.relative_url.clone(),
            protected: self.protected,
        }
    }
}
