//! Publisher configuration management for `pubtree.toml`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section/       # Configuration section definitions
//! │   ├── repo       # [repo]
//! │   ├── publish    # [publish]
//! │   └── http       # [http]
//! ├── types/         # Utility types
//! │   ├── error      # ConfigError, ConfigDiagnostics
//! │   └── field      # FieldPath
//! └── mod.rs         # PubtreeConfig (this file)
//! ```
//!
//! Relative paths are resolved against the directory holding the config
//! file. Unknown keys are validation errors, so a misspelled key never
//! silently falls back to a default.

pub mod section;
pub mod types;
mod util;

pub use section::{HttpConfig, PublishConfig, RepoConfig};
pub use types::{ConfigDiagnostic, ConfigDiagnostics, ConfigError, FieldPath};

use util::find_config_file;

use crate::publish::Repository;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Default config file name.
pub const CONFIG_FILE_NAME: &str = "pubtree.toml";

// ============================================================================
// root configuration
// ============================================================================

/// Root configuration structure representing pubtree.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PubtreeConfig {
    /// Absolute path to the config file (internal use only)
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Parent directory of the config file (internal use only)
    #[serde(skip)]
    pub root: PathBuf,

    pub repo: RepoConfig,

    pub publish: PublishConfig,

    /// HTTP serving; switches publishing to the HTTP publisher.
    pub http: Option<HttpConfig>,
}

impl PubtreeConfig {
    /// Find, parse and validate the config file.
    ///
    /// A relative `config` is searched upward from the current directory.
    pub fn load(config: &Path) -> Result<Self> {
        let config_path = find_config_file(config).with_context(|| {
            format!("config file `{}` not found", config.display())
        })?;

        let mut config = Self::from_path(&config_path)?;
        config.finalize(config_path);
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        Ok(config)
    }

    /// Load configuration from file path; unknown fields are errors.
    fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)?;

        if !ignored.is_empty() {
            let mut diag = ConfigDiagnostics::new();
            for field in &ignored {
                diag.unknown_field(field);
            }
            return Err(ConfigError::Diagnostics(diag))
                .with_context(|| format!("unknown fields in `{}`", path.display()));
        }

        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>), ConfigError> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })?;
        Ok((config, ignored))
    }

    /// Set internal paths and resolve configured ones against the root.
    fn finalize(&mut self, config_path: PathBuf) {
        self.config_path = crate::utils::path::normalize_path(&config_path);
        self.root = self
            .config_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();

        let root = self.root.clone();
        self.repo.normalize(&root);
        self.publish.normalize(&root);
        if let Some(http) = self.http.as_mut() {
            http.normalize(&root);
        }
    }

    // ========================================================================
    // accessors
    // ========================================================================

    /// Directory the public link is created under.
    pub fn publish_root(&self) -> &Path {
        match &self.http {
            Some(http) => &http.dir,
            None => &self.publish.root,
        }
    }

    /// The configured repository, as handed to a publisher.
    pub fn repository(&self) -> Repository {
        self.repo.repository()
    }

    // ========================================================================
    // validation
    // ========================================================================

    /// Validate every section.
    ///
    /// Collects all validation errors and returns them at once.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut diag = ConfigDiagnostics::new();

        self.repo.validate(&mut diag);
        self.publish.validate(self.http.is_none(), &mut diag);
        if let Some(http) = &self.http {
            http.validate(&mut diag);
        }

        diag.into_result().map_err(ConfigError::Diagnostics)
    }
}

// ============================================================================
// tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_config(dir: &TempDir, content: &str) -> PathBuf {
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_from_str_invalid_toml() {
        let result = PubtreeConfig::from_str("[repo\nid = \"zoo\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_load_resolves_paths() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("published")).unwrap();
        let path = write_config(
            &dir,
            r#"
[repo]
id = "zoo"
working_dir = "working/zoo"
relative_url = "pub/zoo"

[publish]
root = "published"
workers = 4
"#,
        );

        let config = PubtreeConfig::load(&path).unwrap();
        assert_eq!(config.root, dir.path());
        assert_eq!(config.publish_root(), dir.path().join("published"));
        assert_eq!(config.publish.workers, Some(4));

        let repo = config.repository();
        assert_eq!(repo.working_dir, dir.path().join("working/zoo"));
        assert_eq!(repo.namespace(), ["pub", "zoo"]);
    }

    #[test]
    fn test_unknown_fields_rejected() {
        let dir = TempDir::new().unwrap();
        let path = write_config(
            &dir,
            "[repo]\nid = \"zoo\"\nworking_dir = \"w\"\n[publish]\nroot = \".\"\nwokers = 3\n",
        );

        let err = PubtreeConfig::load(&path).unwrap_err();
        let diag = match err.downcast_ref::<ConfigError>() {
            Some(ConfigError::Diagnostics(diag)) => diag,
            other => panic!("unexpected error: {other:?}"),
        };
        assert_eq!(diag.errors()[0].field, "publish.wokers");
    }

    #[test]
    fn test_no_unknown_fields() {
        let content = "[repo]\nid = \"zoo\"\n[http]\nbase_url = \"https://a\"\n";
        let (config, ignored) = PubtreeConfig::parse_with_ignored(content).unwrap();
        assert!(ignored.is_empty());
        assert!(config.http.is_some());
    }

    #[test]
    fn test_missing_publish_root() {
        let dir = TempDir::new().unwrap();
        let path = write_config(
            &dir,
            "[repo]\nid = \"zoo\"\nworking_dir = \"w\"\n[publish]\nroot = \"missing\"\n",
        );

        let err = PubtreeConfig::load(&path).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ConfigError>(),
            Some(ConfigError::Diagnostics(diag)) if diag.errors()[0].field == "publish.root"
        ));
    }

    #[test]
    fn test_http_dir_replaces_publish_root() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("www")).unwrap();
        let path = write_config(
            &dir,
            r#"
[repo]
id = "zoo"
working_dir = "w"

[http]
base_url = "https://cdn.example.com"
url_prefix = "/pulp/repos"
dir = "www"
"#,
        );

        let config = PubtreeConfig::load(&path).unwrap();
        assert_eq!(config.publish_root(), dir.path().join("www"));
    }

    #[test]
    fn test_config_not_found() {
        let dir = TempDir::new().unwrap();
        let result = PubtreeConfig::load(&dir.path().join(CONFIG_FILE_NAME));
        assert!(result.unwrap_err().to_string().contains("not found"));
    }
}
