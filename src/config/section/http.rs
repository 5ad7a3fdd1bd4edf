//! `[http]` section configuration.
//!
//! Present only when the repository is served over HTTP. Units then get
//! download urls and a manifest is published next to them.
//!
//! # Example
//!
//! ```toml
//! [http]
//! base_url = "https://cdn.example.com"
//! url_prefix = "/pulp/repos"
//! dir = "/var/www/pub"              # Filesystem root served at url_prefix
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

use super::publish::check_dir;
use crate::config::{ConfigDiagnostics, FieldPath};
use crate::publish::Alias;
use crate::utils::path::resolve_path;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub base_url: String,
    pub url_prefix: String,
    pub dir: PathBuf,
}

pub struct HttpFields {
    pub base_url: FieldPath,
    pub dir: FieldPath,
}

impl HttpConfig {
    pub const FIELDS: HttpFields = HttpFields {
        base_url: FieldPath::new("http.base_url"),
        dir: FieldPath::new("http.dir"),
    };

    pub fn normalize(&mut self, root: &Path) {
        if !self.dir.as_os_str().is_empty() {
            self.dir = resolve_path(&self.dir, root);
        }
    }

    /// # Checks
    /// - `base_url` parses and can carry a path
    /// - `dir` is an existing directory
    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        let fields = Self::FIELDS;
        match Url::parse(&self.base_url) {
            Ok(url) if url.cannot_be_a_base() => diag.error(
                fields.base_url,
                format!("{} cannot carry a path: {}", fields.base_url, self.base_url),
            ),
            Ok(_) => {}
            Err(e) => diag.error_with_hint(
                fields.base_url,
                format!("{} is not a valid url: {e}", fields.base_url),
                "use an absolute url such as `https://cdn.example.com`",
            ),
        }
        check_dir(fields.dir, &self.dir, diag);
    }

    pub fn alias(&self) -> Alias {
        Alias::new(&self.url_prefix, &self.dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_validate_base_url() {
        let dir = TempDir::new().unwrap();
        let mut config = HttpConfig {
            base_url: "cdn.example.com".into(),
            url_prefix: "/pub".into(),
            dir: dir.path().to_path_buf(),
        };
        let mut diag = ConfigDiagnostics::new();
        config.validate(&mut diag);
        assert_eq!(diag.len(), 1);
        assert_eq!(diag.errors()[0].field, "http.base_url");

        config.base_url = "https://cdn.example.com".into();
        let mut diag = ConfigDiagnostics::new();
        config.validate(&mut diag);
        assert!(diag.is_empty());
    }

    #[test]
    fn test_alias() {
        let config = HttpConfig {
            base_url: String::new(),
            url_prefix: "/pub".into(),
            dir: "/var/www".into(),
        };
        assert_eq!(config.alias(), Alias::new("/pub", "/var/www"));
    }
}
