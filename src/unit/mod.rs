//! Content units handed over by the importer.
//!
//! - [`ContentUnit`]: one piece of content with its key, metadata and backing file
//! - [`resolve`]: relative publish path derivation

mod resolve;

pub use resolve::{FILENAME_KEY, ResolveError, resolve};

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Free-form field mapping used for unit keys and metadata.
pub type Fields = Map<String, Value>;

/// A content unit backed by a file on local storage.
///
/// The storage layer owns `storage_path`; the publish engine only links to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentUnit {
    pub type_id: String,
    #[serde(default)]
    pub unit_key: Fields,
    #[serde(default)]
    pub metadata: Fields,
    pub storage_path: PathBuf,
}

impl ContentUnit {
    pub fn new(type_id: impl Into<String>, storage_path: impl Into<PathBuf>) -> Self {
        Self {
            type_id: type_id.into(),
            unit_key: Fields::new(),
            metadata: Fields::new(),
            storage_path: storage_path.into(),
        }
    }

    /// Builder-style helper for a unit key field.
    pub fn with_key(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.unit_key.insert(name.to_string(), value.into());
        self
    }

    /// Builder-style helper for a metadata field.
    pub fn with_meta(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.metadata.insert(name.to_string(), value.into());
        self
    }

    /// Non-empty string metadata value.
    pub fn meta_str(&self, name: &str) -> Option<&str> {
        non_empty_str(self.metadata.get(name))
    }

    /// Non-empty string unit key value.
    pub fn key_str(&self, name: &str) -> Option<&str> {
        non_empty_str(self.unit_key.get(name))
    }

    /// Short identity for log lines: `type_id:{key}`.
    pub fn identity(&self) -> String {
        format!("{}:{}", self.type_id, Value::Object(self.unit_key.clone()))
    }
}

fn non_empty_str(value: Option<&Value>) -> Option<&str> {
    value.and_then(Value::as_str).filter(|s| !s.is_empty())
}

/// Load a JSON array of units, as written by the importer.
pub fn load_units(path: &Path) -> Result<Vec<ContentUnit>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read units file `{}`", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("failed to parse units file `{}`", path.display()))
}
