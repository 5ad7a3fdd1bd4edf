//! Relative url namespace - conflict checking between sibling repositories.
//!
//! Each repository publishes under a relative url (or its id when none is
//! configured). Two repositories may not claim the same namespace, and one
//! may not be nested inside another: both would collide on disk.
//!
//! ```text
//! related repos                 trie
//! =============                 ====
//! repo_a  /abc/de/fg/    ->     abc ─ de ─┬─ fg  [repo_a]
//! repo_b  /abc/de/kj/    ->               └─ kj  [repo_b]
//! repo_d  (none)         ->     repo_d [repo_d]
//! ```
//!
//! - [`trie`]: the segment trie and [`ConflictError`]

mod trie;

pub use trie::{ConflictError, ConflictKind, Leaf, NamespaceTrie};

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A namespace segment that would resolve outside the publish root.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Relative url '{url}' for repo '{repo_id}' contains a '{segment}' segment")]
pub struct UnsafeUrlError {
    pub repo_id: String,
    pub url: String,
    pub segment: String,
}

/// Why a candidate namespace was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NamespaceError {
    #[error(transparent)]
    Conflict(#[from] ConflictError),

    #[error(transparent)]
    Unsafe(#[from] UnsafeUrlError),
}

/// A sibling repository as seen by namespace validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelatedRepository {
    pub id: String,
    #[serde(default)]
    pub relative_url: Option<String>,
}

impl RelatedRepository {
    pub fn new(id: impl Into<String>, relative_url: Option<&str>) -> Self {
        Self {
            id: id.into(),
            relative_url: relative_url.map(str::to_string),
        }
    }
}

/// A repository id with its normalized namespace segments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelativeUrlEntry {
    pub repo_id: String,
    /// Configured url, or the repository id when none was set.
    pub url: String,
    pub segments: Vec<String>,
}

impl RelativeUrlEntry {
    pub fn new(repo_id: &str, url: Option<&str>) -> Self {
        let url = url.filter(|u| !u.is_empty()).unwrap_or(repo_id);
        Self {
            repo_id: repo_id.to_string(),
            url: url.to_string(),
            segments: normalize(Some(url), repo_id),
        }
    }
}

impl RelativeUrlEntry {
    /// Reject `.` and `..` segments.
    ///
    /// Such a namespace would leave the publish root, or alias another
    /// namespace on disk while looking distinct in the trie.
    pub fn ensure_safe(&self) -> Result<(), UnsafeUrlError> {
        // A fallback id is one segment and may still carry `/`
        let mut parts = self.segments.iter().flat_map(|s| s.split('/'));
        match parts.find(|part| matches!(*part, "." | "..")) {
            Some(segment) => Err(UnsafeUrlError {
                repo_id: self.repo_id.clone(),
                url: self.url.clone(),
                segment: segment.to_string(),
            }),
            None => Ok(()),
        }
    }
}

impl From<&RelatedRepository> for RelativeUrlEntry {
    fn from(repo: &RelatedRepository) -> Self {
        Self::new(&repo.id, repo.relative_url.as_deref())
    }
}

/// Split a relative url into namespace segments.
///
/// Leading, trailing and repeated `/` are ignored. An absent or empty url
/// falls back to `[fallback_id]`.
///
/// | input            | segments            |
/// |------------------|---------------------|
/// | `/a/bcde/f/`     | `a`, `bcde`, `f`    |
/// | `a//b`           | `a`, `b`            |
/// | `""` / `None`    | `fallback_id`       |
pub fn normalize(url: Option<&str>, fallback_id: &str) -> Vec<String> {
    let segments: Vec<String> = url
        .unwrap_or_default()
        .split('/')
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
        .collect();

    if segments.is_empty() {
        vec![fallback_id.to_string()]
    } else {
        segments
    }
}

/// Outcome of validating a candidate namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Validation {
    pub ok: bool,
    pub message: Option<String>,
}

impl Validation {
    fn accepted() -> Self {
        Self {
            ok: true,
            message: None,
        }
    }

    fn rejected(err: &NamespaceError) -> Self {
        Self {
            ok: false,
            message: Some(err.to_string()),
        }
    }
}

/// Check a candidate relative url against its related repositories.
///
/// Entries with the candidate's own id are skipped, so re-validating an
/// existing repository does not conflict with itself. Any entry with a
/// `.` or `..` segment, the candidate's or a sibling's, is rejected.
pub fn check(
    candidate_id: &str,
    candidate_url: Option<&str>,
    related: &[RelatedRepository],
) -> Result<(), NamespaceError> {
    let candidate = RelativeUrlEntry::new(candidate_id, candidate_url);
    candidate.ensure_safe()?;

    let mut trie = NamespaceTrie::new();
    for repo in related.iter().filter(|repo| repo.id != candidate_id) {
        let entry = RelativeUrlEntry::from(repo);
        entry.ensure_safe()?;
        trie.insert(&entry)?;
    }
    trie.insert(&candidate)?;
    Ok(())
}

/// [`check`] reduced to an accept flag and a human-readable message.
pub fn validate(
    candidate_id: &str,
    candidate_url: Option<&str>,
    related: &[RelatedRepository],
) -> Validation {
    match check(candidate_id, candidate_url, related) {
        Ok(()) => Validation::accepted(),
        Err(err) => {
            if let NamespaceError::Conflict(conflict) = &err {
                crate::debug!("validate"; "{}", conflict.kind);
            }
            Validation::rejected(&err)
        }
    }
}

/// Load a JSON array of related repositories.
pub fn load_related(path: &Path) -> Result<Vec<RelatedRepository>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read related repositories `{}`", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("failed to parse related repositories `{}`", path.display()))
}
