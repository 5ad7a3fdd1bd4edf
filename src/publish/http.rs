//! HTTP publisher: a content tree decorated with download urls.
//!
//! Wraps a [`ContentTreePublisher`] rooted at the alias directory. After the
//! units are linked, each one gets `metadata._download.url`, and the manifest
//! listing them is written into the tree before the public swap.
//!
//! The tree is always exposed at `<alias dir>/<repo_id>`, so the manifest
//! sits where [`HttpPublisher::manifest_path`] says. A `relative_url` only
//! applies to plain tree publishing. The manifest name is reserved: a unit
//! resolving to it gets a unit error.
//!
//! ```text
//! alias   = ("/pulp/repos", "/var/www/pub")
//! unit    = /var/www/pub/zoo/a/pkg.rpm
//! url     = https://cdn.example.com/pulp/repos/zoo/a/pkg.rpm
//! ```

use std::borrow::Cow;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use url::Url;

use super::manifest::{MANIFEST_FILE_NAME, Manifest};
use super::tree::{ContentTreePublisher, LinkedUnit, Repository};
use super::{PublishError, PublishReport};
use crate::unit::ContentUnit;
use crate::utils::url::join_url;

/// Metadata key holding download information.
pub const DOWNLOAD_KEY: &str = "_download";

/// Web server alias: url prefix served from a filesystem directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alias {
    pub url_prefix: String,
    pub dir: PathBuf,
}

impl Alias {
    pub fn new(url_prefix: impl Into<String>, dir: impl Into<PathBuf>) -> Self {
        Self {
            url_prefix: url_prefix.into(),
            dir: dir.into(),
        }
    }
}

pub struct HttpPublisher {
    base_url: Url,
    alias: Alias,
    repo_id: String,
    tree: ContentTreePublisher,
}

impl HttpPublisher {
    pub fn new(base_url: &str, alias: Alias, repo_id: impl Into<String>) -> Result<Self, PublishError> {
        let invalid = |reason: String| PublishError::BaseUrl {
            url: base_url.to_string(),
            reason,
        };
        let base_url = Url::parse(base_url).map_err(|e| invalid(e.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(invalid("url cannot carry a path".to_string()));
        }

        let tree = ContentTreePublisher::new(&alias.dir).with_reserved(MANIFEST_FILE_NAME);
        Ok(Self {
            base_url,
            alias,
            repo_id: repo_id.into(),
            tree,
        })
    }

    /// Swap in a configured tree publisher (workers, progress).
    ///
    /// Its publish root is replaced by the alias directory.
    pub fn with_tree<F>(mut self, configure: F) -> Result<Self, PublishError>
    where
        F: FnOnce(ContentTreePublisher) -> Result<ContentTreePublisher, PublishError>,
    {
        self.tree = configure(ContentTreePublisher::new(&self.alias.dir))?
            .with_reserved(MANIFEST_FILE_NAME);
        Ok(self)
    }

    pub fn tree(&self) -> &ContentTreePublisher {
        &self.tree
    }

    pub fn alias(&self) -> &Alias {
        &self.alias
    }

    /// Link one unit and attach its download url.
    ///
    /// The returned path is relative to the alias directory. When the unit
    /// cannot be linked it comes back undecorated with `None`.
    pub fn link_unit(&self, unit: &ContentUnit, repo: &Repository) -> (ContentUnit, Option<PathBuf>) {
        let mut unit = unit.clone();
        let linked = match self.served_repo(repo) {
            Ok(served) => self.tree.link_unit(&unit, &served).map_err(|e| e.to_string()),
            Err(e) => Err(e.to_string()),
        };
        let relative = match linked {
            Ok(path) => self.served_path(&path),
            Err(e) => {
                crate::debug!("link"; "{}: {}", unit.identity(), e);
                return (unit, None);
            }
        };
        self.decorate(&mut unit, &relative);
        (unit, Some(relative))
    }

    /// Publish the tree, decorate linked units and write the manifest.
    pub fn publish(&self, repo: &Repository, units: &[ContentUnit]) -> PublishReport {
        match self.served_repo(repo) {
            Ok(served) => self
                .tree
                .publish_with(&served, units, |repo, linked| self.write_manifest(repo, linked)),
            Err(err) => {
                crate::log!("error"; "publish of `{}` aborted: {}", repo.id, err);
                PublishReport::fatal(self.alias.dir.join(&self.repo_id), &err)
            }
        }
    }

    /// The repository as served: this publisher's repo, at `<alias dir>/<repo_id>`.
    fn served_repo(&self, repo: &Repository) -> Result<Repository, PublishError> {
        if repo.id != self.repo_id {
            return Err(PublishError::RepoMismatch {
                expected: self.repo_id.clone(),
                found: repo.id.clone(),
            });
        }
        Ok(Repository {
            relative_url: None,
            ..repo.clone()
        })
    }

    /// `<url_prefix>/<repo_id>/manifest.json`, the path part of the manifest url.
    pub fn manifest_path(&self) -> String {
        join_url(&[&self.alias.url_prefix, &self.repo_id, MANIFEST_FILE_NAME])
    }

    /// Absolute manifest url.
    pub fn manifest_url(&self) -> String {
        self.url_for(self.manifest_path().split('/'))
    }

    /// Download url for a path relative to the alias directory.
    ///
    /// Non-UTF-8 components are converted lossily.
    pub fn unit_url(&self, relative: &Path) -> String {
        let prefix = self.alias.url_prefix.split('/').map(Cow::Borrowed);
        let rest = relative.iter().map(|part| part.to_string_lossy());
        self.url_for(prefix.chain(rest))
    }

    fn url_for<S: AsRef<str>>(&self, segments: impl IntoIterator<Item = S>) -> String {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(
                segments
                    .into_iter()
                    .filter(|segment| !segment.as_ref().is_empty()),
            );
        }
        url.to_string()
    }

    /// Path of a unit link relative to the alias directory.
    fn served_path(&self, relative: &Path) -> PathBuf {
        Path::new(&self.repo_id).join(relative)
    }

    fn decorate(&self, unit: &mut ContentUnit, served: &Path) {
        let url = self.unit_url(served);
        match unit.metadata.get_mut(DOWNLOAD_KEY) {
            Some(Value::Object(download)) => {
                download.insert("url".to_string(), Value::String(url));
            }
            _ => {
                unit.metadata
                    .insert(DOWNLOAD_KEY.to_string(), json!({ "url": url }));
            }
        }
    }

    fn write_manifest(&self, repo: &Repository, linked: &[LinkedUnit<'_>]) -> Result<(), PublishError> {
        let units = linked
            .iter()
            .map(|l| {
                let mut unit = l.unit.clone();
                self.decorate(&mut unit, &self.served_path(l.relative_path));
                unit
            })
            .collect();
        let path = Manifest::new(&self.repo_id, units).write(&repo.working_dir)?;
        crate::debug!("manifest"; "{} ({})", path.display(), self.manifest_url());
        Ok(())
    }
}
