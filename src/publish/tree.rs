//! Content tree publisher.
//!
//! # Layout
//!
//! ```text
//! <publish_root>/rel_a/rel_b/rel_c  ->  <working_dir>        (public symlink)
//! <working_dir>/a/b/c/pkg-1.0.rpm   ->  <storage_path>       (one per unit)
//! ```
//!
//! # Phases
//!
//! 1. prepare: base directories (fatal on failure)
//! 2. link: every unit in parallel (failures recorded per unit)
//! 3. before-swap hook: decorators write into the staged tree
//! 4. swap: one atomic rename exposes the tree
//!
//! A failure in phase 1 reports zero units. A failure in phase 3 or 4 keeps
//! the unit counts and errors of phase 2, since those links are on disk.

use std::path::{Path, PathBuf};

use rayon::{ThreadPool, ThreadPoolBuilder};
use serde::{Deserialize, Serialize};

use super::fs::{create_dirs, ensure_swappable, swap_symlink};
use super::symlinks::{self, link_units, unit_errors};
use super::{LinkError, PublishError, PublishReport, UnitError};
use crate::logger::ProgressLine;
use crate::namespace::RelativeUrlEntry;
use crate::unit::ContentUnit;
use crate::{debug, log};

/// A repository as seen by the publisher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
    pub id: String,
    /// Directory holding the unit links; the public symlink points here.
    pub working_dir: PathBuf,
    #[serde(default)]
    pub relative_url: Option<String>,
    /// Passed through untouched for the serving layer.
    #[serde(default)]
    pub protected: bool,
}

impl Repository {
    pub fn new(id: impl Into<String>, working_dir: impl Into<PathBuf>) -> Self {
        Self {
            id: id.into(),
            working_dir: working_dir.into(),
            relative_url: None,
            protected: false,
        }
    }

    pub fn with_relative_url(mut self, url: impl Into<String>) -> Self {
        self.relative_url = Some(url.into());
        self
    }

    /// Namespace segments: the relative url, or the id when unset.
    pub fn namespace(&self) -> Vec<String> {
        self.namespace_entry().segments
    }

    pub fn namespace_entry(&self) -> RelativeUrlEntry {
        RelativeUrlEntry::new(&self.id, self.relative_url.as_deref())
    }
}

/// A unit that was linked successfully, with its path inside the tree.
#[derive(Debug, Clone, Copy)]
pub struct LinkedUnit<'a> {
    pub unit: &'a ContentUnit,
    pub relative_path: &'a Path,
}

/// Publishes repositories as symlink trees under `publish_root`.
pub struct ContentTreePublisher {
    publish_root: PathBuf,
    pool: Option<ThreadPool>,
    progress: bool,
    /// Paths inside the working tree that units may not claim.
    reserved: Vec<PathBuf>,
}

/// A publish stopped by a fatal error, with the report to hand out.
struct Aborted {
    error: PublishError,
    report: PublishReport,
}

impl Aborted {
    /// Stopped before any unit was linked.
    fn before_linking(repo_publish_dir: PathBuf, error: PublishError) -> Self {
        Self {
            report: PublishReport::fatal(repo_publish_dir, &error),
            error,
        }
    }
}

impl ContentTreePublisher {
    /// Publisher linking on rayon's global pool.
    pub fn new(publish_root: impl Into<PathBuf>) -> Self {
        Self {
            publish_root: publish_root.into(),
            pool: None,
            progress: false,
            reserved: Vec::new(),
        }
    }

    /// Link on a dedicated pool of `workers` threads.
    pub fn with_workers(mut self, workers: usize) -> Result<Self, PublishError> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("pubtree-link-{i}"))
            .build()?;
        self.pool = Some(pool);
        Ok(self)
    }

    /// Show a progress line while linking.
    pub fn with_progress(mut self, progress: bool) -> Self {
        self.progress = progress;
        self
    }

    /// Keep `path` (relative to the working tree) for the publisher's own files.
    pub fn with_reserved(mut self, path: impl Into<PathBuf>) -> Self {
        self.reserved.push(path.into());
        self
    }

    pub fn publish_root(&self) -> &Path {
        &self.publish_root
    }

    /// Where the repository becomes visible: `publish_root/<namespace...>`.
    ///
    /// Namespaces with `.` or `..` segments are refused.
    pub fn public_path(&self, repo: &Repository) -> Result<PathBuf, PublishError> {
        let entry = repo.namespace_entry();
        entry.ensure_safe()?;
        let mut path = self.publish_root.clone();
        path.extend(entry.segments);
        Ok(path)
    }

    /// Link a single unit into the repository's working tree.
    pub fn link_unit(&self, unit: &ContentUnit, repo: &Repository) -> Result<PathBuf, LinkError> {
        symlinks::link_unit(unit, &repo.working_dir, &self.reserved)
    }

    /// Link every unit under `target_dir` on this publisher's pool.
    pub fn handle_symlinks(&self, units: &[ContentUnit], target_dir: &Path) -> (bool, Vec<UnitError>) {
        self.install(|| symlinks::handle_symlinks(units, target_dir))
    }

    /// Publish `units` and expose them at the repository's public path.
    ///
    /// A fatal error is reported with `success_flag = false` and the
    /// previously published tree stays in place.
    pub fn publish(&self, repo: &Repository, units: &[ContentUnit]) -> PublishReport {
        self.publish_with(repo, units, |_, _| Ok(()))
    }

    /// Like [`publish`](Self::publish), but fatal errors are returned.
    pub fn try_publish(
        &self,
        repo: &Repository,
        units: &[ContentUnit],
    ) -> Result<PublishReport, PublishError> {
        self.try_publish_with(repo, units, |_, _| Ok(()))
    }

    /// Publish with a hook that runs after linking and before the swap.
    ///
    /// Anything the hook writes into `repo.working_dir` becomes visible in
    /// the same swap as the unit links. A hook error aborts the publish.
    pub fn publish_with<F>(&self, repo: &Repository, units: &[ContentUnit], before_swap: F) -> PublishReport
    where
        F: FnOnce(&Repository, &[LinkedUnit<'_>]) -> Result<(), PublishError>,
    {
        self.run(repo, units, before_swap).unwrap_or_else(|aborted| {
            log!("error"; "publish of `{}` aborted: {}", repo.id, aborted.error);
            aborted.report
        })
    }

    pub fn try_publish_with<F>(
        &self,
        repo: &Repository,
        units: &[ContentUnit],
        before_swap: F,
    ) -> Result<PublishReport, PublishError>
    where
        F: FnOnce(&Repository, &[LinkedUnit<'_>]) -> Result<(), PublishError>,
    {
        self.run(repo, units, before_swap)
            .map_err(|aborted| aborted.error)
    }

    fn run<F>(&self, repo: &Repository, units: &[ContentUnit], before_swap: F) -> Result<PublishReport, Aborted>
    where
        F: FnOnce(&Repository, &[LinkedUnit<'_>]) -> Result<(), PublishError>,
    {
        let public = self
            .public_path(repo)
            .map_err(|e| Aborted::before_linking(self.publish_root.clone(), e))?;
        self.prepare(repo, &public)
            .map_err(|e| Aborted::before_linking(public.clone(), e))?;

        let outcomes = {
            let progress = (self.progress && !units.is_empty())
                .then(|| ProgressLine::new(&[("units", units.len())]));
            let outcomes = self.install(|| {
                link_units(units, &repo.working_dir, &self.reserved, progress.as_ref())
            });
            if let Some(p) = progress {
                p.finish();
            }
            outcomes
        };
        let errors = unit_errors(units, &outcomes);

        let linked: Vec<LinkedUnit<'_>> = units
            .iter()
            .zip(&outcomes)
            .filter_map(|(unit, outcome)| {
                outcome.as_ref().ok().map(|relative_path| LinkedUnit {
                    unit,
                    relative_path: relative_path.as_path(),
                })
            })
            .collect();
        let report = PublishReport::new(public.clone(), units.len(), errors);

        match before_swap(repo, &linked).and_then(|()| swap_symlink(&repo.working_dir, &public)) {
            Ok(()) => {
                debug!("publish"; "{} -> {}", public.display(), repo.working_dir.display());
                Ok(report)
            }
            Err(error) => Err(Aborted {
                report: report.aborted(&error),
                error,
            }),
        }
    }

    /// Base directories for the working tree and the public link.
    fn prepare(&self, repo: &Repository, public: &Path) -> Result<(), PublishError> {
        create_dirs(&repo.working_dir).map_err(PublishError::Prepare)?;
        if let Some(parent) = public.parent() {
            create_dirs(parent).map_err(PublishError::Prepare)?;
        }
        ensure_swappable(public)
    }

    fn install<R, OP>(&self, op: OP) -> R
    where
        OP: FnOnce() -> R + Send,
        R: Send,
    {
        match &self.pool {
            Some(pool) => pool.install(op),
            None => op(),
        }
    }
}
