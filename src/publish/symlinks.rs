//! Per-unit link creation.
//!
//! Units are independent, so linking fans out over the current rayon pool.
//! Outcomes are collected with an indexed `collect`, which keeps them in
//! unit order without a shared lock.
//!
//! Relative paths are claimed sequentially before the fan-out: the first
//! unit in input order owns a path, later units resolving to the same path
//! (or to a file/directory overlap with it) get a per-unit error. Without
//! that, the last worker to finish would own the link.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use rayon::prelude::*;

use super::fs::create_symlink;
use super::{LinkError, UnitError};
use crate::logger::ProgressLine;
use crate::unit::{self, ContentUnit};

/// Link one unit under `target_dir`, returning its relative path.
///
/// Paths equal to or below a `reserved` entry are refused.
pub fn link_unit(
    unit: &ContentUnit,
    target_dir: &Path,
    reserved: &[PathBuf],
) -> Result<PathBuf, LinkError> {
    let relative = unit::resolve(unit)?;
    check_reserved(&relative, reserved)?;
    create_symlink(&unit.storage_path, &target_dir.join(&relative))?;
    Ok(relative)
}

fn check_reserved(relative: &Path, reserved: &[PathBuf]) -> Result<(), LinkError> {
    if reserved.iter().any(|r| relative.starts_with(r)) {
        return Err(LinkError::Reserved(relative.to_path_buf()));
    }
    Ok(())
}

/// Relative paths handed out so far, with the identity of their owner.
#[derive(Default)]
struct Claims {
    files: HashMap<PathBuf, String>,
    /// Ancestor directories of claimed files.
    dirs: HashMap<PathBuf, String>,
}

impl Claims {
    fn claim(&mut self, unit: &ContentUnit, path: PathBuf) -> Result<PathBuf, LinkError> {
        let owner = self
            .files
            .get(&path)
            .or_else(|| self.dirs.get(&path))
            .or_else(|| path.ancestors().skip(1).find_map(|dir| self.files.get(dir)));
        if let Some(owner) = owner {
            return Err(LinkError::PathClaimed {
                owner: owner.clone(),
                path,
            });
        }

        let identity = unit.identity();
        for dir in path.ancestors().skip(1).filter(|d| !d.as_os_str().is_empty()) {
            self.dirs
                .entry(dir.to_path_buf())
                .or_insert_with(|| identity.clone());
        }
        self.files.insert(path.clone(), identity);
        Ok(path)
    }
}

/// Resolve every unit and give each relative path to its first claimant.
pub fn claim_paths(units: &[ContentUnit], reserved: &[PathBuf]) -> Vec<Result<PathBuf, LinkError>> {
    let resolved: Vec<_> = units.par_iter().map(unit::resolve).collect();

    let mut claims = Claims::default();
    units
        .iter()
        .zip(resolved)
        .map(|(unit, path)| {
            let path = path?;
            check_reserved(&path, reserved)?;
            claims.claim(unit, path)
        })
        .collect()
}

/// Link all units in parallel; one outcome per unit, in unit order.
pub fn link_units(
    units: &[ContentUnit],
    target_dir: &Path,
    reserved: &[PathBuf],
    progress: Option<&ProgressLine>,
) -> Vec<Result<PathBuf, LinkError>> {
    let claims = claim_paths(units, reserved);

    units
        .par_iter()
        .zip(claims)
        .map(|(unit, claim)| {
            let outcome = claim.and_then(|relative| {
                create_symlink(&unit.storage_path, &target_dir.join(&relative))?;
                Ok(relative)
            });
            if let Err(e) = &outcome {
                crate::debug!("link"; "{}: {}", unit.identity(), e);
            }
            if let Some(p) = progress {
                p.inc("units");
            }
            outcome
        })
        .collect()
}

/// Turn failed outcomes into report entries.
pub fn unit_errors(units: &[ContentUnit], outcomes: &[Result<PathBuf, LinkError>]) -> Vec<UnitError> {
    units
        .iter()
        .zip(outcomes)
        .filter_map(|(unit, outcome)| outcome.as_ref().err().map(|e| UnitError::new(unit, e)))
        .collect()
}

/// Link every unit under `target_dir`.
///
/// Returns `(ok, errors)` where `ok` is true iff no unit failed. A failing
/// unit never stops the others. Running it again on an unchanged tree
/// yields no errors and leaves existing links alone.
pub fn handle_symlinks(units: &[ContentUnit], target_dir: &Path) -> (bool, Vec<UnitError>) {
    let outcomes = link_units(units, target_dir, &[], None);
    let errors = unit_errors(units, &outcomes);
    (errors.is_empty(), errors)
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::fs;
    use std::os::unix::fs::MetadataExt;
    use tempfile::TempDir;

    /// Five units; even ones live in `a/b/c/`.
    fn make_units(pkg_dir: &Path) -> Vec<ContentUnit> {
        fs::create_dir_all(pkg_dir).unwrap();
        (0..5)
            .map(|i| {
                let name = format!("file_{i}.rpm");
                let storage = pkg_dir.join(&name);
                fs::write(&storage, b"").unwrap();
                let relpath = if i % 2 == 0 {
                    format!("a/b/c/{name}")
                } else {
                    name
                };
                ContentUnit::new("rpm", storage)
                    .with_key("name", format!("unit_key_{i}"))
                    .with_meta("relativepath", relpath)
            })
            .collect()
    }

    fn assert_links(units: &[ContentUnit], dir: &Path) {
        for u in units {
            let link = dir.join(u.meta_str("relativepath").unwrap());
            assert!(link.is_symlink(), "{}", link.display());
            assert_eq!(fs::read_link(&link).unwrap(), u.storage_path);
        }
    }

    #[test]
    fn test_handle_symlinks() {
        let dir = TempDir::new().unwrap();
        let units = make_units(&dir.path().join("packages"));
        let links = dir.path().join("symlinks");

        let (ok, errors) = handle_symlinks(&units, &links);
        assert!(ok);
        assert!(errors.is_empty());
        assert_links(&units, &links);
    }

    #[test]
    fn test_republish_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let units = make_units(&dir.path().join("packages"));
        let links = dir.path().join("symlinks");

        handle_symlinks(&units, &links);
        let first = links.join("file_1.rpm");
        let inode = fs::symlink_metadata(&first).unwrap().ino();

        let (ok, errors) = handle_symlinks(&units, &links);
        assert!(ok);
        assert!(errors.is_empty());
        assert_links(&units, &links);
        // Correct links are not recreated
        assert_eq!(fs::symlink_metadata(&first).unwrap().ino(), inode);
    }

    #[test]
    fn test_deleted_backing_file() {
        let dir = TempDir::new().unwrap();
        let units = make_units(&dir.path().join("packages"));
        let links = dir.path().join("symlinks");
        handle_symlinks(&units, &links);

        fs::remove_file(&units[0].storage_path).unwrap();
        let (ok, errors) = handle_symlinks(&units, &links);
        assert!(!ok);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].unit_key["name"], "unit_key_0");
        assert_links(&units[1..], &links);
    }

    #[test]
    fn test_errors_keep_unit_order() {
        let dir = TempDir::new().unwrap();
        let units: Vec<_> = (0..64)
            .map(|i| {
                ContentUnit::new("rpm", dir.path().join(format!("missing_{i}")))
                    .with_key("n", i)
            })
            .collect();

        let (_, errors) = handle_symlinks(&units, &dir.path().join("links"));
        let order: Vec<_> = errors.iter().map(|e| e.unit_key["n"].as_i64().unwrap()).collect();
        assert_eq!(order, (0..64).collect::<Vec<i64>>());
    }

    #[test]
    fn test_unresolvable_unit() {
        let dir = TempDir::new().unwrap();
        let units = vec![ContentUnit::new("rpm", "")];
        let (ok, errors) = handle_symlinks(&units, dir.path());
        assert!(!ok);
        assert!(errors[0].reason.contains("no relative path"));
    }

    #[test]
    fn test_link_unit_returns_relative_path() {
        let dir = TempDir::new().unwrap();
        let units = make_units(&dir.path().join("packages"));
        let relative = link_unit(&units[2], &dir.path().join("tree"), &[]).unwrap();
        assert_eq!(relative, PathBuf::from("a/b/c/file_2.rpm"));
    }

    #[test]
    fn test_duplicate_paths_first_unit_wins() {
        let dir = TempDir::new().unwrap();
        let pkg_dir = dir.path().join("packages");
        fs::create_dir_all(&pkg_dir).unwrap();
        let units: Vec<_> = (0..8)
            .map(|i| {
                let storage = pkg_dir.join(format!("copy_{i}"));
                fs::write(&storage, b"").unwrap();
                ContentUnit::new("rpm", storage)
                    .with_key("n", i)
                    .with_meta("filename", "same.rpm")
            })
            .collect();
        let links = dir.path().join("symlinks");

        for _ in 0..3 {
            let (ok, errors) = handle_symlinks(&units, &links);
            assert!(!ok);
            assert_eq!(errors.len(), 7);
            assert_eq!(errors[0].unit_key["n"], 1);
            assert!(errors[0].reason.contains("already claimed"));
            // Converges to the first unit on every run
            assert_eq!(fs::read_link(links.join("same.rpm")).unwrap(), units[0].storage_path);
        }
    }

    #[test]
    fn test_file_directory_overlap_rejected() {
        let dir = TempDir::new().unwrap();
        let pkg_dir = dir.path().join("packages");
        fs::create_dir_all(&pkg_dir).unwrap();
        let unit = |name: &str, relpath: &str| {
            let storage = pkg_dir.join(name);
            fs::write(&storage, b"").unwrap();
            ContentUnit::new("rpm", storage).with_meta("relativepath", relpath)
        };
        let units = vec![unit("a", "x/y"), unit("b", "x"), unit("c", "x/y/z"), unit("d", "q")];

        let claims = claim_paths(&units, &[]);
        assert!(claims[0].is_ok());
        assert!(matches!(claims[1], Err(LinkError::PathClaimed { .. })));
        assert!(matches!(claims[2], Err(LinkError::PathClaimed { .. })));
        assert!(claims[3].is_ok());
    }

    #[test]
    fn test_reserved_path_refused() {
        let dir = TempDir::new().unwrap();
        let units = make_units(&dir.path().join("packages"));
        let reserved = [PathBuf::from("file_1.rpm"), PathBuf::from("a/b")];

        let outcomes = link_units(&units, &dir.path().join("tree"), &reserved, None);
        let refused: Vec<_> = outcomes
            .iter()
            .map(|o| matches!(o, Err(LinkError::Reserved(_))))
            .collect();
        // Units 0, 2 and 4 live under a/b/c, unit 1 is file_1.rpm
        assert_eq!(refused, [true, true, true, false, true]);
        assert!(!dir.path().join("tree/file_1.rpm").exists());
    }
}
