//! Filesystem primitives for building the published tree.
//!
//! Every operation returns its failure as a value so the caller decides
//! whether it is fatal (base directories, public swap) or per-unit.

use std::fs;
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use super::{LinkError, PublishError};

/// Ensure `path` and all missing ancestors exist.
///
/// Pre-existence is success, including when another worker creates the same
/// directory concurrently.
pub fn create_dirs(path: &Path) -> Result<(), LinkError> {
    fs::create_dir_all(path).map_err(|e| LinkError::io("create directory", path, e))
}

/// Point `destination` at `source`.
///
/// - missing ancestors of `destination` are created
/// - a link already pointing at `source` is left untouched
/// - any other file or link at `destination` is replaced
/// - a directory at `destination` is never removed
pub fn create_symlink(source: &Path, destination: &Path) -> Result<(), LinkError> {
    if fs::metadata(source).is_err() {
        return Err(LinkError::SourceMissing(source.to_path_buf()));
    }

    if let Some(parent) = destination.parent() {
        create_dirs(parent)?;
    }

    match fs::symlink_metadata(destination) {
        Ok(meta) if meta.file_type().is_symlink() => {
            if fs::read_link(destination).is_ok_and(|target| target == source) {
                return Ok(());
            }
            remove_entry(destination)?;
        }
        Ok(meta) if meta.is_dir() => {
            return Err(LinkError::Occupied(destination.to_path_buf()));
        }
        Ok(_) => remove_entry(destination)?,
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => return Err(LinkError::io("inspect", destination, e)),
    }

    symlink(source, destination).map_err(|e| LinkError::io("create link", destination, e))
}

fn remove_entry(path: &Path) -> Result<(), LinkError> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        // Lost a race with another remover; the slot is free either way.
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(LinkError::io("remove", path, e)),
    }
}

/// Atomically repoint the symlink at `link` to `target`.
///
/// The new link is created under a temporary sibling name and renamed over
/// `link`, so readers resolve either the old target or the new one. A real
/// file or directory at `link` is refused rather than deleted.
pub fn swap_symlink(target: &Path, link: &Path) -> Result<(), PublishError> {
    ensure_swappable(link)?;

    let staging = staging_path(link);
    let swap_err = |source| PublishError::Swap {
        path: link.to_path_buf(),
        source,
    };

    match fs::remove_file(&staging) {
        Ok(()) => {}
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => return Err(swap_err(e)),
    }
    symlink(target, &staging).map_err(swap_err)?;

    if let Err(e) = fs::rename(&staging, link) {
        fs::remove_file(&staging).ok();
        return Err(swap_err(e));
    }
    Ok(())
}

/// Fail if something other than a symlink occupies the public path.
pub fn ensure_swappable(link: &Path) -> Result<(), PublishError> {
    match fs::symlink_metadata(link) {
        Ok(meta) if !meta.file_type().is_symlink() => {
            Err(PublishError::PublicPathOccupied(link.to_path_buf()))
        }
        Ok(_) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(PublishError::Swap {
            path: link.to_path_buf(),
            source: e,
        }),
    }
}

/// `<dir>/.<name>.<pid>.<n>.swap`, unique per process and call.
fn staging_path(link: &Path) -> PathBuf {
    static COUNTER: AtomicUsize = AtomicUsize::new(0);

    let name = link
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let n = COUNTER.fetch_add(1, Ordering::Relaxed);
    link.with_file_name(format!(".{name}.{}.{n}.swap", std::process::id()))
}

#[cfg(unix)]
fn symlink(source: &Path, destination: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(source, destination)
}

#[cfg(windows)]
fn symlink(source: &Path, destination: &Path) -> io::Result<()> {
    if source.is_dir() {
        std::os::windows::fs::symlink_dir(source, destination)
    } else {
        std::os::windows::fs::symlink_file(source, destination)
    }
}
