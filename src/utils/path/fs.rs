//! Path normalization utilities.
//!
//! Provides consistent path handling for configured directories:
//! - `normalize_path` - absolute form without touching the filesystem
//! - `resolve_path` - expand `~` and resolve relative paths against a base directory

use std::path::{Component, Path, PathBuf};

/// Normalize a path to absolute form.
///
/// Relative paths are joined with the current directory. `.` components are
/// dropped and `..` is folded lexically; symlinks are left alone, since the
/// public tree is itself made of symlinks and must not be resolved through.
///
/// # Example
/// ```ignore
/// let abs = normalize_path(Path::new("./published/../working"));
/// ```
pub fn normalize_path(path: &Path) -> PathBuf {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir().map_or_else(|_| path.to_path_buf(), |cwd| cwd.join(path))
    };

    let mut normalized = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other),
        }
    }
    normalized
}

/// Resolve a configured path against the directory holding the config file.
///
/// Tries in order:
/// 1. Expand a leading `~`
/// 2. If absolute, use as-is
/// 3. Otherwise, resolve relative to `base_dir`
///
/// Always returns a normalized absolute path.
pub fn resolve_path(path: &Path, base_dir: &Path) -> PathBuf {
    let raw = path.to_string_lossy();
    let expanded = PathBuf::from(shellexpand::tilde(&raw).as_ref());

    if expanded.is_absolute() {
        normalize_path(&expanded)
    } else {
        normalize_path(&base_dir.join(expanded))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path_absolute() {
        let path = Path::new("/absolute/./path/../file.txt");
        assert_eq!(normalize_path(path), PathBuf::from("/absolute/file.txt"));
    }

    #[test]
    fn test_normalize_path_relative() {
        let path = Path::new("relative/path/file.txt");
        let normalized = normalize_path(path);
        assert!(normalized.is_absolute());
        assert!(normalized.ends_with("relative/path/file.txt"));
    }

    #[test]
    fn test_resolve_path_absolute() {
        let path = Path::new("/absolute/path");
        let resolved = resolve_path(path, Path::new("/base"));
        assert_eq!(resolved, PathBuf::from("/absolute/path"));
    }

    #[test]
    fn test_resolve_path_relative_to_base() {
        let resolved = resolve_path(Path::new("published/repos"), Path::new("/etc/pubtree"));
        assert_eq!(resolved, PathBuf::from("/etc/pubtree/published/repos"));
    }
}
