//! Relative publish path derivation for content units.

use std::path::{Component, Path, PathBuf};

use thiserror::Error;

use super::ContentUnit;

/// Unit key field holding a filename-like identity.
pub const FILENAME_KEY: &str = "fileName";

/// Metadata field with an explicit relative path.
const RELATIVEPATH_META: &str = "relativepath";

/// Metadata field with a plain filename.
const FILENAME_META: &str = "filename";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("no relative path: metadata, unit key and storage path are all empty")]
    NoPath,

    #[error("relative path `{0}` escapes the publish tree")]
    Escapes(String),
}

/// Derive a unit's relative publish path.
///
/// First usable value wins:
/// 1. `metadata.relativepath`
/// 2. `metadata.filename`
/// 3. `unit_key.fileName`
/// 4. final component of `storage_path`
///
/// The result may contain subdirectories. Leading `/` and `.` components are
/// dropped, and a value left empty by that (`"."`, `"/"`) falls through to
/// the next source. `..` is rejected so a unit can never link outside its tree.
pub fn resolve(unit: &ContentUnit) -> Result<PathBuf, ResolveError> {
    let candidates = [
        unit.meta_str(RELATIVEPATH_META),
        unit.meta_str(FILENAME_META),
        unit.key_str(FILENAME_KEY),
        storage_basename(&unit.storage_path),
    ];

    for raw in candidates.into_iter().flatten() {
        match sanitize(raw) {
            Err(ResolveError::NoPath) => continue,
            result => return result,
        }
    }
    Err(ResolveError::NoPath)
}

fn storage_basename(path: &Path) -> Option<&str> {
    path.file_name()
        .and_then(|name| name.to_str())
        .filter(|name| !name.is_empty())
}

fn sanitize(raw: &str) -> Result<PathBuf, ResolveError> {
    let mut clean = PathBuf::new();
    for component in Path::new(raw).components() {
        match component {
            Component::Normal(part) => clean.push(part),
            Component::RootDir | Component::CurDir | Component::Prefix(_) => {}
            Component::ParentDir => return Err(ResolveError::Escapes(raw.to_string())),
        }
    }

    if clean.as_os_str().is_empty() {
        return Err(ResolveError::NoPath);
    }
    Ok(clean)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit(storage_path: &str) -> ContentUnit {
        ContentUnit::new("rpm", storage_path)
    }

    #[test]
    fn test_relativepath_wins_over_filename() {
        let u = unit("/x/y/z")
            .with_meta("filename", "a")
            .with_meta("relativepath", "b");
        assert_eq!(resolve(&u).unwrap(), PathBuf::from("b"));
    }

    #[test]
    fn test_filename_only() {
        let u = unit("/x/y/z").with_meta("filename", "a");
        assert_eq!(resolve(&u).unwrap(), PathBuf::from("a"));
    }

    #[test]
    fn test_storage_basename_fallback() {
        assert_eq!(resolve(&unit("/x/y/z")).unwrap(), PathBuf::from("z"));
    }

    #[test]
    fn test_unit_key_filename() {
        let u = unit("/x/y/z").with_key(FILENAME_KEY, "test_1");
        assert_eq!(resolve(&u).unwrap(), PathBuf::from("test_1"));

        // metadata still beats the key
        let u = u.with_meta("filename", "test_2");
        assert_eq!(resolve(&u).unwrap(), PathBuf::from("test_2"));
    }

    #[test]
    fn test_empty_values_are_skipped() {
        let u = unit("/x/y/z")
            .with_meta("relativepath", "")
            .with_meta("filename", "a");
        assert_eq!(resolve(&u).unwrap(), PathBuf::from("a"));
    }

    #[test]
    fn test_nested_path_kept() {
        let u = unit("/x").with_meta("relativepath", "/a/b/./c/pkg.rpm");
        assert_eq!(resolve(&u).unwrap(), PathBuf::from("a/b/c/pkg.rpm"));
    }

    #[test]
    fn test_nothing_to_resolve() {
        assert_eq!(resolve(&unit("")), Err(ResolveError::NoPath));
        assert_eq!(resolve(&unit("/")), Err(ResolveError::NoPath));
    }

    #[test]
    fn test_degenerate_values_fall_through() {
        let u = unit("/x/y/z")
            .with_meta("relativepath", ".")
            .with_meta("filename", "/");
        assert_eq!(resolve(&u).unwrap(), PathBuf::from("z"));

        let u = unit("/x/y/z")
            .with_meta("relativepath", "./")
            .with_key(FILENAME_KEY, "k.rpm");
        assert_eq!(resolve(&u).unwrap(), PathBuf::from("k.rpm"));
    }

    #[test]
    fn test_parent_dir_rejected() {
        let u = unit("/x").with_meta("relativepath", "a/../../etc/passwd");
        assert!(matches!(resolve(&u), Err(ResolveError::Escapes(_))));
    }
}
