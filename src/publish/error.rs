//! Publish error types.
//!
//! | Error          | Scope     | Effect                                     |
//! |----------------|-----------|--------------------------------------------|
//! | `LinkError`    | one unit  | recorded in the report, batch continues    |
//! | `PublishError` | whole run | aborts, previous public tree stays visible |

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::namespace::UnsafeUrlError;
use crate::unit::ResolveError;

/// Failure to place a single unit (or directory) in the tree.
#[derive(Debug, Error)]
pub enum LinkError {
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error("backing file `{}` does not exist", .0.display())]
    SourceMissing(PathBuf),

    #[error("`{}` is a directory, refusing to replace it with a link", .0.display())]
    Occupied(PathBuf),

    #[error("`{}` is reserved by the publisher", .0.display())]
    Reserved(PathBuf),

    #[error("`{}` is already claimed by unit {owner}", path.display())]
    PathClaimed { path: PathBuf, owner: String },

    #[error("failed to {op} `{}`: {source}", path.display())]
    Io {
        op: &'static str,
        path: PathBuf,
        source: io::Error,
    },
}

impl LinkError {
    pub(crate) fn io(op: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            op,
            path: path.into(),
            source,
        }
    }
}

/// Failure that aborts a whole publish.
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("cannot prepare publish directories: {0}")]
    Prepare(#[source] LinkError),

    #[error(transparent)]
    UnsafeNamespace(#[from] UnsafeUrlError),

    #[error("publisher serves repo `{expected}`, got `{found}`")]
    RepoMismatch { expected: String, found: String },

    #[error("public path `{}` exists and is not a symlink", .0.display())]
    PublicPathOccupied(PathBuf),

    #[error("failed to swap public path `{}`: {source}", path.display())]
    Swap { path: PathBuf, source: io::Error },

    #[error("failed to write manifest `{}`: {source}", path.display())]
    Manifest { path: PathBuf, source: io::Error },

    #[error("failed to encode manifest: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("invalid base url `{url}`: {reason}")]
    BaseUrl { url: String, reason: String },

    #[error("failed to start link workers: {0}")]
    Workers(#[from] rayon::ThreadPoolBuildError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::ErrorKind;

    #[test]
    fn test_link_error_display() {
        let err = LinkError::io(
            "create directory",
            "/pub/a",
            io::Error::new(ErrorKind::PermissionDenied, "permission denied"),
        );
        let display = err.to_string();
        assert!(display.contains("create directory"));
        assert!(display.contains("/pub/a"));
        assert!(display.contains("permission denied"));
    }

    #[test]
    fn test_prepare_wraps_link_error() {
        let err = PublishError::Prepare(LinkError::Occupied(PathBuf::from("/w")));
        assert!(err.to_string().starts_with("cannot prepare publish directories"));
    }

    #[test]
    fn test_path_claimed_names_owner() {
        let err = LinkError::PathClaimed {
            path: PathBuf::from("a/x.rpm"),
            owner: "rpm:{\"n\":0}".to_string(),
        };
        let display = err.to_string();
        assert!(display.contains("a/x.rpm"));
        assert!(display.contains("rpm:"));
    }
}
