//! Configuration utility functions.

use std::path::{Path, PathBuf};

/// Find config file by searching upward from current directory
///
/// Starts from cwd and walks up parent directories until finding `config_name`
/// Returns the absolute path to the config file if found
///
/// # Example
/// ```text
/// /srv/mirror/repos/zoo/    ← cwd
/// /srv/mirror/pubtree.toml  ← found!
/// ```
pub fn find_config_file(config_name: &Path) -> Option<PathBuf> {
    if config_name.is_absolute() {
        return config_name.exists().then(|| config_name.to_path_buf());
    }

    let cwd = std::env::current_dir().ok()?;
    cwd.ancestors()
        .map(|dir| dir.join(config_name))
        .find(|candidate| candidate.exists())
}

/// Reject namespace segments that would walk out of the publish root.
///
/// Returns the first offending segment.
pub fn unsafe_segment(url: &str) -> Option<&str> {
    url.split('/')
        .find(|segment| matches!(*segment, "." | ".."))
}

// ============================================================================
// tests
// ============================================================================
