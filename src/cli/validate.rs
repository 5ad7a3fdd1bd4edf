//! Validate command: config checks plus relative url conflicts.

use anyhow::Result;
use owo_colors::OwoColorize;

use super::ValidateArgs;
use crate::config::PubtreeConfig;
use crate::log;
use crate::namespace::{self, Validation, load_related};
use crate::utils::plural_count;

/// Check the configured repository against its related repositories.
///
/// Config errors were already reported while loading; this only adds the
/// namespace check. Returns whether the repository is acceptable.
pub fn run_validate(args: &ValidateArgs, config: &PubtreeConfig) -> Result<bool> {
    log!("validate"; "config ok: {}", config.config_path.display());

    let Some(path) = &args.related else {
        return Ok(true);
    };
    let related = load_related(path)?;
    log!("validate"; "checking against {}", plural_count(related.len(), "related repo"));

    let Validation { ok, message } = namespace::validate(
        &config.repo.id,
        config.repo.relative_url.as_deref(),
        &related,
    );
    match message {
        Some(message) => log!("error"; "{}", message),
        None => log!(
            "validate"; "{} `{}`",
            "namespace available:".green(),
            config.repository().namespace().join("/")
        ),
    }
    Ok(ok)
}
