//! Publish command.

use anyhow::{Context, Result};

use super::PublishArgs;
use crate::config::PubtreeConfig;
use crate::log;
use crate::publish::{ContentTreePublisher, HttpPublisher, PublishError, PublishReport, Repository};
use crate::unit::{ContentUnit, load_units};
use crate::utils::plural_count;

/// The publisher selected by the config: plain tree, or tree plus HTTP urls.
pub enum Publisher {
    Tree(ContentTreePublisher),
    Http(HttpPublisher),
}

impl Publisher {
    pub fn from_config(config: &PubtreeConfig, progress: bool) -> Result<Self, PublishError> {
        let workers = config.publish.workers;
        let configure = |tree: ContentTreePublisher| -> Result<_, PublishError> {
            let tree = tree.with_progress(progress);
            match workers {
                Some(n) => tree.with_workers(n),
                None => Ok(tree),
            }
        };

        match &config.http {
            Some(http) => HttpPublisher::new(&http.base_url, http.alias(), &config.repo.id)?
                .with_tree(configure)
                .map(Self::Http),
            None => configure(ContentTreePublisher::new(&config.publish.root)).map(Self::Tree),
        }
    }

    pub fn publish(&self, repo: &Repository, units: &[ContentUnit]) -> PublishReport {
        match self {
            Self::Tree(tree) => tree.publish(repo, units),
            Self::Http(http) => http.publish(repo, units),
        }
    }
}

/// Publish the units listed in `args.units`.
///
/// Returns whether the publish succeeded; unit errors alone do not fail it.
pub fn run_publish(args: &PublishArgs, config: &PubtreeConfig) -> Result<bool> {
    let units = load_units(&args.units)?;
    let repo = config.repository();

    // No progress line in JSON mode
    let publisher = Publisher::from_config(config, !args.json)
        .context("failed to set up publisher")?;

    log!("publish"; "{} -> {}", repo.id, plural_count(units.len(), "unit"));
    let report = publisher.publish(&repo, &units);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        report.print_errors();
        log!("publish"; "{}", report);
    }
    if let Publisher::Http(http) = &publisher
        && report.success_flag
    {
        log!("publish"; "manifest: {}", http.manifest_url());
    }

    Ok(report.success_flag)
}
