//! Publish report types and formatting.

use std::fmt;
use std::path::PathBuf;

use owo_colors::OwoColorize;
use serde::Serialize;

use super::{LinkError, PublishError};
use crate::unit::{ContentUnit, Fields};
use crate::utils::plural_s;

/// A unit that could not be linked.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnitError {
    pub type_id: String,
    pub unit_key: Fields,
    pub reason: String,
}

impl UnitError {
    pub fn new(unit: &ContentUnit, err: &LinkError) -> Self {
        Self {
            type_id: unit.type_id.clone(),
            unit_key: unit.unit_key.clone(),
            reason: err.to_string(),
        }
    }
}

/// Unit counts and the public location of the repository.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PublishSummary {
    pub num_units_attempted: usize,
    pub num_units_published: usize,
    pub num_units_errors: usize,
    pub repo_publish_dir: PathBuf,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PublishDetails {
    /// Per-unit failures, in unit order.
    pub errors: Vec<UnitError>,
    /// Reason the whole publish was aborted.
    pub fatal: Option<String>,
}

/// Outcome of one publish call.
///
/// `num_units_attempted == num_units_published + num_units_errors` always
/// holds, also for a run aborted after linking. Unit errors do not clear
/// `success_flag`; only a fatal error does.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PublishReport {
    pub success_flag: bool,
    pub summary: PublishSummary,
    pub details: PublishDetails,
}

impl PublishReport {
    pub fn new(repo_publish_dir: PathBuf, attempted: usize, errors: Vec<UnitError>) -> Self {
        let num_units_errors = errors.len();
        Self {
            success_flag: true,
            summary: PublishSummary {
                num_units_attempted: attempted,
                num_units_published: attempted - num_units_errors,
                num_units_errors,
                repo_publish_dir,
            },
            details: PublishDetails {
                errors,
                fatal: None,
            },
        }
    }

    /// Report for a publish aborted before linking; no unit counts.
    pub fn fatal(repo_publish_dir: PathBuf, err: &PublishError) -> Self {
        Self {
            success_flag: false,
            summary: PublishSummary {
                repo_publish_dir,
                ..PublishSummary::default()
            },
            details: PublishDetails {
                errors: Vec::new(),
                fatal: Some(err.to_string()),
            },
        }
    }

    /// Mark a linked run as aborted. Counts and unit errors are kept.
    pub fn aborted(mut self, err: &PublishError) -> Self {
        self.success_flag = false;
        self.details.fatal = Some(err.to_string());
        self
    }

    pub fn errors(&self) -> &[UnitError] {
        &self.details.errors
    }

    /// True when the run succeeded and every unit was linked.
    pub fn is_clean(&self) -> bool {
        self.success_flag && self.details.errors.is_empty()
    }

    /// Print per-unit errors to stderr.
    pub fn print_errors(&self) {
        let errors = &self.details.errors;
        if errors.is_empty() {
            return;
        }
        eprintln!();
        eprintln!(
            "{} {}",
            "units".red().bold(),
            format!("({} error{})", errors.len(), plural_s(errors.len())).dimmed()
        );
        for err in errors {
            let key = serde_json::Value::Object(err.unit_key.clone());
            eprintln!(
                "{}{}:{}{}",
                "[".dimmed(),
                err.type_id.cyan(),
                key.to_string().cyan(),
                "]".dimmed()
            );
            eprintln!("{} {}", "→".red(), err.reason);
        }
    }
}

impl fmt::Display for PublishReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let summary = &self.summary;
        if let Some(fatal) = &self.details.fatal {
            return write!(f, "{} {}", "publish failed:".red().bold(), fatal);
        }

        write!(
            f,
            "{} -> {} ({}/{} unit{} linked",
            "published".green(),
            summary.repo_publish_dir.display(),
            summary.num_units_published,
            summary.num_units_attempted,
            plural_s(summary.num_units_attempted),
        )?;
        if summary.num_units_errors > 0 {
            write!(
                f,
                ", {}",
                format!(
                    "{} error{}",
                    summary.num_units_errors,
                    plural_s(summary.num_units_errors)
                )
                .red()
            )?;
        }
        write!(f, ")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_error(reason: &str) -> UnitError {
        let unit = ContentUnit::new("rpm", "/x").with_key("name", "zoo");
        UnitError::new(&unit, &LinkError::SourceMissing(PathBuf::from(reason)))
    }

    #[test]
    fn test_counts_add_up() {
        let report = PublishReport::new(PathBuf::from("/pub/r"), 5, vec![unit_error("/a")]);
        let s = &report.summary;
        assert!(report.success_flag);
        assert!(!report.is_clean());
        assert_eq!(s.num_units_attempted, 5);
        assert_eq!(s.num_units_published, 4);
        assert_eq!(s.num_units_errors, 1);
        assert_eq!(
            s.num_units_attempted,
            s.num_units_published + s.num_units_errors
        );
    }

    #[test]
    fn test_fatal_report() {
        let err = PublishError::PublicPathOccupied(PathBuf::from("/pub/r"));
        let report = PublishReport::fatal(PathBuf::from("/pub/r"), &err);
        assert!(!report.success_flag);
        assert_eq!(report.summary.num_units_attempted, 0);
        assert!(report.details.fatal.unwrap().contains("/pub/r"));
    }

    #[test]
    fn test_aborted_keeps_counts() {
        let err = PublishError::PublicPathOccupied(PathBuf::from("/pub/r"));
        let report =
            PublishReport::new(PathBuf::from("/pub/r"), 3, vec![unit_error("/a")]).aborted(&err);
        assert!(!report.success_flag);
        assert_eq!(report.summary.num_units_published, 2);
        assert_eq!(report.errors().len(), 1);
        assert!(report.to_string().contains("publish failed"));
    }

    #[test]
    fn test_unit_error_carries_identity() {
        let err = unit_error("/storage/a.rpm");
        assert_eq!(err.type_id, "rpm");
        assert_eq!(err.unit_key["name"], "zoo");
        assert!(err.reason.contains("/storage/a.rpm"));
    }

    #[test]
    fn test_serialize_shape() {
        let report = PublishReport::new(PathBuf::from("/pub/r"), 0, Vec::new());
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["success_flag"], true);
        assert_eq!(json["summary"]["num_units_errors"], 0);
        assert_eq!(json["summary"]["repo_publish_dir"], "/pub/r");
        assert!(json["details"]["errors"].as_array().unwrap().is_empty());
    }
}
