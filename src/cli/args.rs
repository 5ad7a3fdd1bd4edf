//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::CONFIG_FILE_NAME;

/// Publish content repositories as atomically swapped symlink trees
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path (default: pubtree.toml)
    #[arg(short = 'C', long, global = true, default_value = CONFIG_FILE_NAME, value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Link units into the working tree and swap it in publicly
    #[command(visible_alias = "p")]
    Publish {
        #[command(flatten)]
        args: PublishArgs,
    },

    /// Check the config and the repository's relative url
    #[command(visible_alias = "v")]
    Validate {
        #[command(flatten)]
        args: ValidateArgs,
    },
}

/// Publish command arguments.
#[derive(clap::Args, Debug, Clone)]
pub struct PublishArgs {
    /// JSON array of content units to publish
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub units: PathBuf,

    /// Print the publish report as JSON on stdout
    #[arg(long)]
    pub json: bool,
}

/// Validate command arguments.
#[derive(clap::Args, Debug, Clone)]
pub struct ValidateArgs {
    /// JSON array of related repositories (`{id, relative_url}`)
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub related: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_publish() {
        let cli = Cli::try_parse_from([
            "pubtree", "-C", "/etc/pubtree.toml", "publish", "--units", "units.json", "--json", "-v",
        ])
        .unwrap();
        assert_eq!(cli.config, PathBuf::from("/etc/pubtree.toml"));
        assert!(cli.verbose);
        match cli.command {
            Commands::Publish { args } => {
                assert_eq!(args.units, PathBuf::from("units.json"));
                assert!(args.json);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_validate_defaults() {
        let cli = Cli::try_parse_from(["pubtree", "validate"]).unwrap();
        assert_eq!(cli.config, PathBuf::from(CONFIG_FILE_NAME));
        assert!(matches!(
            cli.command,
            Commands::Validate { args } if args.related.is_none()
        ));
    }

    #[test]
    fn test_publish_requires_units() {
        assert!(Cli::try_parse_from(["pubtree", "publish"]).is_err());
    }
}
