//! pubtree - publish content repositories as atomically swapped symlink trees.

use anyhow::Result;
use clap::{ColorChoice, Parser};
use pubtree::cli::{self, Cli, Commands};
use pubtree::config::PubtreeConfig;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }
    pubtree::logger::set_verbose(cli.verbose);

    let config = PubtreeConfig::load(&cli.config)?;

    let ok = match &cli.command {
        Commands::Publish { args } => cli::publish::run_publish(args, &config)?,
        Commands::Validate { args } => cli::validate::run_validate(args, &config)?,
    };
    if !ok {
        std::process::exit(1);
    }
    Ok(())
}
