//! CLI for subharvest.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use subharvest_core::config;

use commands::{run_config, run_harvest, run_playlists, run_summary};

/// Top-level CLI for subharvest.
#[derive(Debug, Parser)]
#[command(name = "subharvest")]
#[command(about = "subharvest: playlist subtitle harvester and dataset builder", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Fetch, harvest and merge every configured playlist.
    Run {
        /// Playlist URL or id to process instead of the configured list. Repeatable.
        #[arg(long = "playlist", value_name = "URL")]
        playlists: Vec<String>,
        /// Override the output root from the config file.
        #[arg(long, value_name = "DIR")]
        output_root: Option<PathBuf>,
    },

    /// Harvest an already-downloaded playlist directory into the master dataset.
    Harvest {
        /// Directory holding `{video}.{lang}.vtt` files; its name is the playlist name.
        dir: PathBuf,
        /// Override the output root from the config file.
        #[arg(long, value_name = "DIR")]
        output_root: Option<PathBuf>,
    },

    /// Print the summary of the persisted master dataset.
    Summary {
        /// Override the output root from the config file.
        #[arg(long, value_name = "DIR")]
        output_root: Option<PathBuf>,
    },

    /// Show the config file location and effective settings.
    Config,
}

impl CliCommand {
    pub fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let mut cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Run {
                playlists,
                output_root,
            } => {
                if let Some(root) = output_root {
                    cfg.output_root = root;
                }
                run_playlists(cfg, &playlists)?;
            }
            CliCommand::Harvest { dir, output_root } => {
                if let Some(root) = output_root {
                    cfg.output_root = root;
                }
                run_harvest(cfg, &dir)?;
            }
            CliCommand::Summary { output_root } => {
                if let Some(root) = output_root {
                    cfg.output_root = root;
                }
                run_summary(&cfg)?;
            }
            CliCommand::Config => run_config(&cfg)?,
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
