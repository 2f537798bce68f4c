//! CLI for scandl.

mod commands;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use scandl_core::config;
use std::path::PathBuf;

use commands::{run_archive, run_check, run_completions, run_download, run_man, Target};

/// Top-level CLI for scandl.
#[derive(Debug, Parser)]
#[command(name = "scandl", version)]
#[command(about = "scandl: download manga volumes as comic-book archives", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

/// Options shared by every command that downloads images.
#[derive(Debug, Clone, Default, Args)]
pub struct BatchArgs {
    /// Fetch the images of a volume in parallel.
    #[arg(long)]
    pub concurrent: bool,

    /// Worker count for --concurrent (default: config `batch.max_concurrent`).
    #[arg(long, short = 'j', value_name = "N")]
    pub jobs: Option<usize>,

    /// Print progress as JSON lines on stdout.
    #[arg(long)]
    pub json_progress: bool,
}

/// Options for commands that save volumes under their own names.
#[derive(Debug, Clone, Default, Args)]
pub struct DownloadArgs {
    /// Directory to save archives in (default: config `output_dir`, then the current directory).
    #[arg(long, short = 'o', value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Replace archives that already exist.
    #[arg(long)]
    pub overwrite: bool,

    #[command(flatten)]
    pub batch: BatchArgs,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Download a volume or every volume of a catalogue, depending on the page.
    Download {
        /// Volume or catalogue page URL.
        url: String,
        #[command(flatten)]
        args: DownloadArgs,
    },

    /// Download a single volume.
    Volume {
        /// Volume page URL.
        url: String,
        #[command(flatten)]
        args: DownloadArgs,
    },

    /// Download every volume listed on a catalogue page.
    Catalogue {
        /// Catalogue page URL.
        url: String,
        #[command(flatten)]
        args: DownloadArgs,
    },

    /// Fetch a list of image URLs and pack them into one archive.
    Archive {
        /// Image URLs, in archive order.
        #[arg(required = true)]
        urls: Vec<String>,

        /// Archive file to write.
        #[arg(long, short = 'o', value_name = "FILE")]
        output: PathBuf,

        /// Replace the output file if it exists.
        #[arg(long)]
        overwrite: bool,

        #[command(flatten)]
        batch: BatchArgs,
    },

    /// Show what a page holds and whether it can be downloaded.
    Check {
        /// Volume or catalogue page URL.
        url: String,

        /// Probe every link with a HEAD request.
        #[arg(long)]
        probe: bool,
    },

    /// Print a shell completion script.
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },

    /// Print the man page.
    Man,
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();

        // Neither needs the config file.
        match cli.command {
            CliCommand::Completions { shell } => return run_completions(shell),
            CliCommand::Man => return run_man(),
            _ => {}
        }

        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Download { url, args } => {
                run_download(&cfg, Target::Auto, &url, &args).await?
            }
            CliCommand::Volume { url, args } => {
                run_download(&cfg, Target::Volume, &url, &args).await?
            }
            CliCommand::Catalogue { url, args } => {
                run_download(&cfg, Target::Catalogue, &url, &args).await?
            }
            CliCommand::Archive {
                urls,
                output,
                overwrite,
                batch,
            } => {
                let args = DownloadArgs {
                    output_dir: None,
                    overwrite,
                    batch,
                };
                run_archive(&cfg, urls, &output, &args).await?
            }
            CliCommand::Check { url, probe } => run_check(&cfg, &url, probe).await?,
            CliCommand::Completions { .. } | CliCommand::Man => {}
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
