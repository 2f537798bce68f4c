//! CLI command handlers, one file per command.

mod archive;
mod check;
mod download;
mod generate;
mod progress;

pub use archive::run_archive;
pub use check::run_check;
pub use download::{run_download, Target};
pub use generate::{run_completions, run_man};

use scandl_core::config::{BatchMode, ScandlConfig};
use scandl_core::fetch::CurlOptions;
use scandl_core::{CurlFetcher, DownloadSettings, Downloader};
use std::sync::Arc;

use super::DownloadArgs;

/// Settings from the config file with command-line overrides applied.
pub(crate) fn settings_for(cfg: &ScandlConfig, args: &DownloadArgs) -> DownloadSettings {
    let mut settings = DownloadSettings::from_config(cfg);
    if let Some(dir) = &args.output_dir {
        settings.output_dir = dir.clone();
    }
    settings.overwrite = args.overwrite;
    if args.batch.concurrent {
        settings.batch.mode = BatchMode::Concurrent;
    }
    if let Some(jobs) = args.batch.jobs {
        settings.batch.max_concurrent = jobs.max(1);
    }
    settings
}

pub(crate) fn downloader(cfg: &ScandlConfig, args: &DownloadArgs) -> Downloader {
    let fetcher = CurlFetcher::new(CurlOptions::from_config(&cfg.http()));
    let settings = settings_for(cfg, args);
    tracing::debug!(?settings, "downloader settings");
    Downloader::new(Arc::new(fetcher), settings)
}
