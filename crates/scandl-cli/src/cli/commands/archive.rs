//! `scandl archive <image-url>... --output <file>`: pack raw image URLs into one archive.

use anyhow::{Context, Result};
use scandl_core::config::ScandlConfig;
use std::path::Path;

use super::progress::{finish_printer, spawn_printer};
use crate::cli::DownloadArgs;

pub async fn run_archive(
    cfg: &ScandlConfig,
    urls: Vec<String>,
    output: &Path,
    args: &DownloadArgs,
) -> Result<()> {
    let downloader = super::downloader(cfg, args);
    let (progress_tx, printer) = spawn_printer(args.batch.json_progress);
    let output = output.to_path_buf();

    let saved = tokio::task::spawn_blocking(move || {
        downloader.archive_to_file(&urls, &output, &progress_tx)
    })
    .await
    .context("archive task failed")?;
    finish_printer(printer).await;

    println!("Saved {}", saved?.display());
    Ok(())
}
