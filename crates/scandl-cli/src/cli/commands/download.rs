//! `scandl download|volume|catalogue <url>`: fetch volumes and save them as archives.

use anyhow::{Context, Result};
use scandl_core::config::ScandlConfig;
use scandl_core::volume::CatalogueReport;
use scandl_core::DownloadOutcome;

use super::progress::{finish_printer, spawn_printer};
use crate::cli::DownloadArgs;

/// What the URL is expected to point at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// Decide from the page content.
    Auto,
    Volume,
    Catalogue,
}

pub async fn run_download(
    cfg: &ScandlConfig,
    target: Target,
    url: &str,
    args: &DownloadArgs,
) -> Result<()> {
    let downloader = super::downloader(cfg, args);
    let (progress_tx, printer) = spawn_printer(args.batch.json_progress);
    let url = url.to_string();

    let outcome = tokio::task::spawn_blocking(move || match target {
        Target::Auto => downloader.download(&url, &progress_tx),
        Target::Volume => downloader
            .download_volume(&url, &progress_tx)
            .map(DownloadOutcome::Volume),
        Target::Catalogue => downloader
            .download_all_volumes(&url, &progress_tx)
            .map(DownloadOutcome::Catalogue),
    })
    .await
    .context("download task failed")?;
    finish_printer(printer).await;

    match outcome? {
        DownloadOutcome::Volume(path) => {
            println!("Saved {}", path.display());
            Ok(())
        }
        DownloadOutcome::Catalogue(report) => print_report(&report),
    }
}

fn print_report(report: &CatalogueReport) -> Result<()> {
    for path in &report.saved {
        println!("Saved   {}", path.display());
    }
    for path in &report.skipped {
        println!("Skipped {} (already exists)", path.display());
    }
    for failure in &report.failed {
        println!("Failed  {}: {}", failure.url, failure.message);
    }
    println!(
        "{} saved, {} skipped, {} failed",
        report.saved.len(),
        report.skipped.len(),
        report.failed.len()
    );
    if !report.failed.is_empty() {
        anyhow::bail!("{} volume(s) could not be downloaded", report.failed.len());
    }
    Ok(())
}
