//! `scandl check <url>`: show what a page holds.

use anyhow::{Context, Result};
use scandl_core::config::ScandlConfig;
use scandl_core::volume::PageStatus;
use scandl_core::PageKind;

use crate::cli::DownloadArgs;

pub async fn run_check(cfg: &ScandlConfig, url: &str, probe: bool) -> Result<()> {
    let downloader = super::downloader(cfg, &DownloadArgs::default());
    let url = url.to_string();

    if !probe {
        let status = tokio::task::spawn_blocking(move || downloader.inspect(&url))
            .await
            .context("check task failed")??;
        print_status(&status);
        return Ok(());
    }

    let report = tokio::task::spawn_blocking(move || downloader.check(&url))
        .await
        .context("check task failed")??;
    print_status(&report.status);
    for link in &report.unreachable {
        println!("  unreachable {}: {}", link.url, link.reason);
    }
    if report.can_download() {
        println!("can download: yes");
        Ok(())
    } else {
        println!("can download: no");
        anyhow::bail!(
            "{} of {} link(s) unreachable",
            report.unreachable.len(),
            report.status.links.len()
        )
    }
}

fn print_status(status: &PageStatus) {
    let what = match status.kind {
        PageKind::Catalogue => "volume",
        PageKind::Volume => "image",
    };
    println!("{}", status.url);
    println!("  website: {}", status.website);
    println!("  page:    {:?}", status.kind);
    println!("  {}s:  {}", what, status.links.len());
}
