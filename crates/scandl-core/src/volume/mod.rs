//! Volume and catalogue downloads: fetch a page, resolve its links through
//! the website's `ContentSource`, run the batch archiver and save the result.


use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::batch::{archive_from_locators, BatchOptions, ProgressSink};
use crate::config::ScandlConfig;
use crate::fetch::{Fetcher, RequestOptions};
use crate::retry::{fetch_with_retry, run_with_retry, RetryPolicy};
use crate::source::{source_for, ContentSource, PageKind, UnsupportedSource, Website};
use crate::storage::save_archive;
use crate::url_model::volume_archive_name;

/// Everything a `Downloader` needs besides the transport.
#[derive(Debug, Clone)]
pub struct DownloadSettings {
    /// Policy for HTML page fetches.
    pub page_retry: RetryPolicy,
    /// Whole-volume attempts when downloading a catalogue.
    pub volume_retry: RetryPolicy,
    pub batch: BatchOptions,
    pub archive_extension: String,
    pub output_dir: PathBuf,
    pub overwrite: bool,
    /// Send the volume page URL as `Referer` for its images.
    pub send_referer: bool,
}

impl DownloadSettings {
    pub fn from_config(cfg: &ScandlConfig) -> Self {
        let retry = cfg.retry();
        Self {
            page_retry: retry.page_policy(),
            volume_retry: retry.volume_policy(),
            batch: BatchOptions::from_config(cfg),
            archive_extension: cfg.archive_extension.clone(),
            output_dir: cfg.output_dir.clone().unwrap_or_else(|| PathBuf::from(".")),
            overwrite: false,
            send_referer: cfg.http().send_referer,
        }
    }
}

/// Result of inspecting a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageStatus {
    pub url: String,
    pub website: Website,
    pub kind: PageKind,
    /// Volume links for a catalogue, image links for a volume.
    pub links: Vec<String>,
}

/// A link that did not answer a probe with 2xx.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnreachableLink {
    pub url: String,
    pub reason: String,
}

#[derive(Debug, Clone)]
pub struct CheckReport {
    pub status: PageStatus,
    pub unreachable: Vec<UnreachableLink>,
}

impl CheckReport {
    /// True when the page has links and every one of them answered.
    pub fn can_download(&self) -> bool {
        !self.status.links.is_empty() && self.unreachable.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VolumeFailure {
    pub url: String,
    pub message: String,
}

/// Outcome of a catalogue download. Failed volumes do not stop the others.
#[derive(Debug, Clone, Default)]
pub struct CatalogueReport {
    pub saved: Vec<PathBuf>,
    /// Archives already on disk (not re-downloaded without overwrite).
    pub skipped: Vec<PathBuf>,
    pub failed: Vec<VolumeFailure>,
}

#[derive(Debug, Clone)]
pub enum DownloadOutcome {
    Volume(PathBuf),
    Catalogue(CatalogueReport),
}

/// Resolve `href` against the page it was found on.
fn resolve_link(base: &str, href: &str) -> String {
    url::Url::parse(base)
        .and_then(|b| b.join(href))
        .map(String::from)
        .unwrap_or_else(|_| href.to_string())
}

pub struct Downloader {
    fetcher: Arc<dyn Fetcher>,
    settings: DownloadSettings,
}

impl Downloader {
    pub fn new(fetcher: Arc<dyn Fetcher>, settings: DownloadSettings) -> Self {
        Self { fetcher, settings }
    }

    pub fn settings(&self) -> &DownloadSettings {
        &self.settings
    }

    fn fetch_page(&self, url: &str) -> Result<String> {
        let response = fetch_with_retry(
            self.fetcher.as_ref(),
            url,
            &RequestOptions::default(),
            &self.settings.page_retry,
        )?;
        if !response.is_success() {
            anyhow::bail!("GET {} returned HTTP {}", url, response.status);
        }
        Ok(response.text())
    }

    fn links_of(
        source: &dyn ContentSource,
        url: &str,
        kind: PageKind,
        html: &str,
    ) -> Result<Vec<String>> {
        let links = match kind {
            PageKind::Catalogue => source.volume_links(html)?,
            PageKind::Volume => source.image_links(html)?,
        };
        Ok(links.iter().map(|l| resolve_link(url, l)).collect())
    }

    /// Fetch `url` and report what it holds.
    pub fn inspect(&self, url: &str) -> Result<PageStatus> {
        let website = Website::from_url(url)?;
        let source = source_for(website);
        let html = self.fetch_page(url)?;
        let kind = source.page_kind(url, &html)?;
        let links = Self::links_of(source.as_ref(), url, kind, &html)?;
        Ok(PageStatus {
            url: url.to_string(),
            website,
            kind,
            links,
        })
    }

    /// Inspect `url`, then probe every link it lists.
    pub fn check(&self, url: &str) -> Result<CheckReport> {
        let status = self.inspect(url)?;
        let options = match status.kind {
            PageKind::Volume if self.settings.send_referer => RequestOptions::referer(url),
            _ => RequestOptions::default(),
        };
        let mut unreachable = Vec::new();
        for link in &status.links {
            let reason = match self.fetcher.head(link, &options) {
                Ok(probe) if probe.is_success() => continue,
                Ok(probe) => format!("HTTP {}", probe.status),
                Err(e) => e.to_string(),
            };
            tracing::debug!(url = %link, %reason, "link not reachable");
            unreachable.push(UnreachableLink {
                url: link.clone(),
                reason,
            });
        }
        Ok(CheckReport {
            status,
            unreachable,
        })
    }

    /// Download whatever `url` points at: one volume or a whole catalogue.
    pub fn download(&self, url: &str, progress: &dyn ProgressSink) -> Result<DownloadOutcome> {
        let website = Website::from_url(url)?;
        let source = source_for(website);
        let html = self.fetch_page(url)?;
        match source.page_kind(url, &html)? {
            PageKind::Volume => {
                tracing::info!(url, "downloading single volume");
                self.volume_from_html(source.as_ref(), url, &html, progress)
                    .map(DownloadOutcome::Volume)
            }
            PageKind::Catalogue => {
                tracing::info!(url, "downloading all volumes");
                self.catalogue_from_html(source.as_ref(), url, &html, progress)
                    .map(DownloadOutcome::Catalogue)
            }
        }
    }

    /// Download the volume at `url` and save it as an archive.
    pub fn download_volume(&self, url: &str, progress: &dyn ProgressSink) -> Result<PathBuf> {
        let source = source_for(Website::from_url(url)?);
        let html = self.fetch_page(url)?;
        self.volume_from_html(source.as_ref(), url, &html, progress)
    }

    /// Download every volume listed on the catalogue page at `url`.
    pub fn download_all_volumes(
        &self,
        url: &str,
        progress: &dyn ProgressSink,
    ) -> Result<CatalogueReport> {
        let source = source_for(Website::from_url(url)?);
        let html = self.fetch_page(url)?;
        self.catalogue_from_html(source.as_ref(), url, &html, progress)
    }

    fn archive_path(&self, url: &str) -> (String, PathBuf) {
        let name = volume_archive_name(url, &self.settings.archive_extension);
        let path = self.settings.output_dir.join(&name);
        (name, path)
    }

    fn volume_from_html(
        &self,
        source: &dyn ContentSource,
        url: &str,
        html: &str,
        progress: &dyn ProgressSink,
    ) -> Result<PathBuf> {
        let images = Self::links_of(source, url, PageKind::Volume, html)?;
        if images.is_empty() {
            return Err(UnsupportedSource::NoContent(url.to_string()).into());
        }

        let mut options = self.settings.batch.clone();
        if self.settings.send_referer {
            options.request = options.request.with_header("Referer", url);
        }
        let bytes = archive_from_locators(self.fetcher.as_ref(), &images, &options, progress)
            .with_context(|| format!("failed to download volume {url}"))?;

        let (name, _) = self.archive_path(url);
        let path = save_archive(&self.settings.output_dir, &name, &bytes, self.settings.overwrite)?;
        tracing::info!(path = %path.display(), images = images.len(), "volume saved");
        Ok(path)
    }

    fn volume_with_retry(
        &self,
        source: &dyn ContentSource,
        url: &str,
        progress: &dyn ProgressSink,
    ) -> Result<PathBuf> {
        run_with_retry(&self.settings.volume_retry, |attempt| {
            if attempt > 1 {
                tracing::info!(url, attempt, "retrying volume");
            }
            let html = self.fetch_page(url)?;
            self.volume_from_html(source, url, &html, progress)
        })
        .map_err(|e| e.error.context(format!("gave up after {} attempt(s)", e.attempts)))
    }

    fn catalogue_from_html(
        &self,
        source: &dyn ContentSource,
        url: &str,
        html: &str,
        progress: &dyn ProgressSink,
    ) -> Result<CatalogueReport> {
        let volumes = Self::links_of(source, url, PageKind::Catalogue, html)?;
        if volumes.is_empty() {
            return Err(UnsupportedSource::NoContent(url.to_string()).into());
        }

        let total = volumes.len();
        let mut report = CatalogueReport::default();
        for (i, volume) in volumes.iter().enumerate() {
            let (_, path) = self.archive_path(volume);
            if !self.settings.overwrite && path.exists() {
                tracing::info!(path = %path.display(), "volume already saved, skipping");
                report.skipped.push(path);
                continue;
            }
            tracing::info!(volume = i + 1, total, url = %volume, "downloading volume");
            match self.volume_with_retry(source, volume, progress) {
                Ok(path) => report.saved.push(path),
                Err(e) => {
                    tracing::warn!(url = %volume, "volume failed: {:#}", e);
                    report.failed.push(VolumeFailure {
                        url: volume.clone(),
                        message: format!("{:#}", e),
                    });
                }
            }
        }
        tracing::info!(
            saved = report.saved.len(),
            skipped = report.skipped.len(),
            failed = report.failed.len(),
            "catalogue finished"
        );
        Ok(report)
    }

    /// Archive an explicit list of image URLs into `path`.
    pub fn archive_to_file(
        &self,
        images: &[String],
        path: &Path,
        progress: &dyn ProgressSink,
    ) -> Result<PathBuf> {
        let bytes =
            archive_from_locators(self.fetcher.as_ref(), images, &self.settings.batch, progress)?;
        let dir = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .with_context(|| format!("invalid output path {}", path.display()))?;
        save_archive(dir, name, &bytes, self.settings.overwrite)
    }
}
