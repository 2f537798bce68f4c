//! Website sources: recognise a supported site and pull volume and image
//! links out of its pages.
//!
//! The downloader only depends on the `ContentSource` trait; each website
//! has its own implementation with its own selectors.

mod reader;
mod sushiscan;

use std::fmt;
use thiserror::Error;

pub use sushiscan::SushiScan;

/// The resolution step found nothing it can work with.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UnsupportedSource {
    #[error("unsupported website: {0}")]
    Website(String),
    #[error("no downloadable content found on {0}")]
    NoContent(String),
}

/// Websites scandl knows how to scrape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Website {
    SushiScan,
}

impl Website {
    const ALL: [Website; 1] = [Website::SushiScan];

    /// Host fragment that identifies the website.
    pub fn domain(self) -> &'static str {
        match self {
            Website::SushiScan => "sushiscan.net",
        }
    }

    /// Website serving `url`, matched on its host.
    pub fn from_url(url: &str) -> Result<Website, UnsupportedSource> {
        let host = url::Url::parse(url)
            .ok()
            .and_then(|u| u.host_str().map(str::to_ascii_lowercase))
            .ok_or_else(|| UnsupportedSource::Website(url.to_string()))?;
        Self::ALL
            .into_iter()
            .find(|w| host.contains(w.domain()))
            .ok_or(UnsupportedSource::Website(host))
    }
}

impl fmt::Display for Website {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.domain())
    }
}

/// What a page holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageKind {
    /// Lists every volume of a series.
    Catalogue,
    /// Shows the images of one volume.
    Volume,
}

/// Page parsing for one website.
pub trait ContentSource: Send + Sync {
    fn website(&self) -> Website;

    /// Classify the page at `url` from its HTML.
    fn page_kind(&self, url: &str, html: &str) -> Result<PageKind, UnsupportedSource>;

    /// Volume page links of a catalogue page, oldest first.
    fn volume_links(&self, html: &str) -> anyhow::Result<Vec<String>>;

    /// Image links of a volume page, in reading order.
    fn image_links(&self, html: &str) -> anyhow::Result<Vec<String>>;
}

/// Parser for `website`.
pub fn source_for(website: Website) -> Box<dyn ContentSource> {
    match website {
        Website::SushiScan => Box::new(SushiScan),
    }
}
