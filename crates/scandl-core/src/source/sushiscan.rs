//! SushiScan (`sushiscan.net`) page parsing.
//!
//! Catalogue pages carry a `#chapterlist`, newest volume first. Volume pages
//! carry a `#readerarea`; the image list is normally in a `ts_reader.run`
//! script payload, with `<img>` tags as a fallback.

use anyhow::Result;
use scraper::{ElementRef, Html, Selector};

use super::reader::{images_from_script, READER_MARKER};
use super::{ContentSource, PageKind, UnsupportedSource, Website};
use crate::url_model::normalize_image_link;

const CATALOGUE_MARKER: &str = "#chapterlist";
const VOLUME_MARKER: &str = "#readerarea";
const VOLUME_LINKS: &str = "#chapterlist > ul a";
const READER_IMAGES: &str = "#readerarea img";
const READER_NOSCRIPT: &str = "#readerarea noscript";

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| anyhow::anyhow!("invalid selector {css:?}: {e:?}"))
}

fn has_match(doc: &Html, css: &str) -> bool {
    selector(css)
        .map(|sel| doc.select(&sel).next().is_some())
        .unwrap_or(false)
}

/// Lazy-loaded images keep the real link in `data-src`.
fn img_link(img: ElementRef<'_>) -> Option<&str> {
    let value = img.value();
    value
        .attr("data-src")
        .or_else(|| value.attr("src"))
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SushiScan;

impl SushiScan {
    fn script_images(doc: &Html) -> Result<Option<Vec<String>>> {
        let mut images = None;
        for script in doc.select(&selector("script")?) {
            let text: String = script.text().collect();
            if !text.contains(READER_MARKER) {
                continue;
            }
            if let Some(found) = images_from_script(&text)? {
                images = Some(found);
            }
        }
        Ok(images)
    }

    fn tag_images(doc: &Html) -> Result<Vec<String>> {
        let imgs = selector("img")?;
        let mut links: Vec<String> = doc
            .select(&selector(READER_IMAGES)?)
            .filter_map(img_link)
            .map(str::to_string)
            .collect();
        if links.is_empty() {
            // <noscript> content is parsed as raw text; reparse it.
            for noscript in doc.select(&selector(READER_NOSCRIPT)?) {
                let inner: String = noscript.text().collect();
                let fragment = Html::parse_fragment(&inner);
                links.extend(fragment.select(&imgs).filter_map(img_link).map(str::to_string));
            }
        }
        Ok(links)
    }
}

impl ContentSource for SushiScan {
    fn website(&self) -> Website {
        Website::SushiScan
    }

    fn page_kind(&self, url: &str, html: &str) -> Result<PageKind, UnsupportedSource> {
        let doc = Html::parse_document(html);
        if has_match(&doc, CATALOGUE_MARKER) {
            Ok(PageKind::Catalogue)
        } else if has_match(&doc, VOLUME_MARKER) {
            Ok(PageKind::Volume)
        } else {
            Err(UnsupportedSource::NoContent(url.to_string()))
        }
    }

    fn volume_links(&self, html: &str) -> Result<Vec<String>> {
        let doc = Html::parse_document(html);
        let mut links: Vec<String> = doc
            .select(&selector(VOLUME_LINKS)?)
            .filter_map(|a| a.value().attr("href"))
            .map(str::trim)
            .filter(|href| !href.is_empty())
            .map(str::to_string)
            .collect();
        links.reverse();
        Ok(links)
    }

    fn image_links(&self, html: &str) -> Result<Vec<String>> {
        let doc = Html::parse_document(html);
        let raw = match Self::script_images(&doc)? {
            Some(images) => images,
            None => Self::tag_images(&doc)?,
        };
        Ok(raw
            .iter()
            .map(|link| normalize_image_link(link))
            .filter(|link| !link.is_empty())
            .collect())
    }
}
