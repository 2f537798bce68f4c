//! Locator handling: archive entry names, volume titles and image link
//! normalization.

mod path;
mod sanitize;

pub use path::last_path_segment;
pub use sanitize::sanitize_filename;

/// Title used when a page URL has no usable path segment.
const DEFAULT_TITLE: &str = "volume";

/// Archive entry name for an image locator: everything after the last `/`.
///
/// Query strings are kept as-is. Falls back to the whole locator when it
/// contains no `/`.
pub fn entry_filename(locator: &str) -> &str {
    match locator.rfind('/') {
        Some(pos) => &locator[pos + 1..],
        None => locator,
    }
}

/// Volume title derived from its page URL: one trailing `/` stripped, then
/// the final path segment.
///
/// # Examples
///
/// - `volume_title("https://site/manga/chapter-5/")` → `"chapter-5"`
pub fn volume_title(page_url: &str) -> String {
    let segment = if url::Url::parse(page_url).is_ok() {
        last_path_segment(page_url)
    } else {
        let trimmed = page_url.strip_suffix('/').unwrap_or(page_url);
        Some(entry_filename(trimmed).to_string()).filter(|s| !s.is_empty())
    };
    segment.unwrap_or_else(|| DEFAULT_TITLE.to_string())
}

/// File name an archive is saved under: sanitized title plus `.{extension}`.
pub fn volume_archive_name(page_url: &str, extension: &str) -> String {
    let title = sanitize_filename(&volume_title(page_url));
    let title = if title.is_empty() {
        DEFAULT_TITLE.to_string()
    } else {
        title
    };
    let extension = extension.trim_start_matches('.');
    if extension.is_empty() {
        title
    } else {
        format!("{title}.{extension}")
    }
}

/// Trims whitespace and upgrades insecure `http://` links to `https://`.
pub fn normalize_image_link(link: &str) -> String {
    let link = link.trim();
    match link.strip_prefix("http://") {
        Some(rest) => format!("https://{rest}"),
        None => link.to_string(),
    }
}
