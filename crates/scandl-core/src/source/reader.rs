//! Image list embedded in a reader script: `ts_reader.run({...})`.

use anyhow::{Context, Result};
use regex::Regex;
use serde::Deserialize;
use std::sync::OnceLock;

#[derive(Debug, Deserialize)]
struct ReaderPayload {
    sources: Vec<ReaderSource>,
}

#[derive(Debug, Deserialize)]
struct ReaderSource {
    #[serde(default)]
    images: Vec<String>,
}

/// Marker that identifies a reader script.
pub(super) const READER_MARKER: &str = "ts_reader.run";

/// Compiled once per process.
fn reader_call() -> Result<&'static Regex> {
    static READER_CALL: OnceLock<Result<Regex, regex::Error>> = OnceLock::new();
    READER_CALL
        .get_or_init(|| Regex::new(r"ts_reader\.run\s*\(([^)]+)\)"))
        .as_ref()
        .map_err(|e| anyhow::anyhow!("reader regex: {e}"))
}

/// Images of the first source of every `ts_reader.run(...)` call in `script`.
/// When a script holds several calls the last one wins. `Ok(None)` when
/// there is no call at all.
pub(super) fn images_from_script(script: &str) -> Result<Option<Vec<String>>> {
    let re = reader_call()?;
    let mut images = None;
    for caps in re.captures_iter(script) {
        let payload = caps[1].trim();
        let parsed: ReaderPayload =
            serde_json::from_str(payload).context("invalid ts_reader payload")?;
        let first = parsed
            .sources
            .into_iter()
            .next()
            .context("ts_reader payload has no sources")?;
        images = Some(first.images);
    }
    Ok(images)
}
