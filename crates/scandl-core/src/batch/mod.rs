//! Batch archiver: fetch an ordered list of image locators and package them
//! into one archive.
//!
//! Every locator is attempted even when earlier ones fail. Progress is
//! reported as `{0, N}` up front and `{settled, N}` after each item. If any
//! item failed, the batch fails with every item's message and the fetched
//! images are discarded; otherwise the archive bytes are returned with
//! entries in input order.

mod concurrent;
mod progress;
mod sequential;
#[cfg(test)]
mod tests;

use thiserror::Error;

use crate::archive::{ArchiveBuilder, ArchiveEntry, ArchiveError, Compression};
use crate::config::{BatchMode, ScandlConfig};
use crate::fetch::{Fetcher, RequestOptions};
use crate::retry::{fetch_with_retry, FetchExhausted, RetryPolicy};
use crate::url_model::entry_filename;

pub use progress::{ChannelUnavailable, NoProgress, ProgressEvent, ProgressSink};
pub(crate) use progress::ProgressReporter;

/// How a batch is fetched and packaged.
#[derive(Debug, Clone)]
pub struct BatchOptions {
    pub mode: BatchMode,
    /// Worker threads in concurrent mode.
    pub max_concurrent: usize,
    /// Retry policy applied to each image.
    pub retry: RetryPolicy,
    pub compression: Compression,
    /// Passed to every image request.
    pub request: RequestOptions,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            mode: BatchMode::Sequential,
            max_concurrent: 8,
            retry: RetryPolicy::with_attempts(10),
            compression: Compression::Deflated,
            request: RequestOptions::default(),
        }
    }
}

impl BatchOptions {
    pub fn from_config(cfg: &ScandlConfig) -> Self {
        let batch = cfg.batch();
        Self {
            mode: batch.mode,
            max_concurrent: batch.max_concurrent.max(1),
            retry: cfg.retry().image_policy(),
            compression: cfg.compression,
            request: RequestOptions::default(),
        }
    }
}

/// Why a single item of a batch failed.
#[derive(Debug, Error)]
pub enum ItemError {
    #[error(transparent)]
    Exhausted(#[from] FetchExhausted),
    /// Non-2xx response handed back under `RetryOn::Transport`.
    #[error("failed to download image {url}: HTTP {status}")]
    Status { url: String, status: u32 },
    #[error("download of {url} did not complete")]
    Unfinished { url: String },
}

/// One failed item, kept for the aggregated batch error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemFailure {
    pub index: usize,
    pub locator: String,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum BatchError {
    /// At least one item failed; no archive is produced.
    #[error("failed to download {} of {total} image(s):\n{}", .failures.len(), join_messages(.failures))]
    PartialFailure {
        failures: Vec<ItemFailure>,
        total: usize,
    },
    #[error("failed to build archive: {0}")]
    Archive(#[from] ArchiveError),
}

fn join_messages(failures: &[ItemFailure]) -> String {
    failures
        .iter()
        .map(|f| f.message.as_str())
        .collect::<Vec<_>>()
        .join(",\n ")
}

pub(crate) type ItemResult = Result<Vec<u8>, ItemError>;

/// Fetch one image with the batch retry policy.
pub(crate) fn fetch_item<F>(fetcher: &F, locator: &str, options: &BatchOptions) -> ItemResult
where
    F: Fetcher + ?Sized,
{
    let response = fetch_with_retry(fetcher, locator, &options.request, &options.retry)?;
    if !response.is_success() {
        return Err(ItemError::Status {
            url: locator.to_string(),
            status: response.status,
        });
    }
    Ok(response.body)
}

/// Fetch every locator and return the finished archive, or the aggregated
/// failure if any item could not be fetched.
pub fn archive_from_locators<F>(
    fetcher: &F,
    locators: &[String],
    options: &BatchOptions,
    progress: &dyn ProgressSink,
) -> Result<Vec<u8>, BatchError>
where
    F: Fetcher + ?Sized,
{
    let total = locators.len();
    let reporter = ProgressReporter::new(progress, total);
    tracing::info!(total, mode = ?options.mode, "batch started");
    reporter.emit(0);

    let results = match options.mode {
        BatchMode::Sequential => sequential::run(fetcher, locators, options, &reporter),
        BatchMode::Concurrent => concurrent::run(fetcher, locators, options, &reporter),
    };

    let mut builder = ArchiveBuilder::new(options.compression);
    let mut failures = Vec::new();
    for (index, (locator, result)) in locators.iter().zip(results).enumerate() {
        match result {
            Ok(content) => builder.add(ArchiveEntry {
                filename: archive_entry_name(locator, index),
                content,
            }),
            Err(e) => failures.push(ItemFailure {
                index,
                locator: locator.clone(),
                message: e.to_string(),
            }),
        }
    }

    if !failures.is_empty() {
        tracing::warn!(failed = failures.len(), total, "batch failed");
        return Err(BatchError::PartialFailure { failures, total });
    }

    let bytes = builder.finish()?;
    tracing::info!(total, bytes = bytes.len(), "batch archived");
    Ok(bytes)
}

/// Entry name for `locator`; locators ending in `/` get a positional name.
fn archive_entry_name(locator: &str, index: usize) -> String {
    match entry_filename(locator) {
        "" => format!("{:03}", index + 1),
        name => name.to_string(),
    }
}
