//! Sequential model: one item at a time, strictly in input order.

use super::{fetch_item, BatchOptions, ItemResult, ProgressReporter};
use crate::fetch::Fetcher;

pub(super) fn run<F>(
    fetcher: &F,
    locators: &[String],
    options: &BatchOptions,
    reporter: &ProgressReporter<'_>,
) -> Vec<ItemResult>
where
    F: Fetcher + ?Sized,
{
    locators
        .iter()
        .enumerate()
        .map(|(index, locator)| {
            let result = fetch_item(fetcher, locator, options);
            if let Err(e) = &result {
                tracing::debug!(index, "item failed: {}", e);
            }
            reporter.emit(index + 1);
            result
        })
        .collect()
}
