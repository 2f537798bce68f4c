//! Concurrent model: a bounded pool of worker threads pulls locators from a
//! shared queue. Results come back keyed by input index and are buffered in
//! slots, so callers see them in input order regardless of completion order.

use std::collections::VecDeque;
use std::sync::{mpsc, Mutex};
use std::thread;

use super::{fetch_item, BatchOptions, ItemError, ItemResult, ProgressReporter};
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
    let count = locators.len();
    if count == 0 {
        return Vec::new();
    }

    let queue: Mutex<VecDeque<(usize, &str)>> =
        Mutex::new(locators.iter().map(String::as_str).enumerate().collect());
    let num_workers = options.max_concurrent.clamp(1, count);
    let mut slots: Vec<Option<ItemResult>> = (0..count).map(|_| None).collect();

    thread::scope(|s| {
        let (tx, rx) = mpsc::channel::<(usize, ItemResult)>();
        for _ in 0..num_workers {
            let tx = tx.clone();
            let queue = &queue;
            s.spawn(move || loop {
                let next = match queue.lock() {
                    Ok(mut q) => q.pop_front(),
                    Err(_) => None,
                };
                let Some((index, locator)) = next else {
                    break;
                };
                let result = fetch_item(fetcher, locator, options);
                if tx.send((index, result)).is_err() {
                    break;
                }
            });
        }
        drop(tx);

        // Single consumer: `settled` is the only progress counter.
        let mut settled = 0usize;
        for (index, result) in rx {
            if let Err(e) = &result {
                tracing::debug!(index, "item failed: {}", e);
            }
            slots[index] = Some(result);
            settled += 1;
            reporter.emit(settled);
        }
    });

    slots
        .into_iter()
        .zip(locators)
        .map(|(slot, locator)| {
            slot.unwrap_or_else(|| {
                Err(ItemError::Unfinished {
                    url: locator.clone(),
                })
            })
        })
        .collect()
}
