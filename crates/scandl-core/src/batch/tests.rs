use std::io::{Cursor, Read};
use std::sync::mpsc;

use super::*;
use crate::fetch::testing::ScriptedFetcher;
use crate::retry::RetryOn;

fn locators(urls: &[&str]) -> Vec<String> {
    urls.iter().map(|u| u.to_string()).collect()
}

fn options(mode: BatchMode) -> BatchOptions {
    BatchOptions {
        mode,
        max_concurrent: 3,
        retry: RetryPolicy::with_attempts(3),
        ..BatchOptions::default()
    }
}

fn entries(bytes: Vec<u8>) -> Vec<(String, Vec<u8>)> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
    (0..archive.len())
        .map(|i| {
            let mut f = archive.by_index(i).unwrap();
            let mut buf = Vec::new();
            f.read_to_end(&mut buf).unwrap();
            (f.name().to_string(), buf)
        })
        .collect()
}

fn collect_progress(
    fetcher: &ScriptedFetcher,
    urls: &[String],
    opts: &BatchOptions,
) -> (Result<Vec<u8>, BatchError>, Vec<ProgressEvent>) {
    let (tx, rx) = mpsc::channel::<ProgressEvent>();
    let result = archive_from_locators(fetcher, urls, opts, &tx);
    drop(tx);
    (result, rx.iter().collect())
}

#[test]
fn two_successes_produce_two_entries() {
    let fetcher = ScriptedFetcher::new()
        .ok("https://x/1.jpg", b"one")
        .ok("https://x/2.jpg", b"two");
    let urls = locators(&["https://x/1.jpg", "https://x/2.jpg"]);
    let bytes = archive_from_locators(&fetcher, &urls, &options(BatchMode::Sequential), &NoProgress)
        .expect("batch should succeed");
    assert_eq!(
        entries(bytes),
        vec![
            ("1.jpg".to_string(), b"one".to_vec()),
            ("2.jpg".to_string(), b"two".to_vec()),
        ]
    );
}

#[test]
fn exhausted_item_fails_the_whole_batch() {
    let fetcher = ScriptedFetcher::new()
        .ok("https://x/a.jpg", b"a")
        .always_fail("https://x/bad.jpg");
    let urls = locators(&["https://x/a.jpg", "https://x/bad.jpg"]);
    let err = archive_from_locators(&fetcher, &urls, &options(BatchMode::Sequential), &NoProgress)
        .expect_err("batch should fail");
    let msg = err.to_string();
    assert!(msg.contains("bad.jpg"), "message: {msg}");
    assert!(msg.starts_with("failed to download 1 of 2 image(s)"));
    match err {
        BatchError::PartialFailure { failures, total } => {
            assert_eq!(total, 2);
            assert_eq!(failures.len(), 1);
            assert_eq!(failures[0].index, 1);
            assert_eq!(failures[0].locator, "https://x/bad.jpg");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(fetcher.attempts("https://x/bad.jpg"), 3);
}

#[test]
fn every_locator_is_attempted_after_a_failure() {
    let fetcher = ScriptedFetcher::new()
        .always_fail("https://x/1.jpg")
        .ok("https://x/2.jpg", b"2")
        .always_fail("https://x/3.jpg");
    let urls = locators(&["https://x/1.jpg", "https://x/2.jpg", "https://x/3.jpg"]);
    let err = archive_from_locators(&fetcher, &urls, &options(BatchMode::Sequential), &NoProgress)
        .unwrap_err();
    assert_eq!(fetcher.attempts("https://x/2.jpg"), 1);
    assert_eq!(fetcher.attempts("https://x/3.jpg"), 3);
    let msg = err.to_string();
    assert!(msg.contains("1.jpg") && msg.contains("3.jpg"));
    assert!(msg.contains(",\n "));
}

#[test]
fn flaky_item_recovers_within_budget() {
    let fetcher = ScriptedFetcher::new().fail_first("https://x/1.jpg", 2, b"ok");
    let urls = locators(&["https://x/1.jpg"]);
    let bytes = archive_from_locators(&fetcher, &urls, &options(BatchMode::Sequential), &NoProgress)
        .unwrap();
    assert_eq!(entries(bytes).len(), 1);
    assert_eq!(fetcher.attempts("https://x/1.jpg"), 3);
}

#[test]
fn sequential_progress_counts_up_to_total() {
    let fetcher = ScriptedFetcher::new()
        .ok("https://x/1.jpg", b"1")
        .always_fail("https://x/2.jpg")
        .ok("https://x/3.jpg", b"3");
    let urls = locators(&["https://x/1.jpg", "https://x/2.jpg", "https://x/3.jpg"]);
    let (result, events) = collect_progress(&fetcher, &urls, &options(BatchMode::Sequential));
    assert!(result.is_err());
    let currents: Vec<usize> = events.iter().map(|e| e.current).collect();
    assert_eq!(currents, vec![0, 1, 2, 3]);
    assert!(events.iter().all(|e| e.total == 3));
}

#[test]
fn concurrent_keeps_input_order_in_archive() {
    let mut fetcher = ScriptedFetcher::new();
    let names: Vec<String> = (1..=12).map(|i| format!("https://x/{i:02}.png")).collect();
    for (i, url) in names.iter().enumerate() {
        fetcher = fetcher.fail_first(url, (i % 3) as u32, url.as_bytes());
    }
    let (result, events) = collect_progress(&fetcher, &names, &options(BatchMode::Concurrent));
    let files = entries(result.expect("concurrent batch should succeed"));
    let got: Vec<&str> = files.iter().map(|(n, _)| n.as_str()).collect();
    let want: Vec<String> = (1..=12).map(|i| format!("{i:02}.png")).collect();
    assert_eq!(got, want);
    assert_eq!(files[4].1, names[4].as_bytes());

    let currents: Vec<usize> = events.iter().map(|e| e.current).collect();
    assert_eq!(currents, (0..=12).collect::<Vec<_>>());
}

#[test]
fn concurrent_aggregates_failures_in_input_order() {
    let fetcher = ScriptedFetcher::new()
        .always_fail("https://x/a.jpg")
        .ok("https://x/b.jpg", b"b")
        .always_fail("https://x/c.jpg");
    let urls = locators(&["https://x/a.jpg", "https://x/b.jpg", "https://x/c.jpg"]);
    let err = archive_from_locators(&fetcher, &urls, &options(BatchMode::Concurrent), &NoProgress)
        .unwrap_err();
    match err {
        BatchError::PartialFailure { failures, .. } => {
            let idx: Vec<usize> = failures.iter().map(|f| f.index).collect();
            assert_eq!(idx, vec![0, 2]);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn closed_progress_channel_does_not_fail_batch() {
    let fetcher = ScriptedFetcher::new().ok("https://x/1.jpg", b"1");
    let urls = locators(&["https://x/1.jpg"]);
    let (tx, rx) = mpsc::channel::<ProgressEvent>();
    drop(rx);
    let bytes = archive_from_locators(&fetcher, &urls, &options(BatchMode::Sequential), &tx)
        .expect("progress failures are not batch failures");
    assert_eq!(entries(bytes).len(), 1);
}

#[test]
fn empty_batch_yields_empty_archive() {
    let fetcher = ScriptedFetcher::new();
    for mode in [BatchMode::Sequential, BatchMode::Concurrent] {
        let (result, events) = collect_progress(&fetcher, &[], &options(mode));
        assert!(entries(result.unwrap()).is_empty());
        assert_eq!(events, vec![ProgressEvent { current: 0, total: 0 }]);
    }
}

#[test]
fn duplicate_names_overwrite() {
    let fetcher = ScriptedFetcher::new()
        .ok("https://x/a/1.jpg", b"first")
        .ok("https://x/b/1.jpg", b"second");
    let urls = locators(&["https://x/a/1.jpg", "https://x/b/1.jpg"]);
    let bytes = archive_from_locators(&fetcher, &urls, &options(BatchMode::Sequential), &NoProgress)
        .unwrap();
    assert_eq!(entries(bytes), vec![("1.jpg".to_string(), b"second".to_vec())]);
}

#[test]
fn transport_only_policy_reports_status_without_retrying() {
    let fetcher = ScriptedFetcher::new()
        .ok("https://x/1.jpg", b"1")
        .status("https://x/gone.jpg", 404);
    let urls = locators(&["https://x/1.jpg", "https://x/gone.jpg"]);
    let mut opts = options(BatchMode::Sequential);
    opts.retry.retry_on = RetryOn::Transport;
    let err = archive_from_locators(&fetcher, &urls, &opts, &NoProgress).unwrap_err();
    assert!(err
        .to_string()
        .contains("failed to download image https://x/gone.jpg: HTTP 404"));
    assert_eq!(fetcher.attempts("https://x/gone.jpg"), 1);
}

#[test]
fn request_options_reach_every_fetch() {
    let fetcher = ScriptedFetcher::new()
        .ok("https://x/1.jpg", b"1")
        .ok("https://x/2.jpg", b"2");
    let urls = locators(&["https://x/1.jpg", "https://x/2.jpg"]);
    let mut opts = options(BatchMode::Concurrent);
    opts.request = RequestOptions::referer("https://sushiscan.net/vol-1/");
    archive_from_locators(&fetcher, &urls, &opts, &NoProgress).unwrap();
    for (_, req) in fetcher.requests() {
        assert_eq!(
            req.headers.get("Referer").map(String::as_str),
            Some("https://sushiscan.net/vol-1/")
        );
    }
}

#[test]
fn options_from_config() {
    let mut cfg = ScandlConfig::default();
    cfg.batch = Some(crate::config::BatchConfig {
        mode: BatchMode::Concurrent,
        max_concurrent: 0,
    });
    let opts = BatchOptions::from_config(&cfg);
    assert_eq!(opts.mode, BatchMode::Concurrent);
    assert_eq!(opts.max_concurrent, 1);
    assert_eq!(opts.retry.max_attempts, 10);
}
