//! Retry loop: run a closure until success or the policy says stop.

use std::fmt;

use super::error::{FetchError, FetchExhausted};
use super::policy::{RetryDecision, RetryPolicy};
use crate::fetch::{FetchResponse, Fetcher, RequestOptions};

/// Last error of a retried operation together with the number of attempts made.
#[derive(Debug)]
pub struct Exhausted<E> {
    pub error: E,
    pub attempts: u32,
}

/// Runs `f` until it succeeds or the retry policy says to stop.
/// `f` receives the 1-based attempt number. Between attempts, sleeps for the
/// policy delay (no sleep when the delay is zero).
pub fn run_with_retry<T, E, F>(policy: &RetryPolicy, mut f: F) -> Result<T, Exhausted<E>>
where
    F: FnMut(u32) -> Result<T, E>,
    E: fmt::Display,
{
    let mut attempt = 1u32;
    loop {
        match f(attempt) {
            Ok(value) => return Ok(value),
            Err(error) => match policy.decide(attempt) {
                RetryDecision::NoRetry => {
                    return Err(Exhausted {
                        error,
                        attempts: attempt,
                    })
                }
                RetryDecision::RetryAfter(delay) => {
                    tracing::debug!(
                        attempt,
                        max_attempts = policy.max_attempts,
                        "attempt failed, retrying: {}",
                        error
                    );
                    if !delay.is_zero() {
                        std::thread::sleep(delay);
                    }
                    attempt += 1;
                }
            },
        }
    }
}

/// GET `url` through `fetcher`, retrying per `policy`.
///
/// With `RetryOn::Any` a non-2xx status is a failed attempt; with
/// `RetryOn::Transport` it is returned as-is and the caller checks it.
pub fn fetch_with_retry<F>(
    fetcher: &F,
    url: &str,
    options: &RequestOptions,
    policy: &RetryPolicy,
) -> Result<FetchResponse, FetchExhausted>
where
    F: Fetcher + ?Sized,
{
    run_with_retry(policy, |_| {
        let response = fetcher.get(url, options)?;
        if policy.status_is_failure(response.status) {
            return Err(FetchError::Http(response.status));
        }
        Ok(response)
    })
    .map_err(|e| {
        tracing::warn!(url, attempts = e.attempts, "fetch exhausted: {}", e.error);
        FetchExhausted {
            url: url.to_string(),
            attempts: e.attempts,
            cause: e.error,
        }
    })
}
