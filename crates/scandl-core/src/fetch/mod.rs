//! HTTP fetching.
//!
//! The engine only depends on the `Fetcher` trait; `CurlFetcher` is the
//! libcurl-backed implementation used by the CLI. All calls block the
//! current thread; use `spawn_blocking` from async code.

mod client;
mod parse;
mod probe;
#[cfg(test)]
pub(crate) mod testing;

use std::collections::HashMap;

use crate::retry::FetchError;

pub use client::{CurlFetcher, CurlOptions};
pub use probe::{probe, ProbeResult};

/// Per-request transport options, passed through to the fetcher unchanged.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// Extra request headers (e.g. `Referer`).
    pub headers: HashMap<String, String>,
}

impl RequestOptions {
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.insert(name.to_string(), value.to_string());
        self
    }

    /// Options carrying `Referer: <url>`.
    pub fn referer(url: &str) -> Self {
        Self::default().with_header("Referer", url)
    }
}

/// Response of a completed GET (any status).
#[derive(Debug, Clone)]
pub struct FetchResponse {
    pub status: u32,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl FetchResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Body decoded as UTF-8, replacing invalid sequences.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// A blocking GET transport.
///
/// Returns `Err` only for transport failures; any HTTP status is an `Ok`
/// response and the retry layer decides what a failure is.
pub trait Fetcher: Send + Sync {
    fn get(&self, url: &str, options: &RequestOptions) -> Result<FetchResponse, FetchError>;

    /// Metadata-only request. Defaults to a full GET.
    fn head(&self, url: &str, options: &RequestOptions) -> Result<ProbeResult, FetchError> {
        let response = self.get(url, options)?;
        Ok(ProbeResult {
            status: response.status,
            content_length: Some(response.body.len() as u64),
            content_type: response.content_type,
        })
    }
}
