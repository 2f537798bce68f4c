//! libcurl-backed `Fetcher`: one GET per call, body buffered in memory.

use std::collections::HashMap;
use std::time::Duration;

use super::{probe, FetchResponse, Fetcher, ProbeResult, RequestOptions};
use crate::config::HttpConfig;
use crate::retry::FetchError;

/// Transfer settings applied to every request.
#[derive(Debug, Clone)]
pub struct CurlOptions {
    pub user_agent: String,
    pub connect_timeout: Duration,
    /// Hard limit for a whole transfer.
    pub timeout: Duration,
}

impl Default for CurlOptions {
    fn default() -> Self {
        Self::from_config(&HttpConfig::default())
    }
}

impl CurlOptions {
    pub fn from_config(http: &HttpConfig) -> Self {
        Self {
            user_agent: http.user_agent.clone(),
            connect_timeout: Duration::from_secs(http.connect_timeout_secs),
            timeout: Duration::from_secs(http.timeout_secs),
        }
    }
}

/// Blocking HTTP client. Cheap to share: each call builds its own Easy handle.
#[derive(Debug, Clone, Default)]
pub struct CurlFetcher {
    opts: CurlOptions,
}

impl CurlFetcher {
    pub fn new(opts: CurlOptions) -> Self {
        Self { opts }
    }

    pub fn options(&self) -> &CurlOptions {
        &self.opts
    }
}

/// Build a curl header list from `Name: value` pairs.
pub(super) fn header_list(headers: &HashMap<String, String>) -> Result<curl::easy::List, curl::Error> {
    let mut list = curl::easy::List::new();
    for (k, v) in headers {
        list.append(&format!("{}: {}", k.trim(), v.trim()))?;
    }
    Ok(list)
}

impl Fetcher for CurlFetcher {
    fn get(&self, url: &str, options: &RequestOptions) -> Result<FetchResponse, FetchError> {
        let mut body: Vec<u8> = Vec::new();

        let mut easy = curl::easy::Easy::new();
        easy.url(url)?;
        easy.follow_location(true)?;
        easy.max_redirections(10)?;
        easy.useragent(&self.opts.user_agent)?;
        easy.accept_encoding("")?;
        easy.connect_timeout(self.opts.connect_timeout)?;
        easy.timeout(self.opts.timeout)?;

        if !options.headers.is_empty() {
            easy.http_headers(header_list(&options.headers)?)?;
        }

        {
            let mut transfer = easy.transfer();
            transfer.write_function(|data| {
                body.extend_from_slice(data);
                Ok(data.len())
            })?;
            transfer.perform()?;
        }

        let status = easy.response_code()?;
        let content_type = easy.content_type()?.map(str::to_string);
        tracing::trace!(url, status, bytes = body.len(), "GET done");

        Ok(FetchResponse {
            status,
            content_type,
            body,
        })
    }

    fn head(&self, url: &str, options: &RequestOptions) -> Result<ProbeResult, FetchError> {
        probe(url, &options.headers, &self.opts)
    }
}
