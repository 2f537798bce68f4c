//! HTTP HEAD probing, used to check that a page's links are reachable
//! before committing to a download.

use std::collections::HashMap;
use std::str;
use super::client::{header_list, CurlOptions};
use super::parse;
use crate::retry::FetchError;

/// Result of a HEAD request: final status and the headers worth reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeResult {
    pub status: u32,
    /// Size in bytes, if `Content-Length` is present.
    pub content_length: Option<u64>,
    pub content_type: Option<String>,
}

impl ProbeResult {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Performs a HEAD request and returns the parsed metadata of the final response.
///
/// Follows up to 10 redirects and applies the User-Agent and timeouts from
/// `opts`. Any HTTP status is returned as `Ok`; only transport failures are
/// errors. Runs in the current thread.
pub fn probe(
    url: &str,
    custom_headers: &HashMap<String, String>,
    opts: &CurlOptions,
) -> Result<ProbeResult, FetchError> {
    let mut headers: Vec<String> = Vec::new();

    let mut easy = curl::easy::Easy::new();
    easy.url(url)?;
    easy.nobody(true)?; // HEAD request
    easy.follow_location(true)?;
    easy.max_redirections(10)?;
    easy.useragent(&opts.user_agent)?;
    easy.connect_timeout(opts.connect_timeout)?;
    easy.timeout(opts.timeout)?;

    if !custom_headers.is_empty() {
        easy.http_headers(header_list(custom_headers)?)?;
    }

    {
        let mut transfer = easy.transfer();
        transfer.header_function(|data| {
            if let Ok(s) = str::from_utf8(data) {
                headers.push(s.trim_end().to_string());
            }
            true
        })?;
        transfer.perform()?;
    }

    let status = easy.response_code()?;
    let meta = parse::parse_headers(&headers);
    Ok(ProbeResult {
        status,
        content_length: meta.content_length,
        content_type: meta.content_type,
    })
}
