//! In-memory `Fetcher` with scripted per-URL outcomes, for unit tests.

use std::collections::HashMap;
use std::sync::Mutex;

use super::{FetchResponse, Fetcher, RequestOptions};
use crate::retry::FetchError;

#[derive(Debug, Clone)]
enum Script {
    /// Transport error for the first `fail_first` attempts, then 200 with `body`.
    Flaky { fail_first: u32, body: Vec<u8> },
    /// Always answers with this status and an empty body.
    Status(u32),
}

#[derive(Default)]
pub(crate) struct ScriptedFetcher {
    scripts: HashMap<String, Script>,
    attempts: Mutex<HashMap<String, u32>>,
    requests: Mutex<Vec<(String, RequestOptions)>>,
}

impl ScriptedFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ok(self, url: &str, body: &[u8]) -> Self {
        self.fail_first(url, 0, body)
    }

    pub fn fail_first(mut self, url: &str, fail_first: u32, body: &[u8]) -> Self {
        self.scripts.insert(
            url.to_string(),
            Script::Flaky {
                fail_first,
                body: body.to_vec(),
            },
        );
        self
    }

    pub fn always_fail(self, url: &str) -> Self {
        self.fail_first(url, u32::MAX, b"")
    }

    pub fn status(mut self, url: &str, status: u32) -> Self {
        self.scripts.insert(url.to_string(), Script::Status(status));
        self
    }

    pub fn attempts(&self, url: &str) -> u32 {
        self.attempts
            .lock()
            .unwrap()
            .get(url)
            .copied()
            .unwrap_or(0)
    }

    /// Every request made, in order.
    pub fn requests(&self) -> Vec<(String, RequestOptions)> {
        self.requests.lock().unwrap().clone()
    }
}

/// `CURLE_COULDNT_CONNECT`. `CURLcode` width varies by platform.
fn connect_failed() -> FetchError {
    FetchError::Transport(curl::Error::new(7))
}

impl Fetcher for ScriptedFetcher {
    fn get(&self, url: &str, options: &RequestOptions) -> Result<FetchResponse, FetchError> {
        let attempt = {
            let mut attempts = self.attempts.lock().unwrap();
            let n = attempts.entry(url.to_string()).or_insert(0);
            *n += 1;
            *n
        };
        self.requests
            .lock()
            .unwrap()
            .push((url.to_string(), options.clone()));

        match self.scripts.get(url) {
            Some(Script::Flaky { fail_first, body }) if attempt > *fail_first => {
                Ok(FetchResponse {
                    status: 200,
                    content_type: None,
                    body: body.clone(),
                })
            }
            Some(Script::Status(status)) => Ok(FetchResponse {
                status: *status,
                content_type: None,
                body: Vec::new(),
            }),
            Some(Script::Flaky { .. }) | None => {
                Err(connect_failed())
            }
        }
    }
}

mod tests {
    use super::*;

    #[test]
    fn unscripted_url_is_a_connect_failure() {
        let fetcher = ScriptedFetcher::new();
        match fetcher.get("https://x/none.jpg", &RequestOptions::default()) {
            Err(FetchError::Transport(e)) => assert!(e.is_couldnt_connect()),
            other => panic!("expected transport error, got {other:?}"),
        }
        assert_eq!(fetcher.attempts("https://x/none.jpg"), 1);
    }

    #[test]
    fn pending_failures_then_body() {
        let fetcher = ScriptedFetcher::new().fail_first("https://x/1.jpg", 1, b"ok");
        let opts = RequestOptions::default();
        assert!(fetcher.get("https://x/1.jpg", &opts).is_err());
        assert_eq!(fetcher.get("https://x/1.jpg", &opts).unwrap().body, b"ok");
    }
}
