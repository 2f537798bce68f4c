//! Fetch error types for retry decisions.

use thiserror::Error;

/// Error returned by a single fetch attempt (transport failure or HTTP error).
#[derive(Debug, Error)]
pub enum FetchError {
    /// Curl reported an error (timeout, connection, DNS, etc.).
    #[error(transparent)]
    Transport(#[from] curl::Error),
    /// HTTP response had a non-2xx status.
    #[error("HTTP {0}")]
    Http(u32),
}

/// A resource could not be retrieved within the attempt budget.
///
/// The last attempt's error is part of the message, not a `source`.
#[derive(Debug, Error)]
#[error("failed to fetch {url} after {attempts} attempt(s): {cause}")]
pub struct FetchExhausted {
    pub url: String,
    pub attempts: u32,
    pub cause: FetchError,
}

impl FetchExhausted {
    /// HTTP status of the last attempt, if it got that far.
    pub fn status(&self) -> Option<u32> {
        match self.cause {
            FetchError::Http(code) => Some(code),
            FetchError::Transport(_) => None,
        }
    }
}
