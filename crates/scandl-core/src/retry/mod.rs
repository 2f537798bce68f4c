//! Retry policy for page, image and volume fetches.
//!
//! Every fetch in scandl goes through the same bounded policy: a fixed
//! attempt budget, an optional fixed delay, and an explicit choice of which
//! failures are retried (`RetryOn`).

mod error;
mod policy;
mod run;

pub use error::{FetchError, FetchExhausted};
pub use policy::{RetryDecision, RetryOn, RetryPolicy};
pub use run::{fetch_with_retry, run_with_retry, Exhausted};
