//! scandl core: fetch manga volumes from supported scan websites and pack
//! them into comic-book archives.

pub mod archive;
pub mod batch;
pub mod config;
pub mod fetch;
pub mod logging;
pub mod retry;
pub mod source;
pub mod storage;
pub mod url_model;
pub mod volume;

pub use batch::{archive_from_locators, BatchError, BatchOptions, ProgressEvent, ProgressSink};
pub use config::ScandlConfig;
pub use fetch::{CurlFetcher, Fetcher};
pub use source::{PageKind, UnsupportedSource, Website};
pub use volume::{DownloadOutcome, DownloadSettings, Downloader};
