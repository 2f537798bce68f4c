use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::archive::Compression;
use crate::retry::{RetryOn, RetryPolicy};

/// Retry policy parameters (optional section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Attempts per HTML page fetch (including the first).
    pub page_max_attempts: u32,
    /// Attempts per image fetch (including the first).
    pub image_max_attempts: u32,
    /// Whole-volume attempts when downloading a catalogue.
    pub volume_max_attempts: u32,
    /// Which failures are retried: "any" (transport + non-2xx) or "transport".
    #[serde(default)]
    pub retry_on: RetryOn,
    /// Fixed delay between attempts in milliseconds (0 = retry immediately).
    #[serde(default)]
    pub delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            page_max_attempts: 3,
            image_max_attempts: 10,
            volume_max_attempts: 3,
            retry_on: RetryOn::Any,
            delay_ms: 0,
        }
    }
}

impl RetryConfig {
    fn policy(&self, max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            max_attempts: max_attempts.max(1),
            delay: Duration::from_millis(self.delay_ms),
            retry_on: self.retry_on,
        }
    }

    pub fn page_policy(&self) -> RetryPolicy {
        self.policy(self.page_max_attempts)
    }

    pub fn image_policy(&self) -> RetryPolicy {
        self.policy(self.image_max_attempts)
    }

    pub fn volume_policy(&self) -> RetryPolicy {
        self.policy(self.volume_max_attempts)
    }
}

/// Batch scheduling: one image at a time, or a bounded pool of workers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BatchMode {
    #[default]
    Sequential,
    Concurrent,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    pub mode: BatchMode,
    /// Worker threads in concurrent mode.
    pub max_concurrent: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            mode: BatchMode::Sequential,
            max_concurrent: 8,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    pub user_agent: String,
    pub connect_timeout_secs: u64,
    /// Hard limit for one request attempt.
    pub timeout_secs: u64,
    /// Send the volume page URL as `Referer` when fetching its images.
    pub send_referer: bool,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: concat!("scandl/", env!("CARGO_PKG_VERSION")).to_string(),
            connect_timeout_secs: 30,
            timeout_secs: 300,
            send_referer: true,
        }
    }
}

/// Global configuration loaded from `~/.config/scandl/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScandlConfig {
    /// Extension appended to volume titles (without the dot).
    pub archive_extension: String,
    /// Zip entry compression: "stored" or "deflated".
    #[serde(default)]
    pub compression: Compression,
    /// Directory archives are saved to (None = current directory).
    #[serde(default)]
    pub output_dir: Option<PathBuf>,
    /// Optional retry policy; if missing, built-in defaults are used.
    #[serde(default)]
    pub retry: Option<RetryConfig>,
    #[serde(default)]
    pub batch: Option<BatchConfig>,
    #[serde(default)]
    pub http: Option<HttpConfig>,
}

impl Default for ScandlConfig {
    fn default() -> Self {
        Self {
            archive_extension: "cbz".to_string(),
            compression: Compression::Deflated,
            output_dir: None,
            retry: None,
            batch: None,
            http: None,
        }
    }
}

impl ScandlConfig {
    pub fn retry(&self) -> RetryConfig {
        self.retry.clone().unwrap_or_default()
    }

    pub fn batch(&self) -> BatchConfig {
        self.batch.clone().unwrap_or_default()
    }

    pub fn http(&self) -> HttpConfig {
        self.http.clone().unwrap_or_default()
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("scandl")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<ScandlConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = ScandlConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: ScandlConfig = toml::from_str(&data)?;
    Ok(cfg)
}
