//! Configuration types for fpds-task-orders

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::{
    path::{Path, PathBuf},
    time::Duration,
};

/// Default FPDS ATOM endpoint
pub const DEFAULT_FEED_URL: &str = "https://www.fpds.gov/ezsearch/FEEDS/ATOM";

/// FPDS ATOM feed client settings
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FeedConfig {
    /// Feed endpoint (default: the public FPDS ATOM feed)
    #[serde(default = "default_feed_url")]
    pub base_url: String,

    /// Value of the `FEEDNAME` query parameter (default: "PUBLIC")
    #[serde(default = "default_feed_name")]
    pub feed_name: String,

    /// Timeout for a single page request (default: 60 seconds)
    #[serde(default = "default_request_timeout", with = "duration_serde")]
    pub request_timeout: Duration,

    /// User-Agent header sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Upper bound on pages fetched for one query (default: 1000)
    ///
    /// FPDS serves ten entries per page. The bound only protects against a
    /// feed that keeps advertising a `next` link forever.
    #[serde(default = "default_max_pages")]
    pub max_pages: usize,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            base_url: default_feed_url(),
            feed_name: default_feed_name(),
            request_timeout: default_request_timeout(),
            user_agent: default_user_agent(),
            max_pages: default_max_pages(),
        }
    }
}

/// Retry configuration for transient page failures
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of retry attempts (default: 3)
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Initial delay before first retry (default: 2 seconds)
    #[serde(default = "default_initial_delay", with = "millis_serde")]
    pub initial_delay: Duration,

    /// Maximum delay between retries (default: 30 seconds)
    #[serde(default = "default_max_delay", with = "millis_serde")]
    pub max_delay: Duration,

    /// Multiplier for exponential backoff (default: 2.0)
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,

    /// Add random jitter to delays (default: true)
    #[serde(default = "default_true")]
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_delay: default_initial_delay(),
            max_delay: default_max_delay(),
            backoff_multiplier: default_backoff_multiplier(),
            jitter: true,
        }
    }
}

/// File locations for input, output, checkpoint and raw archive
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Contractor list (default: "data/parsed_contractors.json")
    pub input_file: PathBuf,

    /// Consolidated output (default: "data/wexmac_task_orders_fpds.json")
    pub output_file: PathBuf,

    /// Completed-identifier list (default: "data/fpds_fetch_progress.json")
    pub progress_file: PathBuf,

    /// Raw response archive directory (default: "data/raw/fpds")
    pub raw_dir: PathBuf,
}

impl PathsConfig {
    /// Default layout rooted at a project directory
    pub fn rooted_at(project_dir: &Path) -> Self {
        let data = project_dir.join("data");
        Self {
            input_file: data.join("parsed_contractors.json"),
            output_file: data.join("wexmac_task_orders_fpds.json"),
            progress_file: data.join("fpds_fetch_progress.json"),
            raw_dir: data.join("raw").join("fpds"),
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self::rooted_at(Path::new("."))
    }
}

/// Batch loop pacing
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Fixed sleep before every fresh query (default: 1000 ms)
    #[serde(default = "default_request_delay", with = "millis_serde")]
    pub request_delay: Duration,

    /// Flush consolidated output every N contractors (default: 20)
    #[serde(default = "default_flush_every")]
    pub flush_every: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            request_delay: default_request_delay(),
            flush_every: default_flush_every(),
        }
    }
}

/// Descriptive strings written into the output metadata block
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MetadataConfig {
    /// Free-text description of the dataset
    #[serde(default = "default_description")]
    pub description: String,

    /// Upstream source name
    #[serde(default = "default_source")]
    pub source: String,

    /// How the records were queried
    #[serde(default = "default_query_method")]
    pub query_method: String,
}

impl Default for MetadataConfig {
    fn default() -> Self {
        Self {
            description: default_description(),
            source: default_source(),
            query_method: default_query_method(),
        }
    }
}

/// Main configuration
///
/// Every field has a default, so an empty JSON object is a valid config file.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Config {
    /// Feed client settings
    #[serde(default)]
    pub feed: FeedConfig,

    /// Retry settings for feed page requests
    #[serde(default)]
    pub retry: RetryConfig,

    /// File locations
    #[serde(default)]
    pub paths: PathsConfig,

    /// Batch pacing
    #[serde(default)]
    pub batch: BatchConfig,

    /// Output metadata strings
    #[serde(default)]
    pub metadata: MetadataConfig,
}

impl Config {
    /// Defaults with every path rooted at `project_dir/data`
    pub fn from_project_dir(project_dir: impl AsRef<Path>) -> Self {
        Self {
            paths: PathsConfig::rooted_at(project_dir.as_ref()),
            ..Default::default()
        }
    }

    /// Build a config from the process environment
    ///
    /// - `FPDS_CONFIG`: JSON config file; its values replace the defaults
    /// - `FPDS_PROJECT_DIR`: root for the default `data/` paths (default: ".")
    /// - `FPDS_FEED_URL`: feed endpoint override
    /// - `FPDS_REQUEST_DELAY_MS`: fixed delay between queries
    ///
    /// Paths given in the config file win over `FPDS_PROJECT_DIR`.
    pub fn from_env() -> Result<Self> {
        let project_dir = std::env::var_os("FPDS_PROJECT_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));

        let mut config = match std::env::var_os("FPDS_CONFIG") {
            Some(path) => Self::load_with_root(Path::new(&path), &project_dir)?,
            None => Self::from_project_dir(&project_dir),
        };

        if let Ok(url) = std::env::var("FPDS_FEED_URL") {
            config.feed.base_url = url;
        }

        if let Ok(raw) = std::env::var("FPDS_REQUEST_DELAY_MS") {
            let millis = raw.trim().parse::<u64>().map_err(|e| {
                Error::config(
                    format!("FPDS_REQUEST_DELAY_MS must be an integer: {}", e),
                    "batch.request_delay",
                )
            })?;
            config.batch.request_delay = Duration::from_millis(millis);
        }

        config.validate()?;
        Ok(config)
    }

    /// Load a JSON config file, filling missing paths from `project_dir`
    pub fn load_with_root(path: &Path, project_dir: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            Error::config(
                format!("cannot read config file {}: {}", path.display(), e),
                "FPDS_CONFIG",
            )
        })?;

        // Paths are not individually defaulted by serde, so merge them onto the
        // rooted layout before deserializing.
        let mut value: serde_json::Value = serde_json::from_str(&text)?;
        let rooted = serde_json::to_value(PathsConfig::rooted_at(project_dir))?;
        if let Some(obj) = value.as_object_mut() {
            let paths = obj
                .entry("paths")
                .or_insert_with(|| serde_json::Value::Object(Default::default()));
            if let (Some(paths), Some(defaults)) = (paths.as_object_mut(), rooted.as_object()) {
                for (key, default) in defaults {
                    paths.entry(key.clone()).or_insert_with(|| default.clone());
                }
            }
        }

        Ok(serde_json::from_value(value)?)
    }

    /// Reject settings the batch cannot run with
    pub fn validate(&self) -> Result<()> {
        url::Url::parse(&self.feed.base_url).map_err(|e| {
            Error::config(
                format!("invalid feed URL '{}': {}", self.feed.base_url, e),
                "feed.base_url",
            )
        })?;

        if self.batch.flush_every == 0 {
            return Err(Error::config(
                "flush_every must be at least 1",
                "batch.flush_every",
            ));
        }

        if self.feed.max_pages == 0 {
            return Err(Error::config(
                "max_pages must be at least 1",
                "feed.max_pages",
            ));
        }

        Ok(())
    }
}

fn default_feed_url() -> String {
    DEFAULT_FEED_URL.to_string()
}

fn default_feed_name() -> String {
    "PUBLIC".to_string()
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(60)
}

fn default_user_agent() -> String {
    concat!("fpds-task-orders/", env!("CARGO_PKG_VERSION")).to_string()
}

fn default_max_pages() -> usize {
    1000
}

fn default_max_attempts() -> u32 {
    3
}

fn default_initial_delay() -> Duration {
    Duration::from_secs(2)
}

fn default_max_delay() -> Duration {
    Duration::from_secs(30)
}

fn default_backoff_multiplier() -> f64 {
    2.0
}

fn default_true() -> bool {
    true
}

fn default_request_delay() -> Duration {
    Duration::from_millis(1000)
}

fn default_flush_every() -> usize {
    20
}

fn default_description() -> String {
    "WEXMAC TITUS task orders from FPDS ATOM feed".to_string()
}

fn default_source() -> String {
    "FPDS (Federal Procurement Data System)".to_string()
}

fn default_query_method() -> String {
    "REF_IDV_PIID for each N00023-25-D-* IDV".to_string()
}

// Duration serialization helper
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

// Millisecond variant for sub-second delays
mod millis_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}
