//! Configuration types for vidmerge

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::{net::SocketAddr, path::PathBuf, time::Duration};
use utoipa::ToSchema;

/// Where merged files live and how they are addressed publicly
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct StorageConfig {
    /// Directory holding produced files, served read-only (default: "./output")
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Parent directory for per-request working areas (None = system temp dir)
    #[serde(default)]
    pub work_dir: Option<PathBuf>,

    /// URL path prefix under which `output_dir` is served (default: "/files")
    #[serde(default = "default_files_prefix")]
    pub files_prefix: String,

    /// Fixed public base URL, e.g. "https://media.example.com"
    ///
    /// When unset the base is derived from each inbound request's scheme and host.
    #[serde(default)]
    pub public_base_url: Option<String>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            work_dir: None,
            files_prefix: default_files_prefix(),
            public_base_url: None,
        }
    }
}

/// Lifetimes of produced files
///
/// The per-file timer and the directory sweep deliberately overlap: the timer
/// is the primary mechanism, the sweep reclaims anything a timer missed (for
/// example across a restart). Their thresholds are independent.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct RetentionConfig {
    /// Delay before a produced file is deleted (default: 60 seconds)
    #[serde(default = "default_expiry_delay", with = "duration_serde")]
    #[schema(value_type = u64)]
    pub expiry_delay: Duration,

    /// Age after which the sweep deletes an output file (default: 120 seconds)
    #[serde(default = "default_sweep_max_age", with = "duration_serde")]
    #[schema(value_type = u64)]
    pub sweep_max_age: Duration,

    /// Interval of the background sweep (default: 30 seconds, 0 = disabled)
    #[serde(default = "default_sweep_interval", with = "duration_serde")]
    #[schema(value_type = u64)]
    pub sweep_interval: Duration,
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            expiry_delay: default_expiry_delay(),
            sweep_max_age: default_sweep_max_age(),
            sweep_interval: default_sweep_interval(),
        }
    }
}

/// Source download limits
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct DownloadConfig {
    /// Maximum size of a single source in bytes (default: 500 MiB)
    #[serde(default = "default_max_bytes")]
    pub max_bytes: u64,

    /// TCP/TLS connect timeout (default: 10 seconds)
    #[serde(default = "default_connect_timeout", with = "duration_serde")]
    #[schema(value_type = u64)]
    pub connect_timeout: Duration,

    /// Maximum wait for the response headers or for any single body read (default: 120 seconds)
    #[serde(default = "default_read_timeout", with = "duration_serde")]
    #[schema(value_type = u64)]
    pub read_timeout: Duration,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            max_bytes: default_max_bytes(),
            connect_timeout: default_connect_timeout(),
            read_timeout: default_read_timeout(),
        }
    }
}

/// External tool configuration
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ToolsConfig {
    /// Path to ffmpeg executable (auto-detected if None)
    #[serde(default)]
    pub ffmpeg_path: Option<PathBuf>,

    /// Whether to search PATH for ffmpeg if no explicit path is set (default: true)
    #[serde(default = "default_true")]
    pub search_path: bool,

    /// Maximum number of characters of tool output surfaced to callers (default: 2000)
    #[serde(default = "default_output_limit")]
    pub output_limit: usize,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: None,
            search_path: true,
            output_limit: default_output_limit(),
        }
    }
}

/// REST API configuration
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiConfig {
    /// Address to bind to (default: 0.0.0.0:8000)
    #[serde(default = "default_bind_address")]
    #[schema(value_type = String)]
    pub bind_address: SocketAddr,

    /// Enable CORS for browser access (default: true)
    #[serde(default = "default_true")]
    pub cors_enabled: bool,

    /// Allowed CORS origins (default: ["*"])
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,

    /// Enable Swagger UI at /swagger-ui (default: true)
    #[serde(default = "default_true")]
    pub swagger_ui: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            cors_enabled: true,
            cors_origins: default_cors_origins(),
            swagger_ui: true,
        }
    }
}

/// Main configuration for the merge service
///
/// Built once at startup (see [`Config::from_env`]) and handed to
/// [`MergeService`](crate::MergeService) and the API router.
#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct Config {
    /// Output directory and public addressing
    #[serde(default)]
    pub storage: StorageConfig,

    /// File lifetimes
    #[serde(default)]
    pub retention: RetentionConfig,

    /// Source download limits
    #[serde(default)]
    pub download: DownloadConfig,

    /// External tool paths
    #[serde(default)]
    pub tools: ToolsConfig,

    /// REST API settings
    #[serde(default)]
    pub api: ApiConfig,
}

impl Config {
    /// Build a configuration from process environment variables
    ///
    /// Unset variables fall back to defaults. See [`Config::from_lookup`] for the
    /// recognised keys.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from an arbitrary key lookup
    ///
    /// Recognised keys: `OUTPUT_DIR`, `WORK_DIR`, `FILES_PREFIX`, `PUBLIC_BASE_URL`,
    /// `EXPIRY_SECONDS`, `SWEEP_MAX_AGE_SECONDS`, `SWEEP_INTERVAL_SECONDS`,
    /// `MAX_DOWNLOAD_BYTES`, `CONNECT_TIMEOUT_SECONDS`, `READ_TIMEOUT_SECONDS`,
    /// `FFMPEG_PATH`, `FFMPEG_SEARCH_PATH`, `TOOL_OUTPUT_LIMIT`, `BIND_ADDRESS`,
    /// `CORS_ENABLED`, `CORS_ORIGINS`, `SWAGGER_UI`.
    ///
    /// Empty values are treated as unset. The result is validated before it is
    /// returned.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Config::default();

        if let Some(dir) = get("OUTPUT_DIR") {
            config.storage.output_dir = PathBuf::from(dir);
        }
        if let Some(dir) = get("WORK_DIR") {
            config.storage.work_dir = Some(PathBuf::from(dir));
        }
        if let Some(prefix) = get("FILES_PREFIX") {
            config.storage.files_prefix = prefix;
        }
        config.storage.public_base_url = get("PUBLIC_BASE_URL");

        if let Some(v) = get("EXPIRY_SECONDS") {
            config.retention.expiry_delay = parse_secs("EXPIRY_SECONDS", &v)?;
        }
        if let Some(v) = get("SWEEP_MAX_AGE_SECONDS") {
            config.retention.sweep_max_age = parse_secs("SWEEP_MAX_AGE_SECONDS", &v)?;
        }
        if let Some(v) = get("SWEEP_INTERVAL_SECONDS") {
            config.retention.sweep_interval = parse_secs("SWEEP_INTERVAL_SECONDS", &v)?;
        }

        if let Some(v) = get("MAX_DOWNLOAD_BYTES") {
            config.download.max_bytes = parse_value("MAX_DOWNLOAD_BYTES", &v)?;
        }
        if let Some(v) = get("CONNECT_TIMEOUT_SECONDS") {
            config.download.connect_timeout = parse_secs("CONNECT_TIMEOUT_SECONDS", &v)?;
        }
        if let Some(v) = get("READ_TIMEOUT_SECONDS") {
            config.download.read_timeout = parse_secs("READ_TIMEOUT_SECONDS", &v)?;
        }

        if let Some(path) = get("FFMPEG_PATH") {
            config.tools.ffmpeg_path = Some(PathBuf::from(path));
        }
        if let Some(v) = get("FFMPEG_SEARCH_PATH") {
            config.tools.search_path = parse_bool("FFMPEG_SEARCH_PATH", &v)?;
        }
        if let Some(v) = get("TOOL_OUTPUT_LIMIT") {
            config.tools.output_limit = parse_value("TOOL_OUTPUT_LIMIT", &v)?;
        }

        if let Some(v) = get("BIND_ADDRESS") {
            config.api.bind_address = parse_value("BIND_ADDRESS", &v)?;
        }
        if let Some(v) = get("CORS_ENABLED") {
            config.api.cors_enabled = parse_bool("CORS_ENABLED", &v)?;
        }
        if let Some(v) = get("CORS_ORIGINS") {
            config.api.cors_origins = v
                .split(',')
                .map(|o| o.trim().to_string())
                .filter(|o| !o.is_empty())
                .collect();
        }
        if let Some(v) = get("SWAGGER_UI") {
            config.api.swagger_ui = parse_bool("SWAGGER_UI", &v)?;
        }

        config.storage.files_prefix = normalize_prefix(&config.storage.files_prefix);
        config.validate()?;
        Ok(config)
    }

    /// Check invariants that the rest of the service relies on
    pub fn validate(&self) -> Result<()> {
        if self.download.max_bytes == 0 {
            return Err(config_error("download limit must be positive", "MAX_DOWNLOAD_BYTES"));
        }
        if self.download.connect_timeout.is_zero() {
            return Err(config_error(
                "connect timeout must be positive",
                "CONNECT_TIMEOUT_SECONDS",
            ));
        }
        if self.download.read_timeout.is_zero() {
            return Err(config_error("read timeout must be positive", "READ_TIMEOUT_SECONDS"));
        }
        if self.retention.expiry_delay.is_zero() {
            return Err(config_error("expiry delay must be positive", "EXPIRY_SECONDS"));
        }

        let prefix = normalize_prefix(&self.storage.files_prefix);
        let has_route_pattern = prefix
            .split('/')
            .any(|segment| segment.starts_with(':') || segment.starts_with('*'));
        if prefix == "/" || prefix.contains("..") || has_route_pattern {
            return Err(config_error(
                format!("invalid files prefix '{}'", self.storage.files_prefix),
                "FILES_PREFIX",
            ));
        }

        if let Some(base) = &self.storage.public_base_url {
            match url::Url::parse(base) {
                Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => {}
                _ => {
                    return Err(config_error(
                        format!("public base URL '{base}' must be an absolute http(s) URL"),
                        "PUBLIC_BASE_URL",
                    ));
                }
            }
        }

        Ok(())
    }

    /// The files prefix with a leading slash and no trailing slash
    pub fn files_prefix(&self) -> String {
        normalize_prefix(&self.storage.files_prefix)
    }
}

fn config_error(message: impl Into<String>, key: &str) -> Error {
    Error::Config {
        message: message.into(),
        key: Some(key.to_string()),
    }
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse()
        .map_err(|e| config_error(format!("invalid value '{raw}' for {key}: {e}"), key))
}

fn parse_secs(key: &str, raw: &str) -> Result<Duration> {
    parse_value::<u64>(key, raw).map(Duration::from_secs)
}

fn parse_bool(key: &str, raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(config_error(
            format!("invalid boolean '{raw}' for {key}"),
            key,
        )),
    }
}

fn normalize_prefix(prefix: &str) -> String {
    let trimmed = prefix.trim().trim_matches('/');
    format!("/{trimmed}")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("./output")
}

fn default_files_prefix() -> String {
    "/files".to_string()
}

fn default_expiry_delay() -> Duration {
    Duration::from_secs(60)
}

fn default_sweep_max_age() -> Duration {
    Duration::from_secs(120)
}

fn default_sweep_interval() -> Duration {
    Duration::from_secs(30)
}

fn default_max_bytes() -> u64 {
    500 * 1024 * 1024
}

fn default_connect_timeout() -> Duration {
    Duration::from_secs(10)
}

fn default_read_timeout() -> Duration {
    Duration::from_secs(120)
}

fn default_output_limit() -> usize {
    2000
}

fn default_true() -> bool {
    true
}

fn default_bind_address() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 8000))
}

fn default_cors_origins() -> Vec<String> {
    vec!["*".to_string()]
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
