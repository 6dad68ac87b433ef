//! ExporterConfig - configuration surface
//!
//! Loaded by `config_loader`, or assembled from CLI flags, and read-only
//! once a sink is constructed.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::ContractError;

/// Default flush delay (milliseconds)
pub const DEFAULT_FLUSH_DELAY_MS: u64 = 5_000;
/// Default max buffer size (events per batch and queue capacity)
pub const DEFAULT_MAX_BUFFER_SIZE: usize = 100;
/// Default max concurrent in-flight transmissions
pub const DEFAULT_MAX_CONCURRENCY: usize = 10;
/// Default Elasticsearch index prefix
pub const DEFAULT_INDEX_PREFIX: &str = "kube-events";

/// Top-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExporterConfig {
    /// The single output sink
    pub sink: SinkConfig,

    /// Metrics exposition
    #[serde(default)]
    pub metrics: MetricsConfig,
}

/// Prometheus exporter settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MetricsConfig {
    /// Listen port (None or 0 = disabled)
    #[serde(default)]
    pub port: Option<u16>,
}

impl MetricsConfig {
    /// Port to listen on, if the exporter is enabled
    pub fn enabled_port(&self) -> Option<u16> {
        self.port.filter(|p| *p != 0)
    }
}

/// Output sink configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SinkConfig {
    /// Sink name (logs only)
    #[serde(default = "default_sink_name")]
    pub name: String,

    /// Transmitter variant
    pub kind: SinkKind,

    /// Destination address; falls back to the kind's default when absent
    #[serde(default)]
    pub endpoint: Option<String>,

    /// Batching tunables
    #[serde(flatten)]
    pub common: SinkCommonConfig,

    /// Index prefix (elasticsearch only)
    #[serde(default = "default_index_prefix")]
    pub index_prefix: String,

    /// Authentication (http only)
    #[serde(default)]
    pub auth: Option<HttpAuthConfig>,
}

fn default_sink_name() -> String {
    "events".to_string()
}

fn default_index_prefix() -> String {
    DEFAULT_INDEX_PREFIX.to_string()
}

impl SinkConfig {
    /// Create a config for `kind` with defaults everywhere else
    pub fn new(kind: SinkKind) -> Self {
        Self {
            name: default_sink_name(),
            kind,
            endpoint: None,
            common: SinkCommonConfig::default(),
            index_prefix: default_index_prefix(),
            auth: None,
        }
    }

    /// Endpoint to deliver to, if one is configured or defaulted
    pub fn resolved_endpoint(&self) -> Option<&str> {
        match self.endpoint.as_deref().map(str::trim) {
            Some(endpoint) if !endpoint.is_empty() => Some(endpoint),
            _ => self.kind.default_endpoint(),
        }
    }
}

/// Shared batching tunables
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct SinkCommonConfig {
    /// Inactivity delay before a partial batch is flushed (ms)
    #[serde(default = "default_flush_delay_ms")]
    #[validate(range(min = 1, message = "flush_delay_ms must be > 0"))]
    pub flush_delay_ms: u64,

    /// Max events per batch; also the queue capacity
    #[serde(default = "default_max_buffer_size")]
    #[validate(range(min = 1, message = "max_buffer_size must be >= 1"))]
    pub max_buffer_size: usize,

    /// Max concurrent in-flight transmissions
    #[serde(default = "default_max_concurrency")]
    #[validate(range(min = 1, message = "max_concurrency must be >= 1"))]
    pub max_concurrency: usize,
}

fn default_flush_delay_ms() -> u64 {
    DEFAULT_FLUSH_DELAY_MS
}

fn default_max_buffer_size() -> usize {
    DEFAULT_MAX_BUFFER_SIZE
}

fn default_max_concurrency() -> usize {
    DEFAULT_MAX_CONCURRENCY
}

impl SinkCommonConfig {
    /// Flush delay as a `Duration`
    pub fn flush_delay(&self) -> Duration {
        Duration::from_millis(self.flush_delay_ms)
    }
}

impl Default for SinkCommonConfig {
    fn default() -> Self {
        Self {
            flush_delay_ms: DEFAULT_FLUSH_DELAY_MS,
            max_buffer_size: DEFAULT_MAX_BUFFER_SIZE,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
        }
    }
}

/// Sink kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SinkKind {
    /// Search index bulk insert
    Elasticsearch,
    /// HTTP collector
    Http,
    /// Line-delimited JSON over TCP
    Tcp,
}

impl SinkKind {
    /// Endpoint used when none is configured
    pub fn default_endpoint(&self) -> Option<&'static str> {
        match self {
            Self::Elasticsearch => Some("http://elasticsearch:9200/"),
            Self::Http => None,
            Self::Tcp => Some("127.0.0.1:9000"),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Elasticsearch => "elasticsearch",
            Self::Http => "http",
            Self::Tcp => "tcp",
        }
    }
}

impl fmt::Display for SinkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SinkKind {
    type Err = ContractError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "elasticsearch" => Ok(Self::Elasticsearch),
            "http" => Ok(Self::Http),
            "tcp" => Ok(Self::Tcp),
            other => Err(ContractError::config_validation(
                "sink.kind",
                format!("unknown sink kind '{other}'"),
            )),
        }
    }
}

/// HTTP authentication as configured
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HttpAuthConfig {
    /// Authentication mode
    #[serde(default)]
    pub mode: AuthMode,

    /// Bearer token (token mode)
    #[serde(default)]
    pub token: Option<String>,

    /// Username (basic mode)
    #[serde(default)]
    pub username: Option<String>,

    /// Password (basic mode)
    #[serde(default)]
    pub password: Option<String>,
}

/// Authentication mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthMode {
    /// HTTP basic authentication
    Basic,
    /// Bearer token
    #[default]
    Token,
}

/// Resolved credentials attached to every request
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    Basic { username: String, password: String },
    Bearer { token: String },
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .field("password", &"<redacted>")
                .finish(),
            Self::Bearer { .. } => f
                .debug_struct("Bearer")
                .field("token", &"<redacted>")
                .finish(),
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

impl HttpAuthConfig {
    /// Resolve into credentials, rejecting incomplete combinations
    pub fn credentials(&self) -> Result<Credentials, ContractError> {
        match self.mode {
            AuthMode::Basic => {
                let username = non_empty(&self.username).ok_or_else(|| {
                    ContractError::config_validation(
                        "sink.auth.username",
                        "basic auth requires a username",
                    )
                })?;
                let password = non_empty(&self.password).ok_or_else(|| {
                    ContractError::config_validation(
                        "sink.auth.password",
                        "basic auth requires a password",
                    )
                })?;
                Ok(Credentials::Basic {
                    username: username.to_string(),
                    password: password.to_string(),
                })
            }
            AuthMode::Token => {
                let token = non_empty(&self.token).ok_or_else(|| {
                    ContractError::config_validation(
                        "sink.auth.token",
                        "token auth requires a token",
                    )
                })?;
                Ok(Credentials::Bearer {
                    token: token.to_string(),
                })
            }
        }
    }
}
