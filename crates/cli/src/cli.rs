//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use contracts::{
    AuthMode, ExporterConfig, HttpAuthConfig, MetricsConfig, SinkConfig, SinkKind,
    DEFAULT_FLUSH_DELAY_MS, DEFAULT_INDEX_PREFIX, DEFAULT_MAX_BUFFER_SIZE, DEFAULT_MAX_CONCURRENCY,
};
use std::path::PathBuf;

/// Event Exporter - forwards Kubernetes events to Elasticsearch, HTTP or TCP
#[derive(Parser, Debug)]
#[command(
    name = "event-exporter",
    author,
    version,
    about = "Kubernetes event exporter",
    long_about = "Reads a JSON-lines watch feed of Kubernetes events, batches them and \n\
                  forwards each batch to Elasticsearch, an HTTP collector or a TCP stream."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "EVENT_EXPORTER_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "EVENT_EXPORTER_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the exporter
    Run(RunArgs),

    /// Validate configuration file without running
    Validate(ValidateArgs),
}

/// Arguments for the `run` command
#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    /// Path to configuration file (TOML or JSON); sink flags are ignored when set
    #[arg(short, long, env = "EVENT_EXPORTER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Sink type to export events to
    #[arg(long, value_enum, default_value = "elasticsearch")]
    pub sink: SinkArg,

    /// Elasticsearch endpoint
    #[arg(long, default_value = "http://elasticsearch:9200/")]
    pub elasticsearch_server: String,

    /// Elasticsearch index prefix
    #[arg(long, default_value = DEFAULT_INDEX_PREFIX)]
    pub index_prefix: String,

    /// HTTP endpoint
    #[arg(long, default_value = "")]
    pub http_endpoint: String,

    /// HTTP auth method
    #[arg(long, value_enum, default_value = "token")]
    pub auth: AuthArg,

    /// Bearer token for HTTP token auth
    #[arg(long, env = "EVENT_EXPORTER_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Username for HTTP basic auth
    #[arg(long)]
    pub username: Option<String>,

    /// Password for HTTP basic auth
    #[arg(long, env = "EVENT_EXPORTER_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// TCP endpoint
    #[arg(long, default_value = "127.0.0.1:9000")]
    pub tcp_endpoint: String,

    /// Inactivity delay before a partial batch is flushed (ms)
    #[arg(long, default_value_t = DEFAULT_FLUSH_DELAY_MS)]
    pub flush_delay_ms: u64,

    /// Max events per batch
    #[arg(long, default_value_t = DEFAULT_MAX_BUFFER_SIZE)]
    pub max_buffer_size: usize,

    /// Max concurrent in-flight transmissions
    #[arg(long, default_value_t = DEFAULT_MAX_CONCURRENCY)]
    pub max_concurrency: usize,

    /// Metrics server port (0 = disabled); overrides the config file
    #[arg(long, env = "EVENT_EXPORTER_METRICS_PORT")]
    pub metrics_port: Option<u16>,

    /// Watch feed to read (`-` for stdin)
    #[arg(short, long, default_value = "-")]
    pub input: String,
}

impl RunArgs {
    /// Assemble an exporter configuration from flags
    pub fn to_config(&self) -> ExporterConfig {
        let kind = SinkKind::from(self.sink);
        let mut sink = SinkConfig::new(kind);

        sink.endpoint = Some(match kind {
            SinkKind::Elasticsearch => self.elasticsearch_server.clone(),
            SinkKind::Http => self.http_endpoint.clone(),
            SinkKind::Tcp => self.tcp_endpoint.clone(),
        });
        sink.index_prefix = self.index_prefix.clone();
        sink.common.flush_delay_ms = self.flush_delay_ms;
        sink.common.max_buffer_size = self.max_buffer_size;
        sink.common.max_concurrency = self.max_concurrency;

        if kind == SinkKind::Http {
            sink.auth = Some(HttpAuthConfig {
                mode: self.auth.into(),
                token: self.token.clone(),
                username: self.username.clone(),
                password: self.password.clone(),
            });
        }

        ExporterConfig {
            sink,
            metrics: MetricsConfig {
                port: self.metrics_port,
            },
        }
    }
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Sink type flag
#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum SinkArg {
    Elasticsearch,
    Http,
    Tcp,
}

impl From<SinkArg> for SinkKind {
    fn from(arg: SinkArg) -> Self {
        match arg {
            SinkArg::Elasticsearch => SinkKind::Elasticsearch,
            SinkArg::Http => SinkKind::Http,
            SinkArg::Tcp => SinkKind::Tcp,
        }
    }
}

/// HTTP auth flag
#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum AuthArg {
    Basic,
    Token,
}

impl From<AuthArg> for AuthMode {
    fn from(arg: AuthArg) -> Self {
        match arg {
            AuthArg::Basic => AuthMode::Basic,
            AuthArg::Token => AuthMode::Token,
        }
    }
}

/// Log output format
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}

impl From<LogFormat> for observability::LogFormat {
    fn from(format: LogFormat) -> Self {
        match format {
            LogFormat::Json => observability::LogFormat::Json,
            LogFormat::Pretty => observability::LogFormat::Pretty,
            LogFormat::Compact => observability::LogFormat::Compact,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_run_defaults_to_elasticsearch() {
        let cli = parse(&["event-exporter", "run"]);
        let Commands::Run(args) = cli.command else {
            panic!("expected run");
        };
        let config = args.to_config();

        assert_eq!(config.sink.kind, SinkKind::Elasticsearch);
        assert_eq!(
            config.sink.resolved_endpoint(),
            Some("http://elasticsearch:9200/")
        );
        assert_eq!(config.sink.common.max_buffer_size, DEFAULT_MAX_BUFFER_SIZE);
        assert!(config.sink.auth.is_none());
        assert_eq!(args.input, "-");
    }

    #[test]
    fn test_http_flags_with_basic_auth() {
        let cli = parse(&[
            "event-exporter",
            "run",
            "--sink",
            "http",
            "--http-endpoint",
            "http://collector:8080/events",
            "--auth",
            "basic",
            "--username",
            "user",
            "--password",
            "pass",
            "--max-concurrency",
            "4",
        ]);
        let Commands::Run(args) = cli.command else {
            panic!("expected run");
        };
        let config = args.to_config();

        assert_eq!(config.sink.kind, SinkKind::Http);
        assert_eq!(config.sink.common.max_concurrency, 4);
        let auth = config.sink.auth.unwrap();
        assert_eq!(auth.mode, AuthMode::Basic);
        assert_eq!(auth.username.as_deref(), Some("user"));
    }

    #[test]
    fn test_empty_http_endpoint_falls_back_to_none() {
        let cli = parse(&["event-exporter", "run", "--sink", "http"]);
        let Commands::Run(args) = cli.command else {
            panic!("expected run");
        };
        assert_eq!(args.to_config().sink.resolved_endpoint(), None);
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        assert!(Cli::try_parse_from(["event-exporter", "-q", "-v", "run"]).is_err());
    }
}
