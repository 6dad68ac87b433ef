//! # Config Loader
//!
//! Configuration loading and parsing module.
//!
//! Responsibilities:
//! - Parse TOML/JSON configuration files
//! - Validate sink settings (endpoint, auth, batching bounds)
//! - Produce an `ExporterConfig`
//!
//! # Example
//!
//! ```no_run
//! use config_loader::ConfigLoader;
//! use std::path::Path;
//!
//! let config = ConfigLoader::load_from_path(Path::new("exporter.toml")).unwrap();
//! println!("Sink: {}", config.sink.kind);
//! ```

mod parser;
mod validator;

pub use contracts::ExporterConfig;
pub use parser::ConfigFormat;
pub use self::validator::validate;

use contracts::ContractError;
use std::path::Path;

/// Configuration loader
///
/// Provides static methods to load configuration from files or strings.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from file path
    ///
    /// Automatically detects format from file extension (.toml / .json).
    ///
    /// # Errors
    /// - File read failure
    /// - Unsupported format
    /// - Parse failure
    /// - Validation failure
    pub fn load_from_path(path: &Path) -> Result<ExporterConfig, ContractError> {
        let format = Self::detect_format(path)?;
        let content = Self::read_file(path)?;
        Self::load_from_str(&content, format)
    }

    /// Load configuration from string
    ///
    /// # Errors
    /// - Parse failure
    /// - Validation failure
    pub fn load_from_str(
        content: &str,
        format: ConfigFormat,
    ) -> Result<ExporterConfig, ContractError> {
        let config = parser::parse(content, format)?;
        self::validator::validate(&config)?;
        Ok(config)
    }

    /// Serialize ExporterConfig to TOML string
    pub fn to_toml(config: &ExporterConfig) -> Result<String, ContractError> {
        toml::to_string_pretty(config)
            .map_err(|e| ContractError::config_parse(format!("TOML serialize error: {e}")))
    }

    /// Serialize ExporterConfig to JSON string
    pub fn to_json(config: &ExporterConfig) -> Result<String, ContractError> {
        serde_json::to_string_pretty(config)
            .map_err(|e| ContractError::config_parse(format!("JSON serialize error: {e}")))
    }
}

impl ConfigLoader {
    /// Infer configuration format from file extension
    fn detect_format(path: &Path) -> Result<ConfigFormat, ContractError> {
        let ext = path.extension().and_then(|e| e.to_str()).ok_or_else(|| {
            ContractError::config_parse("cannot determine file format from extension")
        })?;

        ConfigFormat::from_extension(ext).ok_or_else(|| {
            ContractError::config_parse(format!("unsupported config format: .{ext}"))
        })
    }

    /// Read configuration file content
    fn read_file(path: &Path) -> Result<String, ContractError> {
        Ok(std::fs::read_to_string(path)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{AuthMode, SinkKind};
    use std::io::Write;

    const HTTP_TOML: &str = r#"
[sink]
name = "collector"
kind = "http"
endpoint = "https://collector.example.com/events"
flush_delay_ms = 2000
max_buffer_size = 50

[sink.auth]
mode = "basic"
username = "exporter"
password = "hunter2"

[metrics]
port = 9102
"#;

    #[test]
    fn test_load_from_str_toml() {
        let result = ConfigLoader::load_from_str(HTTP_TOML, ConfigFormat::Toml);
        assert!(result.is_ok(), "Failed: {:?}", result.err());
        let config = result.unwrap();
        assert_eq!(config.sink.kind, SinkKind::Http);
        assert_eq!(config.sink.common.flush_delay_ms, 2000);
        assert_eq!(config.sink.common.max_buffer_size, 50);
        assert_eq!(config.sink.common.max_concurrency, 10);
        assert_eq!(config.sink.auth.as_ref().unwrap().mode, AuthMode::Basic);
        assert_eq!(config.metrics.enabled_port(), Some(9102));
    }

    #[test]
    fn test_round_trip_toml() {
        let config = ConfigLoader::load_from_str(HTTP_TOML, ConfigFormat::Toml).unwrap();
        let serialized = ConfigLoader::to_toml(&config).unwrap();
        let config2 = ConfigLoader::load_from_str(&serialized, ConfigFormat::Toml).unwrap();
        assert_eq!(config.sink.name, config2.sink.name);
        assert_eq!(config.sink.common, config2.sink.common);
    }

    #[test]
    fn test_round_trip_json() {
        let config = ConfigLoader::load_from_str(HTTP_TOML, ConfigFormat::Toml).unwrap();
        let json = ConfigLoader::to_json(&config).unwrap();
        let config2 = ConfigLoader::load_from_str(&json, ConfigFormat::Json).unwrap();
        assert_eq!(config.sink.endpoint, config2.sink.endpoint);
    }

    #[test]
    fn test_validation_runs_after_parse() {
        // http sink without an endpoint must be rejected
        let content = r#"
[sink]
kind = "http"
"#;
        let result = ConfigLoader::load_from_str(content, ConfigFormat::Toml);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("endpoint"));
    }

    #[test]
    fn test_load_from_path_detects_format() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(
            file,
            r#"{{"sink": {{"kind": "tcp", "endpoint": "127.0.0.1:5170"}}}}"#
        )
        .unwrap();

        let config = ConfigLoader::load_from_path(file.path()).unwrap();
        assert_eq!(config.sink.kind, SinkKind::Tcp);
        assert_eq!(config.sink.resolved_endpoint(), Some("127.0.0.1:5170"));
        assert_eq!(config.metrics.enabled_port(), None);
    }

    #[test]
    fn test_load_from_path_unknown_extension() {
        let file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        let err = ConfigLoader::load_from_path(file.path()).unwrap_err();
        assert!(err.to_string().contains("unsupported config format"));
    }
}
