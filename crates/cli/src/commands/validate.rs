//! `validate` command implementation.

use anyhow::{Context, Result};
use contracts::{ExporterConfig, SinkKind};
use serde::Serialize;
use tracing::info;

use crate::cli::ValidateArgs;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ConfigSummary>,
}

#[derive(Serialize)]
struct ConfigSummary {
    sink_name: String,
    kind: String,
    endpoint: Option<String>,
    flush_delay_ms: u64,
    max_buffer_size: usize,
    max_concurrency: usize,
    metrics_port: Option<u16>,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.config.display(), "Validating configuration");

    let result = validate_config(args);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Configuration validation failed")
    }
}

fn validate_config(args: &ValidateArgs) -> ValidationResult {
    let config_path = args.config.display().to_string();

    if !args.config.exists() {
        return ValidationResult {
            valid: false,
            config_path,
            error: Some(format!("File not found: {}", args.config.display())),
            warnings: None,
            summary: None,
        };
    }

    match config_loader::ConfigLoader::load_from_path(&args.config) {
        Ok(config) => {
            let warnings = collect_warnings(&config);
            ValidationResult {
                valid: true,
                config_path,
                error: None,
                warnings: if warnings.is_empty() {
                    None
                } else {
                    Some(warnings)
                },
                summary: Some(ConfigSummary {
                    sink_name: config.sink.name.clone(),
                    kind: config.sink.kind.to_string(),
                    endpoint: config.sink.resolved_endpoint().map(str::to_string),
                    flush_delay_ms: config.sink.common.flush_delay_ms,
                    max_buffer_size: config.sink.common.max_buffer_size,
                    max_concurrency: config.sink.common.max_concurrency,
                    metrics_port: config.metrics.enabled_port(),
                }),
            }
        }
        Err(e) => ValidationResult {
            valid: false,
            config_path,
            error: Some(e.to_string()),
            warnings: None,
            summary: None,
        },
    }
}

/// Collect configuration warnings (non-fatal issues)
fn collect_warnings(config: &ExporterConfig) -> Vec<String> {
    let mut warnings = Vec::new();
    let sink = &config.sink;

    if sink.endpoint.is_none() {
        if let Some(default) = sink.kind.default_endpoint() {
            warnings.push(format!("sink.endpoint not set - using default {default}"));
        }
    }

    if sink.kind != SinkKind::Http && sink.auth.is_some() {
        warnings.push(format!("sink.auth is ignored by the {} sink", sink.kind));
    }

    if sink.kind == SinkKind::Http {
        let insecure = sink
            .resolved_endpoint()
            .is_some_and(|e| e.starts_with("http://"));
        if insecure && sink.auth.is_some() {
            warnings.push("credentials are sent over plain http".to_string());
        }
    }

    if config.metrics.enabled_port().is_none() {
        warnings.push("metrics.port not set - Prometheus endpoint disabled".to_string());
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Configuration is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Sink: {} ({})", summary.sink_name, summary.kind);
            println!(
                "  Endpoint: {}",
                summary.endpoint.as_deref().unwrap_or("<none>")
            );
            println!("  Flush delay: {}ms", summary.flush_delay_ms);
            println!("  Max buffer size: {}", summary.max_buffer_size);
            println!("  Max concurrency: {}", summary.max_concurrency);
            match summary.metrics_port {
                Some(port) => println!("  Metrics port: {}", port),
                None => println!("  Metrics: disabled"),
            }
        }

        if let Some(ref warnings) = result.warnings {
            println!("\n⚠ Warnings:");
            for warning in warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("✗ Configuration is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{HttpAuthConfig, SinkConfig};
    use std::io::Write;
    use std::path::PathBuf;

    #[test]
    fn test_valid_file_summary() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[sink]\nkind = \"elasticsearch\"\nmax_buffer_size = 50").unwrap();

        let result = validate_config(&ValidateArgs {
            config: file.path().to_path_buf(),
            json: true,
        });

        assert!(result.valid);
        let summary = result.summary.unwrap();
        assert_eq!(summary.kind, "elasticsearch");
        assert_eq!(summary.max_buffer_size, 50);
        assert_eq!(
            summary.endpoint.as_deref(),
            Some("http://elasticsearch:9200/")
        );
        assert!(result.warnings.unwrap().len() >= 2);
    }

    #[test]
    fn test_missing_file_is_invalid() {
        let result = validate_config(&ValidateArgs {
            config: PathBuf::from("/nonexistent/exporter.toml"),
            json: false,
        });
        assert!(!result.valid);
        assert!(result.error.unwrap().contains("File not found"));
    }

    #[test]
    fn test_auth_on_tcp_warns() {
        let mut config = ExporterConfig {
            sink: SinkConfig::new(SinkKind::Tcp),
            metrics: Default::default(),
        };
        config.sink.endpoint = Some("127.0.0.1:9000".into());
        config.sink.auth = Some(HttpAuthConfig::default());
        config.metrics.port = Some(9102);

        let warnings = collect_warnings(&config);
        assert_eq!(warnings, vec!["sink.auth is ignored by the tcp sink".to_string()]);
    }
}
