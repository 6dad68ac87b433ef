//! Configuration validation
//!
//! Rules:
//! - sink name not empty
//! - flush_delay_ms > 0, max_buffer_size >= 1, max_concurrency >= 1
//! - endpoint present (explicitly or by kind default) and well-formed
//! - http auth combination complete (basic: username + password, token: token)

use ::validator::Validate;
use contracts::{ContractError, ExporterConfig, SinkConfig, SinkKind};

/// Validate an ExporterConfig
///
/// Returns the first error encountered, or Ok(()).
pub fn validate(config: &ExporterConfig) -> Result<(), ContractError> {
    validate_name(&config.sink)?;
    validate_common(&config.sink)?;
    validate_endpoint(&config.sink)?;
    validate_auth(&config.sink)?;
    Ok(())
}

fn validate_name(sink: &SinkConfig) -> Result<(), ContractError> {
    if sink.name.trim().is_empty() {
        return Err(ContractError::config_validation(
            "sink.name",
            "sink name cannot be empty",
        ));
    }
    Ok(())
}

/// Numeric bounds, checked through the derive on `SinkCommonConfig`
fn validate_common(sink: &SinkConfig) -> Result<(), ContractError> {
    let Err(errors) = sink.common.validate() else {
        return Ok(());
    };

    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));

    let (field, field_errors) = fields
        .into_iter()
        .next()
        .ok_or_else(|| ContractError::config_validation("sink", errors.to_string()))?;

    let message = field_errors
        .iter()
        .find_map(|e| e.message.as_ref().map(|m| m.to_string()))
        .unwrap_or_else(|| format!("invalid value for {field}"));

    Err(ContractError::config_validation(
        format!("sink.{field}"),
        message,
    ))
}

fn validate_endpoint(sink: &SinkConfig) -> Result<(), ContractError> {
    let endpoint = sink.resolved_endpoint().ok_or_else(|| {
        ContractError::config_validation(
            "sink.endpoint",
            format!("endpoint is required for {} sinks", sink.kind),
        )
    })?;

    match sink.kind {
        SinkKind::Elasticsearch | SinkKind::Http => {
            if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
                return Err(ContractError::config_validation(
                    "sink.endpoint",
                    format!("endpoint '{endpoint}' must be an http:// or https:// URL"),
                ));
            }
        }
        SinkKind::Tcp => {
            let valid = endpoint
                .rsplit_once(':')
                .map(|(host, port)| !host.is_empty() && port.parse::<u16>().is_ok())
                .unwrap_or(false);
            if !valid {
                return Err(ContractError::config_validation(
                    "sink.endpoint",
                    format!("endpoint '{endpoint}' must be host:port"),
                ));
            }
        }
    }
    Ok(())
}

fn validate_auth(sink: &SinkConfig) -> Result<(), ContractError> {
    match (&sink.kind, &sink.auth) {
        (SinkKind::Http, Some(auth)) => auth.credentials().map(|_| ()),
        _ => Ok(()),
    }
}
