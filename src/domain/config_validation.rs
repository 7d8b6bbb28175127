//! Configuration validation.
//!
//! Every field is checked before any data is loaded or any computation
//! runs; a bad window size or negative fee is a hard error, never a
//! silently substituted default.

use crate::domain::error::QuantbtError;
use crate::domain::timeframe::Timeframe;
use crate::ports::config_port::ConfigPort;
use chrono::{DateTime, NaiveDate};

pub fn validate_data_config(config: &dyn ConfigPort) -> Result<(), QuantbtError> {
    require_string(config, "data", "root")?;
    require_string(config, "data", "exchange")?;
    require_string(config, "data", "symbol")?;
    validate_timeframes(config)?;
    validate_date_range(config)?;
    Ok(())
}

pub fn validate_strategy_config(config: &dyn ConfigPort) -> Result<(), QuantbtError> {
    validate_window(config, "fast")?;
    validate_window(config, "slow")?;
    validate_fee(config)?;
    validate_periods_per_year(config)?;
    Ok(())
}

fn require_string(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<String, QuantbtError> {
    match config.get_string(section, key) {
        Some(s) if !s.trim().is_empty() => Ok(s),
        _ => Err(QuantbtError::ConfigMissing {
            section: section.to_string(),
            key: key.to_string(),
        }),
    }
}

fn validate_window(config: &dyn ConfigPort, key: &str) -> Result<(), QuantbtError> {
    let value = config.get_int("strategy", key, 0);
    if value < 1 {
        return Err(QuantbtError::ConfigInvalid {
            section: "strategy".to_string(),
            key: key.to_string(),
            reason: format!("{key} must be a positive integer"),
        });
    }
    Ok(())
}

fn validate_fee(config: &dyn ConfigPort) -> Result<(), QuantbtError> {
    let value = config.get_double("strategy", "fee_bp", 0.0);
    if value < 0.0 {
        return Err(QuantbtError::ConfigInvalid {
            section: "strategy".to_string(),
            key: "fee_bp".to_string(),
            reason: "fee_bp must be non-negative".to_string(),
        });
    }
    Ok(())
}

fn validate_periods_per_year(config: &dyn ConfigPort) -> Result<(), QuantbtError> {
    let value = config.get_double("strategy", "periods_per_year", 0.0);
    if value <= 0.0 {
        return Err(QuantbtError::ConfigInvalid {
            section: "strategy".to_string(),
            key: "periods_per_year".to_string(),
            reason: "periods_per_year must be positive and match the bar frequency".to_string(),
        });
    }
    Ok(())
}

fn validate_timeframes(config: &dyn ConfigPort) -> Result<(), QuantbtError> {
    let tf = require_string(config, "data", "timeframe")?;
    tf.parse::<Timeframe>()?;

    if let Some(rule) = config.get_string("data", "resample") {
        rule.parse::<Timeframe>()?;
    }
    Ok(())
}

fn validate_date_range(config: &dyn ConfigPort) -> Result<(), QuantbtError> {
    let start = config
        .get_string("data", "start")
        .map(|s| parse_utc_ms(&s, "start"))
        .transpose()?;
    let end = config
        .get_string("data", "end")
        .map(|s| parse_utc_ms(&s, "end"))
        .transpose()?;

    if let (Some(start), Some(end)) = (start, end)
        && start >= end
    {
        return Err(QuantbtError::ConfigInvalid {
            section: "data".to_string(),
            key: "start".to_string(),
            reason: "start must be before end".to_string(),
        });
    }
    Ok(())
}

/// Parse "2024-01-01" or an RFC 3339 instant into epoch milliseconds.
/// A bare date means midnight UTC.
pub fn parse_utc_ms(value: &str, key: &str) -> Result<i64, QuantbtError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.timestamp_millis());
    }
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Ok(date
            .and_hms_opt(0, 0, 0)
            .unwrap_or_default()
            .and_utc()
            .timestamp_millis());
    }
    Err(QuantbtError::ConfigInvalid {
        section: "data".to_string(),
        key: key.to_string(),
        reason: format!("invalid {key}, expected YYYY-MM-DD or RFC 3339"),
    })
}
