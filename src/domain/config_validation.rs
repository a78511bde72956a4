//! Configuration validation.
//!
//! Validates all config fields before any snapshot is fetched.

use crate::domain::error::ScreenerError;
use crate::domain::metric::Metric;
use crate::domain::screen::parse_tickers;
use crate::domain::threshold::Preset;
use crate::domain::threshold_parser::parse_comparison;
use crate::ports::config_port::ConfigPort;

pub const SOURCES: [&str; 2] = ["csv", "json"];
pub const FORMATS: [&str; 2] = ["csv", "json"];

/// `[screen]` keys replaced by a command-line flag. Those keys are not checked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScreenOverrides {
    pub tickers: bool,
    pub format: bool,
    pub preset: bool,
}

pub fn validate_screen_config(config: &dyn ConfigPort) -> Result<(), ScreenerError> {
    validate_screen_config_with(config, ScreenOverrides::default())
}

pub fn validate_screen_config_with(
    config: &dyn ConfigPort,
    overrides: ScreenOverrides,
) -> Result<(), ScreenerError> {
    if !overrides.tickers {
        validate_tickers(config)?;
    }
    validate_source(config)?;
    validate_data_path(config)?;
    if !overrides.format {
        validate_format(config)?;
    }
    if !overrides.preset {
        validate_preset(config)?;
    }
    Ok(())
}

pub fn validate_threshold_config(config: &dyn ConfigPort) -> Result<(), ScreenerError> {
    for key in config.keys("thresholds") {
        if key.parse::<Metric>().is_err() {
            return Err(ScreenerError::ConfigInvalid {
                section: "thresholds".to_string(),
                key,
                reason: format!(
                    "unknown metric, expected one of: {}",
                    Metric::ALL.map(|m| m.key()).join(", ")
                ),
            });
        }
        let value = config.get_string("thresholds", &key).unwrap_or_default();
        parse_comparison(&value).map_err(|e| ScreenerError::ConfigInvalid {
            section: "thresholds".to_string(),
            key: key.clone(),
            reason: e.display_with_context(&value),
        })?;
    }
    Ok(())
}

fn validate_tickers(config: &dyn ConfigPort) -> Result<(), ScreenerError> {
    match config.get_string("screen", "tickers") {
        Some(s) => parse_tickers(&s)
            .map(|_| ())
            .map_err(|e| ScreenerError::ConfigInvalid {
                section: "screen".to_string(),
                key: "tickers".to_string(),
                reason: e.to_string(),
            }),
        None => Err(ScreenerError::ConfigMissing {
            section: "screen".to_string(),
            key: "tickers".to_string(),
        }),
    }
}

fn validate_source(config: &dyn ConfigPort) -> Result<(), ScreenerError> {
    validate_choice(config, "source", &SOURCES)
}

fn validate_format(config: &dyn ConfigPort) -> Result<(), ScreenerError> {
    validate_choice(config, "format", &FORMATS)
}

fn validate_choice(
    config: &dyn ConfigPort,
    key: &str,
    choices: &[&str],
) -> Result<(), ScreenerError> {
    match config.get_string("screen", key) {
        None => Ok(()),
        Some(s) if choices.contains(&s.trim().to_lowercase().as_str()) => Ok(()),
        Some(s) => Err(ScreenerError::ConfigInvalid {
            section: "screen".to_string(),
            key: key.to_string(),
            reason: format!("'{}' is not one of: {}", s.trim(), choices.join(", ")),
        }),
    }
}

fn validate_data_path(config: &dyn ConfigPort) -> Result<(), ScreenerError> {
    match config.get_string("screen", "data_path") {
        Some(s) if !s.trim().is_empty() => Ok(()),
        _ => Err(ScreenerError::ConfigMissing {
            section: "screen".to_string(),
            key: "data_path".to_string(),
        }),
    }
}

fn validate_preset(config: &dyn ConfigPort) -> Result<(), ScreenerError> {
    match config.get_string("screen", "preset") {
        None => Ok(()),
        Some(s) if Preset::from_name(&s).is_some() => Ok(()),
        Some(s) => Err(ScreenerError::ConfigInvalid {
            section: "screen".to_string(),
            key: "preset".to_string(),
            reason: format!(
                "unknown preset '{}', expected one of: {}",
                s.trim(),
                Preset::ALL.map(|p| p.name()).join(", ")
            ),
        }),
    }
}
