//! Configuration validation.
//!
//! Validates every section a run reads before any simulation starts.

use crate::domain::error::NisaError;
use crate::domain::plan::Compounding;
use crate::ports::config_port::ConfigPort;
use chrono::NaiveDate;

pub const STORAGE_BACKENDS: [&str; 3] = ["none", "sqlite", "postgres"];
pub const MARKET_SOURCES: [&str; 2] = ["csv", "sqlite"];

pub fn validate_simulation_config(config: &dyn ConfigPort) -> Result<(), NisaError> {
    validate_monthly_contribution(config)?;
    validate_years(config)?;
    validate_periods_per_year(config)?;
    validate_rate_source(config)?;
    validate_compounding(config)?;
    validate_caps(config)?;
    Ok(())
}

pub fn validate_market_config(config: &dyn ConfigPort) -> Result<(), NisaError> {
    if config.get_string("market", "symbol").is_none() {
        return Ok(());
    }
    validate_market_source(config)?;
    validate_market_dates(config)?;
    Ok(())
}

pub fn validate_risk_config(config: &dyn ConfigPort) -> Result<(), NisaError> {
    let simulations = config.get_int("risk", "simulations", 300);
    if simulations < 1 {
        return Err(NisaError::ConfigInvalid {
            section: "risk".to_string(),
            key: "simulations".to_string(),
            reason: "simulations must be at least 1".to_string(),
        });
    }
    if let Some(vol) = optional_f64(config, "risk", "annual_volatility")? {
        if vol < 0.0 {
            return Err(NisaError::ConfigInvalid {
                section: "risk".to_string(),
                key: "annual_volatility".to_string(),
                reason: "annual_volatility must be non-negative".to_string(),
            });
        }
    } else if config.get_string("market", "symbol").is_none() {
        return Err(NisaError::ConfigMissing {
            section: "risk".to_string(),
            key: "annual_volatility".to_string(),
        });
    }
    if let Some(seed) = config.get_string("risk", "seed") {
        seed.trim()
            .parse::<u64>()
            .map_err(|_| NisaError::ConfigInvalid {
                section: "risk".to_string(),
                key: "seed".to_string(),
                reason: "seed must be a non-negative integer".to_string(),
            })?;
    }
    Ok(())
}

pub fn validate_storage_config(config: &dyn ConfigPort) -> Result<(), NisaError> {
    let backend = config
        .get_string("storage", "backend")
        .unwrap_or_else(|| "none".to_string())
        .to_lowercase();
    if !STORAGE_BACKENDS.contains(&backend.as_str()) {
        return Err(NisaError::ConfigInvalid {
            section: "storage".to_string(),
            key: "backend".to_string(),
            reason: format!("unknown backend '{}' (expected none, sqlite or postgres)", backend),
        });
    }
    match backend.as_str() {
        "sqlite" => require_non_empty(config, "sqlite", "path"),
        "postgres" => {
            if config.get_string("postgres", "connection_string").is_some() {
                Ok(())
            } else {
                require_non_empty(config, "database", "conninfo")
            }
        }
        _ => Ok(()),
    }
}

/// Parses an optional float key, treating a present but malformed value as an error.
pub fn optional_f64(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<Option<f64>, NisaError> {
    match config.get_string(section, key) {
        None => Ok(None),
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => s
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .map(Some)
            .ok_or_else(|| NisaError::ConfigInvalid {
                section: section.to_string(),
                key: key.to_string(),
                reason: format!("'{}' is not a number", s.trim()),
            }),
    }
}

pub fn parse_date(
    value: Option<&str>,
    section: &str,
    field: &str,
) -> Result<Option<NaiveDate>, NisaError> {
    match value {
        None => Ok(None),
        Some(s) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
            .map(Some)
            .map_err(|_| NisaError::ConfigInvalid {
                section: section.to_string(),
                key: field.to_string(),
                reason: format!("invalid {} format, expected YYYY-MM-DD", field),
            }),
    }
}

fn require_non_empty(config: &dyn ConfigPort, section: &str, key: &str) -> Result<(), NisaError> {
    match config.get_string(section, key) {
        Some(s) if !s.trim().is_empty() => Ok(()),
        _ => Err(NisaError::ConfigMissing {
            section: section.to_string(),
            key: key.to_string(),
        }),
    }
}

fn validate_monthly_contribution(config: &dyn ConfigPort) -> Result<(), NisaError> {
    match optional_f64(config, "simulation", "monthly_contribution")? {
        None => Err(NisaError::ConfigMissing {
            section: "simulation".to_string(),
            key: "monthly_contribution".to_string(),
        }),
        Some(v) if v < 0.0 => Err(NisaError::ConfigInvalid {
            section: "simulation".to_string(),
            key: "monthly_contribution".to_string(),
            reason: "monthly_contribution must be non-negative".to_string(),
        }),
        Some(_) => Ok(()),
    }
}

fn validate_years(config: &dyn ConfigPort) -> Result<(), NisaError> {
    require_non_empty(config, "simulation", "years")?;
    let years = config.get_int("simulation", "years", 0);
    if !(1..=100).contains(&years) {
        return Err(NisaError::ConfigInvalid {
            section: "simulation".to_string(),
            key: "years".to_string(),
            reason: "years must be between 1 and 100".to_string(),
        });
    }
    Ok(())
}

fn validate_periods_per_year(config: &dyn ConfigPort) -> Result<(), NisaError> {
    let value = config.get_int("simulation", "periods_per_year", 12);
    if !(1..=365).contains(&value) {
        return Err(NisaError::ConfigInvalid {
            section: "simulation".to_string(),
            key: "periods_per_year".to_string(),
            reason: "periods_per_year must be between 1 and 365".to_string(),
        });
    }
    Ok(())
}

fn validate_rate_source(config: &dyn ConfigPort) -> Result<(), NisaError> {
    if optional_f64(config, "simulation", "annual_rate")?.is_some() {
        return Ok(());
    }
    match config.get_string("market", "symbol") {
        Some(s) if !s.trim().is_empty() => Ok(()),
        _ => Err(NisaError::ConfigMissing {
            section: "simulation".to_string(),
            key: "annual_rate".to_string(),
        }),
    }
}

fn validate_compounding(config: &dyn ConfigPort) -> Result<(), NisaError> {
    if let Some(s) = config.get_string("simulation", "compounding") {
        s.parse::<Compounding>()
            .map_err(|reason| NisaError::ConfigInvalid {
                section: "simulation".to_string(),
                key: "compounding".to_string(),
                reason,
            })?;
    }
    Ok(())
}

fn validate_caps(config: &dyn ConfigPort) -> Result<(), NisaError> {
    for key in ["lifetime_cap", "annual_cap"] {
        if let Some(v) = optional_f64(config, "simulation", key)? {
            if v <= 0.0 {
                return Err(NisaError::ConfigInvalid {
                    section: "simulation".to_string(),
                    key: key.to_string(),
                    reason: format!("{} must be positive", key),
                });
            }
        }
    }
    Ok(())
}

fn validate_market_source(config: &dyn ConfigPort) -> Result<(), NisaError> {
    let source = config
        .get_string("market", "source")
        .unwrap_or_else(|| "csv".to_string())
        .to_lowercase();
    if !MARKET_SOURCES.contains(&source.as_str()) {
        return Err(NisaError::ConfigInvalid {
            section: "market".to_string(),
            key: "source".to_string(),
            reason: format!("unknown source '{}' (expected csv or sqlite)", source),
        });
    }
    match source.as_str() {
        "csv" => require_non_empty(config, "market", "data_dir"),
        _ => require_non_empty(config, "sqlite", "path"),
    }
}

fn validate_market_dates(config: &dyn ConfigPort) -> Result<(), NisaError> {
    let start = parse_date(
        config.get_string("market", "start_date").as_deref(),
        "market",
        "start_date",
    )?;
    let end = parse_date(
        config.get_string("market", "end_date").as_deref(),
        "market",
        "end_date",
    )?;
    if let (Some(start), Some(end)) = (start, end) {
        if start >= end {
            return Err(NisaError::ConfigInvalid {
                section: "market".to_string(),
                key: "start_date".to_string(),
                reason: "start_date must be before end_date".to_string(),
            });
        }
    }
    Ok(())
}
