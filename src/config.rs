use crate::domain::Money;
use crate::engine::TaxPolicy;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub database_path: String,
    /// Balance granted to a user the first time they are seen.
    pub initial_balance: Money,
    pub tax_policy: TaxPolicy,
    /// How long a failed settlement keeps retrying its compensating credit.
    pub rollback_max_elapsed: Duration,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnv(String),
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_map(std::env::vars().collect())
    }

    pub fn from_env_map(env_map: HashMap<String, String>) -> Result<Self, ConfigError> {
        let port = env_map
            .get("PORT")
            .map(|s| s.as_str())
            .unwrap_or("8080")
            .parse::<u16>()
            .map_err(|_| {
                ConfigError::InvalidValue("PORT".to_string(), "must be a valid u16".to_string())
            })?;

        let database_path = env_map
            .get("DATABASE_PATH")
            .cloned()
            .ok_or_else(|| ConfigError::MissingEnv("DATABASE_PATH".to_string()))?;

        let initial_balance = parse_money(&env_map, "INITIAL_BALANCE", "5000")?;

        let defaults = TaxPolicy::default();
        let tax_policy = TaxPolicy {
            sales_tax_rate: parse_rate(&env_map, "SALES_TAX_RATE", defaults.sales_tax_rate)?,
            luxury_tax_rate: parse_rate(&env_map, "LUXURY_TAX_RATE", defaults.luxury_tax_rate)?,
            luxury_threshold: parse_money(&env_map, "LUXURY_THRESHOLD", "1000")?,
        };

        let rollback_timeout_ms = env_map
            .get("ROLLBACK_TIMEOUT_MS")
            .map(|s| s.as_str())
            .unwrap_or("10000")
            .parse::<u64>()
            .map_err(|_| {
                ConfigError::InvalidValue(
                    "ROLLBACK_TIMEOUT_MS".to_string(),
                    "must be a valid u64".to_string(),
                )
            })?;

        Ok(Config {
            port,
            database_path,
            initial_balance,
            tax_policy,
            rollback_max_elapsed: Duration::from_millis(rollback_timeout_ms),
        })
    }
}

fn parse_money(
    env_map: &HashMap<String, String>,
    key: &str,
    default: &str,
) -> Result<Money, ConfigError> {
    let raw = env_map.get(key).map(|s| s.as_str()).unwrap_or(default);
    let value = Money::from_str(raw).map_err(|_| {
        ConfigError::InvalidValue(key.to_string(), format!("not a decimal amount: {}", raw))
    })?;
    if value.is_negative() {
        return Err(ConfigError::InvalidValue(
            key.to_string(),
            "must not be negative".to_string(),
        ));
    }
    Ok(value.round_to_cents())
}

/// Rates are fractions in `[0, 1)`, e.g. `0.08`.
fn parse_rate(
    env_map: &HashMap<String, String>,
    key: &str,
    default: Decimal,
) -> Result<Decimal, ConfigError> {
    let Some(raw) = env_map.get(key) else {
        return Ok(default);
    };
    let rate = Decimal::from_str(raw.trim()).map_err(|_| {
        ConfigError::InvalidValue(key.to_string(), format!("not a decimal rate: {}", raw))
    })?;
    if rate.is_sign_negative() || rate >= Decimal::ONE {
        return Err(ConfigError::InvalidValue(
            key.to_string(),
            format!("must be in [0, 1), got {}", raw),
        ));
    }
    Ok(rate)
}
