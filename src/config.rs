use std::collections::HashMap;
use thiserror::Error;

use crate::engine::fees::DENOM;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub database_path: String,
    /// Account all escrowed funds are held under.
    pub escrow_account: String,
    /// Protocol fee-collection account.
    pub fee_sink: String,
    /// Fee rate (over DENOM) for order types without an explicit rate.
    pub default_fee_rate: i64,
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

        let escrow_account = env_map
            .get("ESCROW_ACCOUNT")
            .cloned()
            .ok_or_else(|| ConfigError::MissingEnv("ESCROW_ACCOUNT".to_string()))?;

        let fee_sink = env_map
            .get("FEE_SINK")
            .cloned()
            .ok_or_else(|| ConfigError::MissingEnv("FEE_SINK".to_string()))?;

        let default_fee_rate = env_map
            .get("DEFAULT_FEE_RATE")
            .map(|s| s.as_str())
            .unwrap_or("0")
            .parse::<i64>()
            .map_err(|_| {
                ConfigError::InvalidValue(
                    "DEFAULT_FEE_RATE".to_string(),
                    "must be a valid i64".to_string(),
                )
            })?;
        if !(0..=DENOM).contains(&default_fee_rate) {
            return Err(ConfigError::InvalidValue(
                "DEFAULT_FEE_RATE".to_string(),
                format!("must be between 0 and {}", DENOM),
            ));
        }

        Ok(Config {
            port,
            database_path,
            escrow_account,
            fee_sink,
            default_fee_rate,
        })
    }
}
