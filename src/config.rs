use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub database_path: String,
    /// Seed default settings and multipliers at startup (never overwrites).
    pub seed_defaults: bool,
    /// Months in a fan's monthly score history.
    pub history_months: usize,
    /// Recent logs returned with a fan's score report.
    pub recent_logs_limit: usize,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnv(String),
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

const MAX_HISTORY_MONTHS: usize = 120;

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

        let seed_defaults = match env_map
            .get("SEED_DEFAULTS")
            .map(|s| s.trim().to_ascii_lowercase())
            .as_deref()
            .unwrap_or("true")
        {
            "true" | "1" | "yes" => true,
            "false" | "0" | "no" => false,
            other => {
                return Err(ConfigError::InvalidValue(
                    "SEED_DEFAULTS".to_string(),
                    format!("must be true or false, got {}", other),
                ))
            }
        };

        let history_months = env_map
            .get("HISTORY_MONTHS")
            .map(|s| s.as_str())
            .unwrap_or("12")
            .parse::<usize>()
            .ok()
            .filter(|n| (1..=MAX_HISTORY_MONTHS).contains(n))
            .ok_or_else(|| {
                ConfigError::InvalidValue(
                    "HISTORY_MONTHS".to_string(),
                    format!("must be between 1 and {}", MAX_HISTORY_MONTHS),
                )
            })?;

        let recent_logs_limit = env_map
            .get("RECENT_LOGS_LIMIT")
            .map(|s| s.as_str())
            .unwrap_or("20")
            .parse::<usize>()
            .map_err(|_| {
                ConfigError::InvalidValue(
                    "RECENT_LOGS_LIMIT".to_string(),
                    "must be a non-negative integer".to_string(),
                )
            })?;

        Ok(Config {
            port,
            database_path,
            seed_defaults,
            history_months,
            recent_logs_limit,
        })
    }
}
