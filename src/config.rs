use crate::engine::WeightTable;
use crate::orchestration::EventErrorPolicy;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_path: String,
    pub events_path: String,
    pub on_event_error: EventErrorPolicy,
    pub weights: Arc<WeightTable>,
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
        let database_path = env_map
            .get("DATABASE_PATH")
            .cloned()
            .ok_or_else(|| ConfigError::MissingEnv("DATABASE_PATH".to_string()))?;

        let events_path = env_map
            .get("EVENTS_PATH")
            .cloned()
            .ok_or_else(|| ConfigError::MissingEnv("EVENTS_PATH".to_string()))?;

        let on_event_error = env_map
            .get("ON_EVENT_ERROR")
            .map(|s| s.as_str())
            .unwrap_or("halt")
            .parse::<EventErrorPolicy>()
            .map_err(|msg| ConfigError::InvalidValue("ON_EVENT_ERROR".to_string(), msg))?;

        let weights = match env_map.get("WEIGHT_TABLE").filter(|s| !s.trim().is_empty()) {
            Some(raw) => WeightTable::parse(raw).map_err(|e| {
                ConfigError::InvalidValue("WEIGHT_TABLE".to_string(), e.to_string())
            })?,
            None => WeightTable::reference(),
        };

        Ok(Config {
            database_path,
            events_path,
            on_event_error,
            weights: Arc::new(weights),
        })
    }
}
