use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingVar(String),
    #[error("Invalid value for environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    /// Address of the coordinator daemon. Reconnects reuse the same address.
    pub coordinator_addr: SocketAddr,
    /// Identity announced during registration.
    pub service_name: String,
    /// How long to wait for a registration acknowledgement.
    pub registration_timeout: Duration,
    /// Optional JSON file replacing the built-in answer set.
    pub answers_path: Option<PathBuf>,
    /// Optional fixed seed for answer selection.
    pub answer_seed: Option<u64>,
    pub log_level: Level,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        let coordinator_addr = std::env::var("COORDINATOR_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:10543".to_string())
            .parse::<SocketAddr>()
            .map_err(|e| {
                ConfigError::InvalidValue("COORDINATOR_ADDR".to_string(), e.to_string())
            })?;

        let service_name = std::env::var("SERVICE_NAME").unwrap_or_else(|_| "oracle".to_string());
        if service_name.is_empty() {
            return Err(ConfigError::InvalidValue(
                "SERVICE_NAME".to_string(),
                "must not be empty".to_string(),
            ));
        }

        let registration_timeout = match std::env::var("REGISTRATION_TIMEOUT_MS") {
            Ok(raw) => {
                let millis = raw.parse::<u64>().map_err(|e| {
                    ConfigError::InvalidValue("REGISTRATION_TIMEOUT_MS".to_string(), e.to_string())
                })?;
                Duration::from_millis(millis)
            }
            Err(_) => Duration::from_millis(5000),
        };

        let answers_path = std::env::var("ANSWERS_PATH").map(PathBuf::from).ok();

        let answer_seed = match std::env::var("ANSWER_SEED") {
            Ok(raw) => Some(raw.parse::<u64>().map_err(|e| {
                ConfigError::InvalidValue("ANSWER_SEED".to_string(), e.to_string())
            })?),
            Err(_) => None,
        };

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        Ok(Self {
            coordinator_addr,
            service_name,
            registration_timeout,
            answers_path,
            answer_seed,
            log_level,
        })
    }
}
