// Service error types
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Render surface error: {0}")]
    Surface(String),
}

pub type Result<T> = std::result::Result<T, TelemetryError>;
