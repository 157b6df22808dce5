use thiserror::Error;

use crate::events::BusId;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Unknown event bus: {0:?}")]
    UnknownBus(BusId),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, EngineError>;
