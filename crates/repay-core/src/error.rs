use thiserror::Error;

#[derive(Debug, Error)]
pub enum RepayError {
    #[error("Invalid input: {field}: {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for RepayError {
    fn from(e: serde_json::Error) -> Self {
        RepayError::SerializationError(e.to_string())
    }
}

impl From<std::io::Error> for RepayError {
    fn from(e: std::io::Error) -> Self {
        RepayError::Io(e.to_string())
    }
}

#[cfg(feature = "config")]
impl From<toml::de::Error> for RepayError {
    fn from(e: toml::de::Error) -> Self {
        RepayError::Config(e.to_string())
    }
}
