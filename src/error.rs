use thiserror::Error;

pub type Result<T> = std::result::Result<T, FramesiftError>;

#[derive(Debug, Error)]
pub enum FramesiftError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("config error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid task data: {message}")]
    InvalidTask { message: String },

    #[error("task load was cancelled")]
    Cancelled,
}

impl FramesiftError {
    #[must_use]
    pub fn invalid_task(message: impl Into<String>) -> Self {
        Self::InvalidTask {
            message: message.into(),
        }
    }
}
