use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid span [{start}, {end}): start must be before end")]
    InvalidSpan { start: usize, end: usize },

    #[error("confidence {0} is outside [0, 1]")]
    InvalidConfidence(f64),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("config file not found: {0}")]
    ConfigNotFound(std::path::PathBuf),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),
}
