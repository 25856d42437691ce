use thiserror::Error;

#[derive(Debug, Error)]
pub enum DesignError {
    #[error("invalid generation parameters: {0}")]
    InvalidParameters(String),

    #[error("invalid design: {0}")]
    Invalid(String),

    #[error("design JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type DesignResult<T> = Result<T, DesignError>;
