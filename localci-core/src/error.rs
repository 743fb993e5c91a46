// Service-wide error type
// Shared across storage, parsing, scheduling and the repo manager

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("execution already in progress")]
    Busy,

    #[error("no runtime detected: {0}")]
    RuntimeMissing(String),

    #[error("sandbox error: {0}")]
    Sandbox(String),

    #[error("operation timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("repository error: {0}")]
    Repo(String),

    #[error("storage error: {0}")]
    Storage(String),
}

pub type ServiceResult<T> = Result<T, ServiceError>;
