use thiserror::Error;

/// All possible errors in the task library
#[derive(Error, Debug)]
pub enum TaskError {
    #[error("Invalid priority: {0}")]
    InvalidPriority(String),

    #[error("Invalid status: {0}")]
    InvalidStatus(String),

    #[error("Task id {0} appears more than once")]
    DuplicateTaskId(String),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, TaskError>;
