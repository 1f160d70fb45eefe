use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("unknown entity type: {0}")]
    UnknownEntity(String),
    #[error("unknown severity: {0}")]
    UnknownSeverity(String),
    #[error("unknown category: {0}")]
    UnknownCategory(String),
    #[error("{0}")]
    Message(String),
}

pub type Result<T> = std::result::Result<T, ModelError>;
