use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("not authorized: {0}")]
    NotAuthorized(String),

    #[error("already voted: {0}")]
    AlreadyVoted(String),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("processing error: {0}")]
    Processing(String),
}

impl CoreError {
    /// Whether the caller could retry with corrected input.
    pub fn is_user_error(&self) -> bool {
        match self {
            CoreError::NotFound(_) => true,
            CoreError::NotAuthorized(_) => true,
            CoreError::AlreadyVoted(_) => true,
            CoreError::Validation(_) => true,
            CoreError::Serialization(_) => true,
            CoreError::Processing(_) => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;
