use crate::models::TaskId;
use thiserror::Error;

pub type ClientResult<T> = Result<T, ClientError>;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Request failed with status {status}: {message}")]
    RequestFailed { status: u16, message: String },

    #[error("Task not found: {0}")]
    NotFound(TaskId),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ClientError {
    /// True for the coarse "request failed" class: the transport broke or
    /// the store answered with a non-2xx status.
    pub fn is_network(&self) -> bool {
        matches!(
            self,
            ClientError::Network(_) | ClientError::RequestFailed { .. }
        )
    }

    pub fn is_not_found(&self) -> bool {
        match self {
            ClientError::NotFound(_) => true,
            ClientError::RequestFailed { status, .. } => *status == 404,
            _ => false,
        }
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }
}
