use std::fmt::{Display, Formatter};

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use taskdeck_core::ErrorBody;
use thiserror::Error;

pub type ServerResult<T> = Result<T, ServerError>;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("{0}")]
    ApiError(#[from] ApiError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error, PartialEq)]
#[non_exhaustive]
pub enum ApiError {
    NotFound(String),
    Forbidden(String),
    Unprocessable(String),
}

impl ApiError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden(message.into())
    }

    pub fn unprocessable(message: impl Into<String>) -> Self {
        Self::Unprocessable(message.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::Unprocessable(_) => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ApiError::NotFound(message)
            | ApiError::Forbidden(message)
            | ApiError::Unprocessable(message) => message,
        }
    }
}

impl Display for ApiError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Status={}, {}", self.status().as_u16(), self.message())
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            ServerError::ApiError(e) => {
                tracing::warn!("{}", e);
                (e.status(), e.message().to_string())
            }
            ServerError::Io(e) => {
                tracing::error!(%e, "unexpected IO error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Unexpected Error".to_string(),
                )
            }
        };

        (status, axum::Json(ErrorBody::new(detail))).into_response()
    }
}
