//! # ApiError
//!
//! Every failed request answers `{"error": "<message>"}`. Server-side causes
//! are logged here and never leave the process.

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use cb_core::error::AppError;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    PayloadTooLarge(String),

    /// Required server configuration is absent.
    #[error("{0}")]
    Misconfigured(String),

    #[error("{message}")]
    Internal {
        message: &'static str,
        #[source]
        source: anyhow::Error,
    },
}

impl ApiError {
    pub fn invalid_id() -> Self {
        ApiError::BadRequest("Invalid id".into())
    }

    /// Maps a domain error, using `message` for anything that is the
    /// server's fault.
    pub fn from_app(err: AppError, message: &'static str) -> Self {
        match err {
            AppError::NotFound(..) => ApiError::NotFound(err.to_string()),
            AppError::ValidationError(msg) => ApiError::BadRequest(msg),
            AppError::Unauthorized => ApiError::Unauthorized,
            AppError::Misconfigured(msg) => ApiError::Misconfigured(msg),
            AppError::PayloadTooLarge(msg) => ApiError::PayloadTooLarge(msg),
            AppError::Storage(source) => ApiError::internal(message, source),
        }
    }

    /// Closure form of [`ApiError::from_app`] for `map_err`.
    pub fn context(message: &'static str) -> impl FnOnce(AppError) -> ApiError {
        move |err| ApiError::from_app(err, message)
    }

    pub fn internal(message: &'static str, source: impl Into<anyhow::Error>) -> Self {
        let source = source.into();
        log::error!("{message}: {source:#}");
        ApiError::Internal { message, source }
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        ApiError::from_app(err, "Internal server error")
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::Misconfigured(_) | ApiError::Internal { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({ "error": self.to_string() }))
    }
}
