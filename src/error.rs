//! # Centralized Error Handling
//!
//! This module provides a unified error handling system for the application.
//! It centralizes error logging and HTTP response generation, so middlewares
//! and handlers can fail with a typed error and get a consistent
//! `{"error": "..."}` JSON body back to the client.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use crate::services::discord::{AuthCodeExchangeError, ProviderFetchError};
use crate::services::store::StoreError;

/// Central application error type that encompasses all possible error conditions.
///
/// This enum provides a unified way to handle errors across the application,
/// with automatic conversion to appropriate HTTP responses. _Store errors are logged
/// automatically, while other errors should be logged at the point of creation if needed._
#[derive(Error, Debug)]
pub enum AppError {
    #[error("store error")]
    Store(#[from] StoreError),

    #[error("not found: {0}")]
    NotFound(&'static str),

    #[error("bad request: {0}")]
    BadRequest(&'static str),

    #[error("forbidden: {0}")]
    Forbidden(&'static str),

    #[error("upstream provider error: {0}")]
    BadGateway(String),

    #[error("internal server error")]
    Internal,
}

impl AppError {
    /// The error a protected route answers with when no user was resolved.
    pub fn not_logged_in() -> Self {
        AppError::Forbidden("user not logged in")
    }

    /// HTTP status code this error is reported with.
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::BadGateway(_) => StatusCode::BAD_GATEWAY,
            AppError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let AppError::Store(e) = &self {
            // Log detailed store errors for internal tracking
            error!(?e, "Store error occurred");
        }

        let status = self.status();
        let error = match self {
            AppError::Store(_) => "Database error".to_string(),
            AppError::NotFound(msg) | AppError::BadRequest(msg) | AppError::Forbidden(msg) => {
                msg.to_string()
            }
            AppError::BadGateway(msg) => msg,
            AppError::Internal => "Internal server error".to_string(),
        };

        (status, Json(ErrorBody { error })).into_response()
    }
}

impl From<AuthCodeExchangeError> for AppError {
    fn from(e: AuthCodeExchangeError) -> Self {
        match e {
            AuthCodeExchangeError::MissingCode => AppError::BadRequest("authorization code is missing"),
            AuthCodeExchangeError::UnknownUser(_) => AppError::NotFound("user not found"),
            AuthCodeExchangeError::Store(e) => AppError::Store(e),
            e => AppError::BadGateway(e.to_string()),
        }
    }
}

impl From<ProviderFetchError> for AppError {
    fn from(e: ProviderFetchError) -> Self {
        AppError::BadGateway(e.to_string())
    }
}

/// Convenience Result type alias that uses AppError as the error type.
pub type AppResult<T> = Result<T, AppError>;
