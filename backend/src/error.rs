use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use common::requests::ErrorResponse;
use log::error;
use thiserror::Error;

/// Error type shared by every handler. The response body is always
/// `{"error": "..."}`.
#[derive(Debug, Error)]
pub enum AppError {
    /// No session, or a session without a user token (401).
    #[error("Authentication required")]
    AuthenticationRequired,

    /// Bad input from the client (400).
    #[error("{0}")]
    BadRequest(String),

    /// A GitHub call failed. `context` is what the client is told (500).
    #[error("{context}")]
    GitHub {
        context: &'static str,
        #[source]
        source: octocrab::Error,
    },

    /// The app could not authenticate as itself (500).
    #[error("Server configuration error")]
    AppAuth(String),

    /// Anything else (500).
    #[error("{0}")]
    Internal(String),
}

impl AppError {
    pub fn github(context: &'static str) -> impl FnOnce(octocrab::Error) -> AppError {
        move |source| AppError::GitHub { context, source }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::AuthenticationRequired => StatusCode::UNAUTHORIZED,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::GitHub { .. } | AppError::AppAuth(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            AppError::GitHub { context, source } => error!("{context}: {source}"),
            AppError::AppAuth(detail) => error!("GitHub App authentication failed: {detail}"),
            AppError::Internal(detail) => error!("internal error: {detail}"),
            _ => {}
        }
        HttpResponse::build(self.status_code()).json(ErrorResponse {
            error: self.to_string(),
        })
    }
}
