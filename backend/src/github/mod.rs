pub mod app_token;
pub mod oauth;
pub mod repo;

use octocrab::Octocrab;

use crate::error::AppError;

/// An API client acting as the signed-in user.
pub fn user_client(token: String) -> Result<Octocrab, AppError> {
    Octocrab::builder()
        .personal_token(token)
        .build()
        .map_err(|e| AppError::Internal(e.to_string()))
}
