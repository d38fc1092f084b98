use actix_web::{web, HttpResponse};
use common::form::slug::is_valid_slug;
use common::requests::{SlugAvailability, SlugQuery};
use log::info;

use crate::config::Config;
use crate::error::AppError;
use crate::github::app_token::InstallationTokenService;
use crate::github::repo::UpstreamRepo;

const FAILED: &str = "Failed to check slug availability";

/// A slug is taken when its device folder already exists upstream.
pub async fn process(
    query: web::Query<SlugQuery>,
    config: web::Data<Config>,
    tokens: web::Data<InstallationTokenService>,
) -> Result<HttpResponse, AppError> {
    let slug = query
        .slug
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::BadRequest("No slug provided".into()))?;
    if !is_valid_slug(slug) {
        return Err(AppError::BadRequest(format!("Invalid slug {slug:?}")));
    }

    let repo = UpstreamRepo::new(
        tokens.client().await?,
        &config.upstream_owner,
        &config.upstream_repo,
    );
    let exists = repo
        .path_exists(&config.device_folder(slug))
        .await
        .map_err(AppError::github(FAILED))?;
    if exists {
        info!("slug {slug} is not available");
    }

    Ok(HttpResponse::Ok().json(SlugAvailability { available: !exists }))
}
