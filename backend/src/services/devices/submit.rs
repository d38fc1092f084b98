use actix_multipart::{Field, Multipart};
use actix_web::{web, HttpRequest, HttpResponse};
use chrono::Utc;
use common::form::slug::is_valid_slug;
use common::model::image::MAX_IMAGE_BYTES;
use common::requests::{fields, SubmitResponse};
use futures_util::StreamExt;
use log::{info, warn};
use std::collections::BTreeMap;
use uuid::Uuid;

use super::render::{
    branch_name, device_markdown, pull_request_body, pull_request_title, sanitize_file_name,
    split_list, DeviceSubmission, UploadedImage,
};
use crate::config::Config;
use crate::error::AppError;
use crate::github::app_token::InstallationTokenService;
use crate::github::repo::UpstreamRepo;
use crate::session::{session_id, SessionStore};

/// Ceiling for any single text part; a YAML sample is the largest.
const MAX_TEXT_FIELD_BYTES: usize = 256 * 1024;

const FAILED: &str = "Failed to submit device";

/// Handles `POST /submit`: turns the form into a branch with the device
/// files and opens a pull request from it.
pub async fn process(
    req: HttpRequest,
    payload: Multipart,
    config: web::Data<Config>,
    sessions: web::Data<SessionStore>,
    tokens: web::Data<InstallationTokenService>,
) -> Result<HttpResponse, AppError> {
    let id = session_id(&req).ok_or(AppError::AuthenticationRequired)?;
    if sessions.token(&id).await.is_none() {
        return Err(AppError::AuthenticationRequired);
    }

    let device = read_submission(payload).await?;
    if !device.has_required_fields() {
        return Err(AppError::BadRequest("Missing required fields".into()));
    }
    if !is_valid_slug(&device.slug) {
        return Err(AppError::BadRequest(format!("Invalid slug {:?}", device.slug)));
    }
    if let Some(message) = device.vocabulary_error() {
        return Err(AppError::BadRequest(message));
    }

    let repo = UpstreamRepo::new(
        tokens.client().await?,
        &config.upstream_owner,
        &config.upstream_repo,
    );
    let pr_url = publish(&repo, &config, &device).await?;
    info!("opened pull request for {}: {:?}", device.slug, pr_url);

    Ok(HttpResponse::Ok().json(SubmitResponse {
        success: true,
        pr_url,
    }))
}

async fn publish(
    repo: &UpstreamRepo,
    config: &Config,
    device: &DeviceSubmission,
) -> Result<Option<String>, AppError> {
    let short_id: String = Uuid::new_v4().simple().to_string().chars().take(8).collect();
    let branch = branch_name(&device.slug, &short_id, Utc::now().date_naive());

    let base_sha = repo
        .branch_sha(&config.base_branch)
        .await
        .map_err(AppError::github(FAILED))?;
    if repo
        .branch_exists(&branch)
        .await
        .map_err(AppError::github(FAILED))?
    {
        return Err(AppError::BadRequest(format!("Branch {branch} already exists")));
    }
    repo.create_branch(&branch, &base_sha)
        .await
        .map_err(AppError::github(FAILED))?;

    let folder = config.device_folder(&device.slug);
    for image in &device.images {
        repo.create_file(
            &branch,
            &format!("{}/images/{}", folder, image.file_name),
            &format!("Add image {} for {}", image.file_name, device.slug),
            &image.bytes,
        )
        .await
        .map_err(AppError::github(FAILED))?;
    }

    let files = [
        (format!("{folder}/device.md"), device_markdown(device)),
        (format!("{folder}/config.yaml"), device.yaml_config.clone()),
    ];
    for (path, content) in &files {
        repo.create_file(
            &branch,
            path,
            &format!("Add {} for {}", path, device.slug),
            content.as_bytes(),
        )
        .await
        .map_err(AppError::github(FAILED))?;
    }

    repo.open_pull_request(
        &pull_request_title(device),
        &branch,
        &config.base_branch,
        &pull_request_body(device),
    )
    .await
    .map_err(AppError::github(FAILED))
}

/// Reads every multipart part into a [`DeviceSubmission`]. Unknown parts are
/// skipped.
async fn read_submission(mut payload: Multipart) -> Result<DeviceSubmission, AppError> {
    let mut device = DeviceSubmission::default();

    while let Some(item) = payload.next().await {
        let mut field = item.map_err(|e| AppError::BadRequest(format!("Malformed form: {e}")))?;
        let name = field
            .content_disposition()
            .and_then(|cd| cd.get_name().map(|n| n.to_string()))
            .unwrap_or_default();

        if name.starts_with(fields::IMAGE_PREFIX) {
            let file_name = field
                .content_disposition()
                .and_then(|cd| cd.get_filename().map(|f| f.to_string()));
            let bytes = read_limited(&mut field, MAX_IMAGE_BYTES)
                .await?
                .ok_or_else(|| {
                    AppError::BadRequest(format!(
                        "Image {} exceeds maximum size of {}kB",
                        name,
                        MAX_IMAGE_BYTES / 1024
                    ))
                })?;
            device.images.push(accept_image(&name, file_name, bytes)?);
            continue;
        }

        let bytes = read_limited(&mut field, MAX_TEXT_FIELD_BYTES)
            .await?
            .ok_or_else(|| AppError::BadRequest(format!("Field {name} is too large")))?;
        let value = String::from_utf8(bytes)
            .map_err(|_| AppError::BadRequest(format!("Field {name} is not valid UTF-8")))?;

        match name.as_str() {
            fields::SLUG => device.slug = value.trim().to_string(),
            fields::BOARD_NAME => device.board_name = value.trim().to_string(),
            fields::DESCRIPTION => device.description = value.trim().to_string(),
            fields::CHIP_TYPE => device.chip_type = value.trim().to_string(),
            fields::PRODUCT_LINK => device.product_link = non_blank(value),
            fields::DIFFICULTY_RATING => device.difficulty_rating = non_blank(value),
            fields::MADE_FOR_ESPHOME => device.made_for_esphome = non_blank(value),
            fields::ELECTRICAL_STANDARDS => device.electrical_standards = split_list(&value),
            fields::TAGS => device.tags = split_list(&value),
            fields::YAML_CONFIG => device.yaml_config = value,
            fields::GPIO_PINS => {
                device.gpio_pins = serde_json::from_str::<BTreeMap<String, String>>(&value)
                    .map_err(|_| AppError::BadRequest("gpioPins must be a JSON object".into()))?;
            }
            other => warn!("ignoring unexpected form field {other:?}"),
        }
    }

    Ok(device)
}

fn non_blank(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Collects a part's bytes, or `None` once it grows past `limit`.
async fn read_limited(field: &mut Field, limit: usize) -> Result<Option<Vec<u8>>, AppError> {
    let mut buf = Vec::new();
    while let Some(chunk) = field.next().await {
        let chunk = chunk.map_err(|e| AppError::BadRequest(format!("Malformed form: {e}")))?;
        if buf.len() + chunk.len() > limit {
            return Ok(None);
        }
        buf.extend_from_slice(&chunk);
    }
    Ok(Some(buf))
}

/// Checks that an uploaded part really is an image and picks its name in
/// the repository.
fn accept_image(
    field_name: &str,
    file_name: Option<String>,
    bytes: Vec<u8>,
) -> Result<UploadedImage, AppError> {
    let format = image::guess_format(&bytes)
        .map_err(|_| AppError::BadRequest(format!("{field_name} is not an image")))?;

    let sanitized = file_name
        .map(|n| sanitize_file_name(&n))
        .filter(|n| n.chars().any(|c| c.is_ascii_alphanumeric()));
    let file_name = match sanitized {
        Some(name) => name,
        None => {
            let ext = format.extensions_str().first().copied().unwrap_or("bin");
            format!("{field_name}.{ext}")
        }
    };
    Ok(UploadedImage { file_name, bytes })
}
