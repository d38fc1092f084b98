//! Calls to the backend. Every function resolves to a value the update loop
//! can apply directly; transport failures are folded into that value.

use common::form::submission::{SubmissionPayload, SubmitOutcome};
use common::model::image::ImageCandidate;
use common::requests::{AuthStatus, SlugAvailability};
use gloo_console::warn;
use gloo_file::Blob;
use gloo_net::http::Request;
use web_sys::FormData;

use crate::config::SERVER;

pub async fn check_auth() -> Result<AuthStatus, String> {
    let resp = Request::get(SERVER.check_auth_url)
        .send()
        .await
        .map_err(|e| e.to_string())?;
    if !resp.ok() {
        return Err(format!("HTTP {}", resp.status()));
    }
    resp.json::<AuthStatus>().await.map_err(|e| e.to_string())
}

/// `None` when the answer is unknown, which the form treats as available.
pub async fn check_slug(slug: &str) -> Option<bool> {
    let resp = Request::get(SERVER.check_slug_url)
        .query([("slug", slug)])
        .send()
        .await
        .map_err(|e| warn!(format!("slug check failed: {e}")))
        .ok()?;
    if !resp.ok() {
        return None;
    }
    resp.json::<SlugAvailability>()
        .await
        .ok()
        .map(|answer| answer.available)
}

pub async fn submit(payload: &SubmissionPayload) -> SubmitOutcome {
    let form = match build_form_data(payload) {
        Ok(form) => form,
        Err(e) => return SubmitOutcome::Failed(e),
    };
    let request = match Request::post(SERVER.submit_url).body(form) {
        Ok(request) => request,
        Err(e) => return SubmitOutcome::Failed(e.to_string()),
    };
    match request.send().await {
        Ok(resp) => {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            SubmitOutcome::from_response(status, &body)
        }
        Err(e) => SubmitOutcome::from_error_message(e.to_string()),
    }
}

fn build_form_data(payload: &SubmissionPayload) -> Result<FormData, String> {
    let form = FormData::new().map_err(|e| format!("{e:?}"))?;
    for (name, value) in &payload.fields {
        form.append_with_str(name, value)
            .map_err(|e| format!("{e:?}"))?;
    }
    for image in &payload.images {
        let blob: web_sys::Blob =
            Blob::new_with_options(image.bytes.as_slice(), Some(image.mime.as_str())).into();
        form.append_with_blob_and_filename(&image.field_name, &blob, &image.file_name)
            .map_err(|e| format!("{e:?}"))?;
    }
    Ok(form)
}

pub async fn logout() -> bool {
    match Request::post(SERVER.logout_url).send().await {
        Ok(resp) => resp.ok(),
        Err(e) => {
            warn!(format!("logout failed: {e}"));
            false
        }
    }
}

/// Downloads an image dropped as a link. The MIME type comes from the
/// response headers, parameters stripped.
pub async fn fetch_image(url: &str) -> Result<ImageCandidate, String> {
    let resp = Request::get(url).send().await.map_err(|e| e.to_string())?;
    if !resp.ok() {
        return Err(format!("HTTP {}", resp.status()));
    }
    let mime = resp
        .headers()
        .get("content-type")
        .map(|value| value.split(';').next().unwrap_or_default().trim().to_string())
        .unwrap_or_default();
    let bytes = resp.binary().await.map_err(|e| e.to_string())?;
    Ok(ImageCandidate::new(mime, bytes))
}
