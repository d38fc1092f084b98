use actix_web::http::header;
use actix_web::{web, HttpRequest, HttpResponse};
use log::{info, warn};
use serde::Deserialize;

use super::decode_state;
use crate::config::Config;
use crate::error::AppError;
use crate::github::oauth;
use crate::session::{session_cookie, session_id, SessionStore};

const LOGIN_EXPIRED: &str = "Login expired or was started elsewhere, please sign in again";

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    code: Option<String>,
    state: Option<String>,
}

pub async fn process(
    req: HttpRequest,
    query: web::Query<CallbackQuery>,
    config: web::Data<Config>,
    sessions: web::Data<SessionStore>,
    http: web::Data<reqwest::Client>,
) -> Result<HttpResponse, AppError> {
    let code = query
        .code
        .as_deref()
        .filter(|c| !c.is_empty())
        .ok_or_else(|| AppError::BadRequest("No code provided".into()))?;
    let state = decode_state(query.state.as_deref())
        .ok_or_else(|| AppError::BadRequest("Invalid login state".into()))?;

    let pending = session_id(&req).unwrap_or_default();
    if !sessions.take_pending(&pending, &state.nonce).await {
        warn!("login callback without a matching pending login");
        return Err(AppError::BadRequest(LOGIN_EXPIRED.into()));
    }

    let token = oauth::exchange_code(&http, &config, code).await?;
    let id = sessions.authenticate(token, config.session_ttl_hours).await;
    let return_to = state.return_to;
    info!("login completed, returning to {return_to}");

    Ok(HttpResponse::Found()
        .insert_header((header::LOCATION, return_to))
        .cookie(session_cookie(&id, config.cookie_secure))
        .finish())
}
