use actix_web::http::header;
use actix_web::{web, HttpRequest, HttpResponse};
use log::info;
use serde::Deserialize;

use super::{encode_state, local_path};
use crate::config::Config;
use crate::error::AppError;
use crate::github::oauth;
use crate::session::{session_cookie, SessionStore};

#[derive(Debug, Deserialize)]
pub struct StartQuery {
    #[serde(rename = "returnTo")]
    return_to: Option<String>,
}

pub async fn process(
    req: HttpRequest,
    query: web::Query<StartQuery>,
    config: web::Data<Config>,
    sessions: web::Data<SessionStore>,
) -> Result<HttpResponse, AppError> {
    let return_to = local_path(query.return_to.as_deref().unwrap_or("/"));

    let connection = req.connection_info();
    let redirect_uri = format!(
        "{}://{}/auth/github/callback",
        connection.scheme(),
        connection.host()
    );
    let pending = sessions.start_pending().await;
    let location = oauth::authorize_url(
        &config.github_client_id,
        &redirect_uri,
        &encode_state(&return_to, &pending.nonce),
    )?;
    info!("login started, returning to {return_to}");

    Ok(HttpResponse::Found()
        .insert_header((header::LOCATION, location))
        .cookie(session_cookie(&pending.id, config.cookie_secure))
        .finish())
}
