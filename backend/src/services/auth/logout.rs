use actix_web::{web, HttpRequest, HttpResponse};
use common::requests::LogoutResponse;
use log::info;

use crate::config::Config;
use crate::session::{expired_session_cookie, session_id, SessionStore};

pub async fn process(
    req: HttpRequest,
    config: web::Data<Config>,
    sessions: web::Data<SessionStore>,
) -> HttpResponse {
    if let Some(id) = session_id(&req) {
        sessions.remove(&id).await;
        info!("session logged out");
    }
    HttpResponse::Ok()
        .cookie(expired_session_cookie(config.cookie_secure))
        .json(LogoutResponse { success: true })
}
