use actix_web::{web, HttpRequest, HttpResponse};
use common::requests::AuthStatus;
use log::warn;

use crate::error::AppError;
use crate::github::user_client;
use crate::session::{session_id, SessionStore};

/// Verifies the stored token against GitHub. A token GitHub no longer
/// accepts ends the session.
pub async fn process(
    req: HttpRequest,
    sessions: web::Data<SessionStore>,
) -> Result<HttpResponse, AppError> {
    let Some(id) = session_id(&req) else {
        return Ok(HttpResponse::Ok().json(AuthStatus::anonymous()));
    };
    let Some(token) = sessions.token(&id).await else {
        return Ok(HttpResponse::Ok().json(AuthStatus::anonymous()));
    };

    match user_client(token)?.current().user().await {
        Ok(user) => Ok(HttpResponse::Ok().json(AuthStatus {
            authenticated: true,
            username: Some(user.login),
            avatar_url: Some(user.avatar_url.to_string()),
        })),
        Err(e) => {
            warn!("stored token rejected, ending session: {e}");
            sessions.remove(&id).await;
            Ok(HttpResponse::Ok().json(AuthStatus::anonymous()))
        }
    }
}
