//! GitHub sign-in for the submission form.
//!
//! The provided routes are:
//! - `GET /auth/github?returnTo=`: starts the OAuth round trip. A pending
//!   login cookie is set and the browser is redirected to GitHub with the
//!   return path and the login nonce packed into `state`.
//! - `GET /auth/github/callback?code&state`: checks the cookie and nonce
//!   against the pending login, exchanges the code, stores the user token in
//!   a fresh session and redirects back to the return path.
//! - `GET /auth/check`: reports whether the session holds a working token,
//!   with the user's login and avatar.
//! - `POST /auth/logout`: forgets the session and expires the cookie.

use actix_web::web::{get, post, scope};
use actix_web::Scope;
use base64::{engine::general_purpose, Engine as _};
use serde::{Deserialize, Serialize};

mod callback;
mod check;
mod logout;
mod start;

const API_PATH: &str = "/auth";

pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("/github", get().to(start::process))
        .route("/github/callback", get().to(callback::process))
        .route("/check", get().to(check::process))
        .route("/logout", post().to(logout::process))
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoginState {
    return_to: String,
    nonce: String,
}

/// Packs the return path and login nonce into the OAuth `state` parameter.
fn encode_state(return_to: &str, nonce: &str) -> String {
    let json = serde_json::to_vec(&LoginState {
        return_to: return_to.to_string(),
        nonce: nonce.to_string(),
    })
    .unwrap_or_default();
    general_purpose::STANDARD.encode(json)
}

/// Recovers the login state. Foreign return paths are replaced by `/`.
fn decode_state(state: Option<&str>) -> Option<LoginState> {
    let bytes = general_purpose::STANDARD.decode(state?).ok()?;
    let state = serde_json::from_slice::<LoginState>(&bytes).ok()?;
    Some(LoginState {
        return_to: local_path(&state.return_to),
        nonce: state.nonce,
    })
}

/// Only same-site paths are followed after login.
fn local_path(return_to: &str) -> String {
    if return_to.starts_with('/') && !return_to.starts_with("//") && !return_to.contains('\\') {
        return_to.to_string()
    } else {
        "/".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::session::{SessionStore, SESSION_COOKIE};
    use actix_web::cookie::Cookie;
    use actix_web::http::{header, StatusCode};
    use actix_web::{test, web, App};
    use common::requests::{AuthStatus, LogoutResponse};

    fn return_path(state: &str) -> Option<String> {
        decode_state(Some(state)).map(|s| s.return_to)
    }

    fn callback_request(state: &str, session: Option<&str>) -> test::TestRequest {
        let uri = format!(
            "/auth/github/callback?code=abc&state={}",
            query_escape(state)
        );
        let req = test::TestRequest::get().uri(&uri);
        match session {
            Some(id) => req.cookie(Cookie::new(SESSION_COOKIE, id.to_string())),
            None => req,
        }
    }

    /// Base64 may carry `+`, `/` and `=`, which must be escaped in a query.
    fn query_escape(state: &str) -> String {
        state
            .replace('+', "%2B")
            .replace('/', "%2F")
            .replace('=', "%3D")
    }

    #[actix_web::test]
    async fn state_round_trip_keeps_query_hash_and_nonce() {
        let state = decode_state(Some(&encode_state("/?formState=saved#form", "n1"))).unwrap();
        assert_eq!(state.return_to, "/?formState=saved#form");
        assert_eq!(state.nonce, "n1");
    }

    #[actix_web::test]
    async fn unreadable_or_foreign_state() {
        assert!(decode_state(None).is_none());
        assert!(decode_state(Some("%%%")).is_none());
        assert!(decode_state(Some("e30=")).is_none());
        assert_eq!(return_path(&encode_state("https://evil.test/", "n")).as_deref(), Some("/"));
        assert_eq!(return_path(&encode_state("//evil.test/", "n")).as_deref(), Some("/"));
    }

    #[actix_web::test]
    async fn start_sets_cookie_and_redirects_to_github() {
        let sessions = SessionStore::new();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(Config::for_tests()))
                .app_data(web::Data::new(sessions.clone()))
                .service(configure_routes()),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/auth/github?returnTo=%2F%3FformState%3Dsaved")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FOUND);

        let location = resp
            .headers()
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        assert!(location.starts_with("https://github.com/login/oauth/authorize?"));
        assert!(location.contains("client_id=test-client"));
        assert!(location.contains("%2Fauth%2Fgithub%2Fcallback"));

        let cookie = resp
            .response()
            .cookies()
            .find(|c| c.name() == SESSION_COOKIE)
            .unwrap();
        assert_eq!(cookie.http_only(), Some(true));
        assert!(!cookie.value().is_empty());

        // The state carries the nonce of the pending login behind the cookie.
        let url = reqwest::Url::parse(&location).unwrap();
        let state = url
            .query_pairs()
            .find(|(k, _)| k == "state")
            .map(|(_, v)| v.into_owned())
            .unwrap();
        let state = decode_state(Some(&state)).unwrap();
        assert_eq!(state.return_to, "/?formState=saved");
        assert!(sessions.take_pending(cookie.value(), &state.nonce).await);
    }

    #[actix_web::test]
    async fn callback_needs_the_pending_login_it_was_started_with() {
        let sessions = SessionStore::new();
        let pending = sessions.start_pending().await;
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(Config::for_tests()))
                .app_data(web::Data::new(sessions.clone()))
                .app_data(web::Data::new(reqwest::Client::new()))
                .service(configure_routes()),
        )
        .await;

        let own_state = encode_state("/", &pending.nonce);
        let foreign_state = encode_state("/", "attacker-nonce");
        let rejected = [
            callback_request(&own_state, None),
            callback_request(&own_state, Some("unknown-session")),
            callback_request(&foreign_state, Some(&pending.id)),
            callback_request("e30=", Some(&pending.id)),
        ];
        for req in rejected {
            let resp = test::call_service(&app, req.to_request()).await;
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        }
        // None of the rejected attempts consumed the real pending login.
        assert!(sessions.take_pending(&pending.id, &pending.nonce).await);
    }

    #[actix_web::test]
    async fn callback_without_code_is_rejected() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(Config::for_tests()))
                .app_data(web::Data::new(SessionStore::new()))
                .app_data(web::Data::new(reqwest::Client::new()))
                .service(configure_routes()),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/auth/github/callback?state=e30=")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn check_without_session_is_anonymous() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(SessionStore::new()))
                .service(configure_routes()),
        )
        .await;

        let req = test::TestRequest::get().uri("/auth/check").to_request();
        let status: AuthStatus = test::call_and_read_body_json(&app, req).await;
        assert_eq!(status, AuthStatus::anonymous());

        // A pending login has no token yet.
        let sessions = SessionStore::new();
        let id = sessions.start_pending().await.id;
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(sessions))
                .service(configure_routes()),
        )
        .await;
        let req = test::TestRequest::get()
            .uri("/auth/check")
            .cookie(Cookie::new(SESSION_COOKIE, id))
            .to_request();
        let status: AuthStatus = test::call_and_read_body_json(&app, req).await;
        assert!(!status.authenticated);
    }

    #[actix_web::test]
    async fn logout_forgets_session_and_expires_cookie() {
        let sessions = SessionStore::new();
        let id = sessions.authenticate("gho_token".into(), 1).await;
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(Config::for_tests()))
                .app_data(web::Data::new(sessions.clone()))
                .service(configure_routes()),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/auth/logout")
            .cookie(Cookie::new(SESSION_COOKIE, id.clone()))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let cookie = resp
            .response()
            .cookies()
            .find(|c| c.name() == SESSION_COOKIE)
            .unwrap();
        assert_eq!(cookie.value(), "");
        let body: LogoutResponse = test::read_body_json(resp).await;
        assert!(body.success);
        assert_eq!(sessions.token(&id).await, None);
    }
}
