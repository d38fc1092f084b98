//! Device catalogue endpoints used by the submission form.
//!
//! - `GET /checkSlug?slug=`: `{available}` depending on whether the device
//!   folder already exists in the upstream repository.
//! - `POST /submit`: multipart form from the editor. Requires a signed-in
//!   session, commits the device files to a fresh branch and answers with
//!   the pull request URL.
//!
//! Both paths live at the root, so they are registered through
//! `App::configure` rather than a prefixed scope.

use actix_web::web::{get, post, ServiceConfig};

mod check_slug;
mod render;
mod submit;

pub fn configure_routes(cfg: &mut ServiceConfig) {
    cfg.route("/checkSlug", get().to(check_slug::process))
        .route("/submit", post().to(submit::process));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::github::app_token::InstallationTokenService;
    use actix_web::http::StatusCode;
    use actix_web::{test, web, App};
    use common::requests::ErrorResponse;

    #[actix_web::test]
    async fn check_slug_requires_a_slug() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(Config::for_tests()))
                .app_data(web::Data::new(InstallationTokenService::new("app", "")))
                .configure(configure_routes),
        )
        .await;

        for uri in ["/checkSlug", "/checkSlug?slug=", "/checkSlug?slug=%2E%2E"] {
            let req = test::TestRequest::get().uri(uri).to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{uri}");
            let body: ErrorResponse = test::read_body_json(resp).await;
            assert!(!body.error.is_empty());
        }
    }
}
