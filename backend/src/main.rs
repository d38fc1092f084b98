mod config;
mod error;
mod github;
mod services;
mod session;

use crate::config::Config;
use crate::github::app_token::InstallationTokenService;
use crate::session::SessionStore;
use actix_web::{web, App, HttpRequest, HttpResponse, HttpServer};
use env_logger::Env;
use include_dir::{include_dir, Dir};
use log::{error, info};
use mime_guess::from_path;

static STATIC_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/static/dist");

async fn serve_embedded(req: HttpRequest) -> HttpResponse {
    let path = req.path().trim_start_matches('/');
    let file_path = if path.is_empty() { "index.html" } else { path };

    match STATIC_DIR.get_file(file_path) {
        Some(file) => {
            let mime = from_path(file_path).first_or_octet_stream();
            HttpResponse::Ok()
                .content_type(mime.as_ref())
                .body(file.contents().to_vec())
        }
        None => match STATIC_DIR.get_file("index.html") {
            Some(index) => HttpResponse::Ok()
                .content_type("text/html; charset=utf-8")
                .body(index.contents().to_vec()),
            None => HttpResponse::NotFound().body("Not Found"),
        },
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("{e}");
            return Err(std::io::Error::new(std::io::ErrorKind::InvalidInput, e));
        }
    };
    let bind = (config.host.clone(), config.port);

    let sessions = SessionStore::new();
    let tokens = InstallationTokenService::new(
        config.github_app_id.clone(),
        config.github_private_key.clone(),
    );
    let http = reqwest::Client::new();

    let reaper_sessions = sessions.clone();
    tokio::spawn(async move {
        session::start_session_reaper(reaper_sessions).await;
    });

    info!(
        "Server running at http://{}:{}, submitting to {}/{}",
        bind.0, bind.1, config.upstream_owner, config.upstream_repo
    );

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(config.clone()))
            .app_data(web::Data::new(sessions.clone()))
            .app_data(web::Data::new(tokens.clone()))
            .app_data(web::Data::new(http.clone()))
            .service(services::auth::configure_routes())
            .configure(services::devices::configure_routes)
            .default_service(web::route().to(serve_embedded))
    })
    .bind(bind)?
    .run()
    .await
}
