//! OAuth web flow for signing users in with GitHub.

use reqwest::Url;
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::AppError;

const AUTHORIZE_URL: &str = "https://github.com/login/oauth/authorize";
const TOKEN_URL: &str = "https://github.com/login/oauth/access_token";

/// Scope requested from the user.
const SCOPE: &str = "repo";

#[derive(Debug, Serialize)]
struct CodeExchange<'a> {
    client_id: &'a str,
    client_secret: &'a str,
    code: &'a str,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    error_description: Option<String>,
}

/// Where the browser is sent to grant access.
pub fn authorize_url(client_id: &str, redirect_uri: &str, state: &str) -> Result<String, AppError> {
    Url::parse_with_params(
        AUTHORIZE_URL,
        &[
            ("client_id", client_id),
            ("scope", SCOPE),
            ("redirect_uri", redirect_uri),
            ("state", state),
        ],
    )
    .map(String::from)
    .map_err(|e| AppError::Internal(e.to_string()))
}

/// Trades the callback `code` for a user access token.
pub async fn exchange_code(
    http: &reqwest::Client,
    config: &Config,
    code: &str,
) -> Result<String, AppError> {
    let response: TokenResponse = http
        .post(TOKEN_URL)
        .header(reqwest::header::ACCEPT, "application/json")
        .json(&CodeExchange {
            client_id: &config.github_client_id,
            client_secret: &config.github_client_secret,
            code,
        })
        .send()
        .await
        .map_err(|e| AppError::Internal(format!("token exchange failed: {e}")))?
        .json()
        .await
        .map_err(|e| AppError::Internal(format!("token exchange returned garbage: {e}")))?;

    match response.access_token {
        Some(token) if !token.is_empty() => Ok(token),
        _ => {
            if let Some(reason) = response.error_description {
                log::warn!("GitHub refused the OAuth code: {reason}");
            }
            Err(AppError::BadRequest("Failed to get access token".into()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn authorize_url_carries_every_parameter() {
        let url = authorize_url("cid", "http://localhost:8080/auth/github/callback", "e30=")
            .unwrap();
        assert!(url.starts_with("https://github.com/login/oauth/authorize?"));
        assert!(url.contains("client_id=cid"));
        assert!(url.contains("scope=repo"));
        assert!(url.contains("redirect_uri=http%3A%2F%2Flocalhost%3A8080%2Fauth%2Fgithub%2Fcallback"));
        assert!(url.contains("state=e30%3D"));
    }
}
