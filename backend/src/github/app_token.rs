//! Installation access tokens for the GitHub App.
//!
//! Repository writes are made as the app, not as the signed-in user. The
//! app signs a short-lived RS256 JWT, finds its installation and trades the
//! JWT for an installation token valid for one hour. The token is cached
//! here with an expiry and shared by every request through `web::Data`.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use log::info;
use octocrab::Octocrab;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::error::AppError;

/// Installation tokens live 60 minutes; refresh a minute early.
const TOKEN_LIFETIME_MINUTES: i64 = 59;

/// Lifetime of the signed app JWT.
const JWT_LIFETIME_SECS: i64 = 300;

#[derive(Debug, Serialize)]
struct AppClaims {
    iat: i64,
    exp: i64,
    iss: String,
}

#[derive(Debug, Deserialize)]
struct Installation {
    id: u64,
}

#[derive(Debug, Deserialize)]
struct AccessToken {
    token: String,
}

#[derive(Debug, Clone)]
struct CachedToken {
    token: String,
    expires_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct InstallationTokenService {
    app_id: String,
    private_key: Arc<String>,
    cached: Arc<Mutex<Option<CachedToken>>>,
}

impl InstallationTokenService {
    pub fn new(app_id: impl Into<String>, private_key: impl Into<String>) -> Self {
        Self {
            app_id: app_id.into(),
            private_key: Arc::new(private_key.into()),
            cached: Arc::new(Mutex::new(None)),
        }
    }

    /// An API client authenticated as the installation.
    pub async fn client(&self) -> Result<Octocrab, AppError> {
        let token = self.token().await?;
        Octocrab::builder()
            .personal_token(token)
            .build()
            .map_err(|e| AppError::AppAuth(e.to_string()))
    }

    /// Returns the cached token or fetches a new one. The lock is held
    /// across the refresh so concurrent requests share a single fetch.
    pub async fn token(&self) -> Result<String, AppError> {
        let mut cached = self.cached.lock().await;
        let now = Utc::now();
        if let Some(entry) = cached.as_ref().filter(|c| c.expires_at > now) {
            return Ok(entry.token.clone());
        }

        let token = self.fetch_token().await?;
        info!("refreshed GitHub App installation token");
        *cached = Some(CachedToken {
            token: token.clone(),
            expires_at: now + Duration::minutes(TOKEN_LIFETIME_MINUTES),
        });
        Ok(token)
    }

    async fn fetch_token(&self) -> Result<String, AppError> {
        let jwt = self.sign_jwt(Utc::now())?;
        let app = Octocrab::builder()
            .personal_token(jwt)
            .build()
            .map_err(|e| AppError::AppAuth(e.to_string()))?;

        let installations: Vec<Installation> = app
            .get("/app/installations", None::<&()>)
            .await
            .map_err(|e| AppError::AppAuth(e.to_string()))?;
        let installation = installations
            .first()
            .ok_or_else(|| AppError::AppAuth("no installation found for this GitHub App".into()))?;

        let access: AccessToken = app
            .post(
                format!("/app/installations/{}/access_tokens", installation.id),
                None::<&()>,
            )
            .await
            .map_err(|e| AppError::AppAuth(e.to_string()))?;
        Ok(access.token)
    }

    fn sign_jwt(&self, now: DateTime<Utc>) -> Result<String, AppError> {
        let key = EncodingKey::from_rsa_pem(self.private_key.as_bytes())
            .map_err(|e| AppError::AppAuth(format!("invalid private key: {e}")))?;
        let claims = AppClaims {
            iat: now.timestamp(),
            exp: now.timestamp() + JWT_LIFETIME_SECS,
            iss: self.app_id.clone(),
        };
        encode(&Header::new(Algorithm::RS256), &claims, &key)
            .map_err(|e| AppError::AppAuth(format!("could not sign app JWT: {e}")))
    }

    #[cfg(test)]
    async fn seed(&self, token: &str, expires_at: DateTime<Utc>) {
        *self.cached.lock().await = Some(CachedToken {
            token: token.to_string(),
            expires_at,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[actix_web::test]
    async fn live_token_is_reused() {
        let service = InstallationTokenService::new("app", "not a key");
        service
            .seed("ghs_cached", Utc::now() + Duration::minutes(5))
            .await;
        assert_eq!(service.token().await.unwrap(), "ghs_cached");
    }

    #[actix_web::test]
    async fn expired_token_is_refreshed() {
        let service = InstallationTokenService::new("app", "not a key");
        service
            .seed("ghs_stale", Utc::now() - Duration::minutes(1))
            .await;
        // The refresh fails on the key before any request is made.
        assert!(matches!(service.token().await, Err(AppError::AppAuth(_))));
    }

    #[actix_web::test]
    async fn clones_share_the_cache() {
        let service = InstallationTokenService::new("app", "not a key");
        let other = service.clone();
        service
            .seed("ghs_shared", Utc::now() + Duration::minutes(5))
            .await;
        assert_eq!(other.token().await.unwrap(), "ghs_shared");
    }
}
