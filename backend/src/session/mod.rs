//! Server-side login sessions keyed by an opaque cookie.
//!
//! A pending login is recorded when the OAuth round trip starts, bound to a
//! nonce that travels in the OAuth `state`. The callback consumes it and
//! opens an authenticated session under a fresh id holding the user's GitHub
//! token. The browser only ever sees the random ids.
//!
//! - `SessionStore`: clonable shared map injected as `web::Data`.
//! - `start_session_reaper`: background task dropping expired entries.

use actix_web::cookie::{Cookie, SameSite};
use actix_web::HttpRequest;
use chrono::{DateTime, Duration, Utc};
use log::debug;
use std::{collections::HashMap, sync::Arc};
use tokio::sync::RwLock;
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "session";

/// How long a login may take before the pending session lapses.
const PENDING_TTL_MINUTES: i64 = 60;

const REAP_INTERVAL_SECS: u64 = 600;

#[derive(Debug, Clone)]
pub struct Session {
    /// User access token. `None` while the login is pending.
    pub token: Option<String>,
    /// Nonce the callback must present to complete a pending login.
    login_nonce: Option<String>,
    pub expires_at: DateTime<Utc>,
}

/// Handle on a login that has started but not completed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingLogin {
    pub id: String,
    pub nonce: String,
}

impl Session {
    fn is_live(&self, now: DateTime<Utc>) -> bool {
        self.expires_at > now
    }
}

#[derive(Clone, Default)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<String, Session>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a pending login under a new id and nonce.
    pub async fn start_pending(&self) -> PendingLogin {
        let pending = PendingLogin {
            id: Uuid::new_v4().to_string(),
            nonce: Uuid::new_v4().simple().to_string(),
        };
        let session = Session {
            token: None,
            login_nonce: Some(pending.nonce.clone()),
            expires_at: Utc::now() + Duration::minutes(PENDING_TTL_MINUTES),
        };
        self.sessions
            .write()
            .await
            .insert(pending.id.clone(), session);
        pending
    }

    /// Consumes the pending login `id` when it is live and was started with
    /// `nonce`. Anything else leaves the store untouched and returns false.
    pub async fn take_pending(&self, id: &str, nonce: &str) -> bool {
        let now = Utc::now();
        let mut sessions = self.sessions.write().await;
        let matches = sessions.get(id).is_some_and(|s| {
            s.is_live(now) && s.token.is_none() && s.login_nonce.as_deref() == Some(nonce)
        });
        if matches {
            sessions.remove(id);
        }
        matches
    }

    /// Opens a session holding `token` for `ttl_hours` and returns its new id.
    pub async fn authenticate(&self, token: String, ttl_hours: i64) -> String {
        let id = Uuid::new_v4().to_string();
        let session = Session {
            token: Some(token),
            login_nonce: None,
            expires_at: Utc::now() + Duration::hours(ttl_hours),
        };
        self.sessions.write().await.insert(id.clone(), session);
        id
    }

    /// The user token of a live, authenticated session.
    pub async fn token(&self, id: &str) -> Option<String> {
        let now = Utc::now();
        let sessions = self.sessions.read().await;
        sessions
            .get(id)
            .filter(|s| s.is_live(now))
            .and_then(|s| s.token.clone())
    }

    pub async fn remove(&self, id: &str) {
        self.sessions.write().await.remove(id);
    }

    /// Drops expired sessions, returning how many were removed.
    pub async fn purge_expired(&self) -> usize {
        let now = Utc::now();
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, s| s.is_live(now));
        before - sessions.len()
    }
}

/// Periodically purges expired sessions. Spawned once from `main.rs`.
pub async fn start_session_reaper(store: SessionStore) {
    let mut ticker = tokio::time::interval(std::time::Duration::from_secs(REAP_INTERVAL_SECS));
    loop {
        ticker.tick().await;
        let removed = store.purge_expired().await;
        if removed > 0 {
            debug!("purged {removed} expired sessions");
        }
    }
}

pub fn session_id(req: &HttpRequest) -> Option<String> {
    req.cookie(SESSION_COOKIE)
        .map(|c| c.value().to_string())
        .filter(|v| !v.is_empty())
}

pub fn session_cookie(id: &str, secure: bool) -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE, id.to_string())
        .http_only(true)
        .same_site(SameSite::Lax)
        .path("/")
        .secure(secure)
        .finish()
}

pub fn expired_session_cookie(secure: bool) -> Cookie<'static> {
    let mut cookie = session_cookie("", secure);
    cookie.make_removal();
    cookie
}

#[cfg(test)]
mod tests {
    use super::*;

    #[actix_web::test]
    async fn pending_login_has_no_token_and_completes_under_a_new_id() {
        let store = SessionStore::new();
        let pending = store.start_pending().await;
        assert_eq!(store.token(&pending.id).await, None);

        assert!(store.take_pending(&pending.id, &pending.nonce).await);
        let id = store.authenticate("gho_abc".into(), 24).await;
        assert_ne!(id, pending.id);
        assert_eq!(store.token(&id).await.as_deref(), Some("gho_abc"));
        assert_eq!(store.token(&pending.id).await, None);
        // A pending login completes once.
        assert!(!store.take_pending(&pending.id, &pending.nonce).await);

        store.remove(&id).await;
        assert_eq!(store.token(&id).await, None);
    }

    #[actix_web::test]
    async fn pending_login_needs_its_own_nonce() {
        let store = SessionStore::new();
        let pending = store.start_pending().await;
        let other = store.start_pending().await;

        assert!(!store.take_pending("made-up-id", &pending.nonce).await);
        assert!(!store.take_pending(&pending.id, &other.nonce).await);
        assert!(!store.take_pending(&pending.id, "").await);
        assert!(store.take_pending(&pending.id, &pending.nonce).await);
    }

    #[actix_web::test]
    async fn authenticated_sessions_are_not_pending_logins() {
        let store = SessionStore::new();
        let id = store.authenticate("gho_abc".into(), 1).await;
        assert!(!store.take_pending(&id, "").await);
        assert!(store.token(&id).await.is_some());
    }

    #[actix_web::test]
    async fn expired_sessions_are_ignored_and_purged() {
        let store = SessionStore::new();
        let old = store.authenticate("gho_old".into(), -1).await;
        let new = store.authenticate("gho_new".into(), 1).await;
        assert_eq!(store.token(&old).await, None);
        assert_eq!(store.purge_expired().await, 1);
        assert!(store.token(&new).await.is_some());
    }

    #[test]
    fn cookie_is_http_only_and_lax() {
        let cookie = session_cookie("abc", true);
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.secure(), Some(true));

        let removal = expired_session_cookie(false);
        assert_eq!(removal.value(), "");
        assert!(removal.max_age().is_some());
    }
}
