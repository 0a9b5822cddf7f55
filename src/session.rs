use std::sync::{Arc, RwLock};

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Duration, Utc};

#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub uid: String,
    pub email: String,
    pub id_token: String,
    pub refresh_token: String,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CurrentUser {
    pub uid: String,
    pub email: String,
}

#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    inner: Arc<RwLock<Option<Session>>>,
}

impl SessionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session(session: Session) -> Self {
        let ctx = Self::new();
        ctx.set(session);
        ctx
    }

    pub fn set(&self, session: Session) {
        let mut guard = self.inner.write().unwrap_or_else(|e| e.into_inner());
        *guard = Some(session);
    }

    pub fn clear(&self) {
        let mut guard = self.inner.write().unwrap_or_else(|e| e.into_inner());
        *guard = None;
    }

    pub fn current(&self) -> Option<Session> {
        self.inner.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn current_user(&self) -> Option<CurrentUser> {
        self.current().map(|s| CurrentUser {
            uid: s.uid,
            email: s.email,
        })
    }

    pub fn is_signed_in(&self) -> bool {
        self.current().is_some()
    }
}

/// Reads the `exp` claim of a JWT without verifying it; the server does that.
pub fn token_expiry(id_token: &str) -> Option<DateTime<Utc>> {
    let payload = id_token.split('.').nth(1)?;
    let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')).ok()?;
    let claims: serde_json::Value = serde_json::from_slice(&bytes).ok()?;
    let exp = claims.get("exp")?.as_i64()?;
    DateTime::from_timestamp(exp, 0)
}

pub fn resolve_expiry(id_token: &str, expires_in: Option<&str>) -> DateTime<Utc> {
    token_expiry(id_token).unwrap_or_else(|| {
        let secs = expires_in.and_then(|s| s.parse::<i64>().ok()).unwrap_or(3600);
        Utc::now() + Duration::seconds(secs)
    })
}
