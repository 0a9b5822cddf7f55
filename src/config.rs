use std::env;

use crate::errors::{AppError, AppResult};

pub const DEFAULT_DATABASE_URL: &str = "https://xwaste123-default-rtdb.firebaseio.com";
pub const DEFAULT_AUTH_URL: &str = "https://identitytoolkit.googleapis.com";
pub const DEFAULT_GEOCODER_URL: &str = "https://nominatim.openstreetmap.org";

pub const MEMORY_STORE: &str = "memory";

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub firebase_api_key: String,
    pub database_url: String,
    pub auth_url: String,
    pub geocoder_url: String,
    pub geocoder_user_agent: String,
    pub ledger_path: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            firebase_api_key: env::var("FIREBASE_API_KEY").unwrap_or_default(),
            database_url: env::var("FIREBASE_DATABASE_URL")
                .unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string()),
            auth_url: env::var("AUTH_URL").unwrap_or_else(|_| DEFAULT_AUTH_URL.to_string()),
            geocoder_url: env::var("GEOCODER_URL")
                .unwrap_or_else(|_| DEFAULT_GEOCODER_URL.to_string()),
            geocoder_user_agent: env::var("GEOCODER_USER_AGENT")
                .unwrap_or_else(|_| format!("xwaste/{}", env!("CARGO_PKG_VERSION"))),
            ledger_path: env::var("LEDGER_PATH").unwrap_or_else(|_| "xwaste.db".to_string()),
        }
    }

    pub fn load() -> Self {
        let _ = dotenvy::dotenv();
        Self::from_env()
    }

    pub fn validate(&self) -> AppResult<()> {
        if self.database_url != MEMORY_STORE && !is_http(&self.database_url) {
            return Err(AppError::Config(format!(
                "FIREBASE_DATABASE_URL must be an http(s) URL or \"{MEMORY_STORE}\", got {:?}",
                self.database_url
            )));
        }
        for (name, url) in [("AUTH_URL", &self.auth_url), ("GEOCODER_URL", &self.geocoder_url)] {
            if !is_http(url) {
                return Err(AppError::Config(format!("{name} must be an http(s) URL, got {url:?}")));
            }
        }
        if self.geocoder_user_agent.trim().is_empty() {
            return Err(AppError::Config("GEOCODER_USER_AGENT must not be empty".to_string()));
        }
        if self.ledger_path.trim().is_empty() {
            return Err(AppError::Config("LEDGER_PATH must not be empty".to_string()));
        }
        Ok(())
    }
}

fn is_http(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}
