#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("remote store error: {0}")]
    Store(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("geocoding error: {0}")]
    Geocoding(String),

    #[error("not signed in")]
    Unauthenticated,

    #[error("request cancelled")]
    Cancelled,

    #[error("ledger error: {0}")]
    Ledger(#[from] rusqlite::Error),

    #[error("configuration error: {0}")]
    Config(String),
}

impl AppError {
    pub fn blank_fields() -> Self {
        AppError::Validation("Please fill all fields".to_string())
    }

    pub fn toast_message(&self) -> Option<String> {
        match self {
            AppError::Validation(msg) => Some(msg.clone()),
            AppError::Auth(msg) => Some(msg.clone()),
            AppError::Store(msg) => Some(format!("Error: {msg}")),
            AppError::NotFound(what) => Some(format!("{what} not found")),
            AppError::Geocoding(msg) => Some(format!("Error: {msg}")),
            AppError::Unauthenticated => Some("Please sign in first".to_string()),
            AppError::Cancelled => None,
            AppError::Ledger(e) => Some(format!("Error: {e}")),
            AppError::Config(msg) => Some(format!("Error: {msg}")),
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;
