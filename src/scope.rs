use std::future::Future;
use std::sync::Arc;

use tokio::sync::watch;

use crate::errors::{AppError, AppResult};

/// Lifetime of one hosted screen. Cancelled by the shell when the user
/// navigates away; requests still in flight then resolve to
/// [`AppError::Cancelled`] instead of touching the disposed form.
#[derive(Debug, Clone)]
pub struct ScreenScope {
    tx: Arc<watch::Sender<bool>>,
}

impl ScreenScope {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }

    pub async fn run<F, T>(&self, fut: F) -> AppResult<T>
    where
        F: Future<Output = AppResult<T>>,
    {
        if self.is_cancelled() {
            return Err(AppError::Cancelled);
        }
        let mut rx = self.tx.subscribe();
        let cancelled = async move {
            let _ = rx.wait_for(|c| *c).await;
        };
        tokio::select! {
            biased;
            _ = cancelled => Err(AppError::Cancelled),
            res = fut => res,
        }
    }
}

impl Default for ScreenScope {
    fn default() -> Self {
        Self::new()
    }
}
