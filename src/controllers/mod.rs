pub mod account;
pub mod dashboard;
pub mod feedback;
pub mod garbage_bins;
pub mod household;
pub mod payment;
pub mod scheduling;
pub mod sign_in;
pub mod subscription;

use std::sync::{Mutex, MutexGuard};

use crate::errors::{AppError, AppResult};
use crate::gateways::IdempotencyKey;
use crate::notify::Notifier;
use crate::scope::ScreenScope;

pub use account::{AccountMode, AccountScreen};
pub use dashboard::{DashboardScreen, Tile};
pub use feedback::FeedbackScreen;
pub use garbage_bins::{BinKind, GarbageBinsScreen};
pub use household::HouseholdScreen;
pub use payment::PaymentScreen;
pub use scheduling::SchedulingScreen;
pub use sign_in::{AuthMode, SignInScreen};
pub use subscription::{SubscriptionOutcome, SubscriptionScreen};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormStatus {
    #[default]
    Editing,
    SubmittedOrIdle,
}

pub fn require_filled(fields: &[&str]) -> AppResult<()> {
    if fields.iter().any(|f| f.trim().is_empty()) {
        return Err(AppError::blank_fields());
    }
    Ok(())
}

#[derive(Debug, Clone)]
pub struct FormSession {
    status: FormStatus,
    key: IdempotencyKey,
    completions: u32,
}

impl FormSession {
    pub fn new() -> Self {
        Self {
            status: FormStatus::Editing,
            key: IdempotencyKey::generate(),
            completions: 0,
        }
    }

    pub fn status(&self) -> FormStatus {
        self.status
    }

    pub fn key(&self) -> &IdempotencyKey {
        &self.key
    }

    pub fn completions(&self) -> u32 {
        self.completions
    }

    pub fn touch(&mut self) {
        self.status = FormStatus::Editing;
    }

    /// Applies a successful write made with `key`. A late completion for a
    /// key that was already settled is ignored.
    pub fn complete(&mut self, key: &IdempotencyKey) -> bool {
        if &self.key != key {
            return false;
        }
        self.status = FormStatus::SubmittedOrIdle;
        self.key = IdempotencyKey::generate();
        self.completions += 1;
        true
    }
}

impl Default for FormSession {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone)]
pub struct ScreenContext {
    pub notifier: Notifier,
    pub scope: ScreenScope,
}

impl ScreenContext {
    pub fn new(notifier: Notifier) -> Self {
        Self {
            notifier,
            scope: ScreenScope::new(),
        }
    }

    pub fn surface<T>(&self, screen: &str, result: AppResult<T>) -> AppResult<T> {
        if let Err(e) = &result {
            match e {
                AppError::Cancelled => tracing::debug!(screen, "request cancelled"),
                AppError::Validation(_) => tracing::debug!(screen, error = %e, "rejected"),
                _ => tracing::warn!(screen, error = %e, "request failed"),
            }
            self.notifier.report(e);
        }
        result
    }
}

pub(crate) fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|e| e.into_inner())
}
