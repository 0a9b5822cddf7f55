use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};

use rusqlite::Connection;
use serde::Serialize;
use serde_json::Value;

use crate::db::queries;
use crate::errors::{AppError, AppResult};
use crate::models::Collection;
use crate::services::store::RemoteStore;
use crate::session::SessionContext;

/// Client-generated token for one form session. Creates that share a key are
/// collapsed into a single remote record.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IdempotencyKey(String);

impl IdempotencyKey {
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IdempotencyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Created {
    pub key: String,
    pub deduplicated: bool,
}

type KeyLocks = Arc<Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>>;

// Holds one reference to a per-key lock. The map entry goes away with the last
// holder, including holders whose future was dropped mid-create.
struct KeySlot {
    inflight: KeyLocks,
    key: String,
    lock: Arc<tokio::sync::Mutex<()>>,
}

impl Drop for KeySlot {
    fn drop(&mut self) {
        let mut inflight = self.inflight.lock().unwrap_or_else(|e| e.into_inner());
        let last = match inflight.get(&self.key) {
            // The map and this slot are the only owners.
            Some(current) => Arc::ptr_eq(current, &self.lock) && Arc::strong_count(&self.lock) == 2,
            None => false,
        };
        if last {
            inflight.remove(&self.key);
        }
    }
}

#[derive(Clone)]
pub struct DataGateway {
    store: Arc<dyn RemoteStore>,
    session: SessionContext,
    ledger: Arc<Mutex<Connection>>,
    inflight: KeyLocks,
    // Keys whose create succeeded remotely but could not be written to the ledger.
    unrecorded: Arc<Mutex<HashMap<String, String>>>,
}

impl DataGateway {
    pub fn new(
        store: Arc<dyn RemoteStore>,
        session: SessionContext,
        ledger: Arc<Mutex<Connection>>,
    ) -> Self {
        Self {
            store,
            session,
            ledger,
            inflight: Arc::new(Mutex::new(HashMap::new())),
            unrecorded: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    fn auth_token(&self) -> AppResult<Option<String>> {
        match self.session.current() {
            Some(s) if s.is_expired() => {
                tracing::warn!(uid = %s.uid, "session expired");
                Err(AppError::Unauthenticated)
            }
            Some(s) => Ok(Some(s.id_token)),
            None => Ok(None),
        }
    }

    fn key_slot(&self, key: &IdempotencyKey) -> KeySlot {
        let mut inflight = self.inflight.lock().unwrap_or_else(|e| e.into_inner());
        let lock = inflight
            .entry(key.as_str().to_string())
            .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
            .clone();
        KeySlot {
            inflight: self.inflight.clone(),
            key: key.as_str().to_string(),
            lock,
        }
    }

    pub async fn create<T: Serialize>(
        &self,
        collection: Collection,
        record: &T,
        idempotency_key: &IdempotencyKey,
    ) -> AppResult<Created> {
        let record = to_value(record)?;

        let slot = self.key_slot(idempotency_key);
        let _held = slot.lock.lock().await;

        let existing = {
            let db = self.ledger.lock().unwrap_or_else(|e| e.into_inner());
            queries::find_submission(&db, idempotency_key.as_str())?
        };
        let existing = existing.or_else(|| {
            let unrecorded = self.unrecorded.lock().unwrap_or_else(|e| e.into_inner());
            unrecorded.get(idempotency_key.as_str()).cloned()
        });
        if let Some(key) = existing {
            tracing::info!(
                collection = collection.as_str(),
                key = %key,
                idempotency_key = %idempotency_key,
                "duplicate submission collapsed"
            );
            return Ok(Created {
                key,
                deduplicated: true,
            });
        }

        let token = self.auth_token()?;
        let result = self
            .store
            .push(collection, &record, token.as_deref())
            .await
            .map_err(|e| AppError::Store(format!("{e:#}")));

        let key = match result {
            Ok(key) => key,
            Err(e) => {
                tracing::warn!(collection = collection.as_str(), error = %e, "create failed");
                return Err(e);
            }
        };

        // The record exists remotely now, so a ledger failure must not turn into an error.
        let recorded = {
            let db = self.ledger.lock().unwrap_or_else(|e| e.into_inner());
            queries::record_submission(&db, idempotency_key.as_str(), collection, &key)
        };
        if let Err(e) = recorded {
            tracing::warn!(
                collection = collection.as_str(),
                key = %key,
                idempotency_key = %idempotency_key,
                error = %e,
                "failed to record submission in ledger"
            );
            self.unrecorded
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .insert(idempotency_key.as_str().to_string(), key.clone());
        }

        tracing::info!(collection = collection.as_str(), key = %key, "record created");
        Ok(Created {
            key,
            deduplicated: false,
        })
    }

    pub async fn read_latest(
        &self,
        collection: Collection,
        n: usize,
    ) -> AppResult<Vec<(String, Value)>> {
        let token = self.auth_token()?;
        self.store
            .latest(collection, n, token.as_deref())
            .await
            .map_err(|e| AppError::Store(format!("{e:#}")))
    }

    pub async fn read(&self, collection: Collection, key: &str) -> AppResult<Option<Value>> {
        let token = self.auth_token()?;
        self.store
            .get(collection, key, token.as_deref())
            .await
            .map_err(|e| AppError::Store(format!("{e:#}")))
    }

    pub async fn overwrite<T: Serialize>(
        &self,
        collection: Collection,
        key: &str,
        record: &T,
    ) -> AppResult<()> {
        let record = to_value(record)?;
        let token = self.auth_token()?;
        self.store
            .put(collection, key, &record, token.as_deref())
            .await
            .map_err(|e| AppError::Store(format!("{e:#}")))?;

        tracing::info!(collection = collection.as_str(), key = %key, "record overwritten");
        Ok(())
    }
}

fn to_value<T: Serialize>(record: &T) -> AppResult<Value> {
    serde_json::to_value(record).map_err(|e| AppError::Store(format!("unserializable record: {e}")))
}
