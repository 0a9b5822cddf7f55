//! Fixtures shared by unit tests.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{Duration, Utc};
use rusqlite::Connection;
use serde_json::Value;
use tokio::sync::Notify;

use crate::db;
use crate::gateways::{AuthGateway, DataGateway, MapAdapter};
use crate::models::{Collection, Coordinate};
use crate::notify::{Notifier, Toast};
use crate::services::auth::{AuthGrant, AuthProvider};
use crate::services::geocoding::{Geocoder, Place};
use crate::services::store::memory::InMemoryStore;
use crate::services::store::RemoteStore;
use crate::session::{Session, SessionContext};

pub fn ledger() -> Arc<Mutex<Connection>> {
    Arc::new(Mutex::new(db::init_db(":memory:").unwrap()))
}

pub fn session_for(uid: &str, expires_in: Duration) -> Session {
    Session {
        uid: uid.to_string(),
        email: "a@b.com".to_string(),
        id_token: "test-token".to_string(),
        refresh_token: "test-refresh".to_string(),
        expires_at: Utc::now() + expires_in,
    }
}

pub fn signed_in() -> SessionContext {
    SessionContext::with_session(session_for("uid-1", Duration::hours(1)))
}

pub fn expired_session() -> SessionContext {
    SessionContext::with_session(session_for("uid-1", Duration::seconds(-5)))
}

pub fn drain(rx: &mut tokio::sync::broadcast::Receiver<Toast>) -> Vec<String> {
    let mut out = vec![];
    while let Ok(t) = rx.try_recv() {
        out.push(t.message);
    }
    out
}

pub struct Harness {
    pub store: Arc<InMemoryStore>,
    pub data: DataGateway,
    pub auth: AuthGateway,
    pub map: MapAdapter,
    pub notifier: Notifier,
    pub toasts: tokio::sync::broadcast::Receiver<Toast>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_store(Arc::new(InMemoryStore::new()))
    }

    pub fn with_store(store: Arc<InMemoryStore>) -> Self {
        Self::with_remote(store.clone(), store)
    }

    pub fn with_remote(store: Arc<InMemoryStore>, remote: Arc<dyn RemoteStore>) -> Self {
        let data = DataGateway::new(remote, signed_in(), ledger());
        let auth = AuthGateway::new(Arc::new(MockAuth::accepting("uid-1")), data.clone());
        let notifier = Notifier::new();
        let toasts = notifier.receiver();
        Self {
            store,
            data,
            auth,
            map: MapAdapter::new(Arc::new(FixedGeocoder::kencom())),
            notifier,
            toasts,
        }
    }

    pub fn toasts(&mut self) -> Vec<String> {
        drain(&mut self.toasts)
    }
}

// ── Stores ──

pub struct FailingStore {
    message: String,
}

impl FailingStore {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}

#[async_trait]
impl RemoteStore for FailingStore {
    async fn push(&self, _: Collection, _: &Value, _: Option<&str>) -> anyhow::Result<String> {
        anyhow::bail!(self.message.clone())
    }

    async fn latest(
        &self,
        _: Collection,
        _: usize,
        _: Option<&str>,
    ) -> anyhow::Result<Vec<(String, Value)>> {
        anyhow::bail!(self.message.clone())
    }

    async fn get(&self, _: Collection, _: &str, _: Option<&str>) -> anyhow::Result<Option<Value>> {
        anyhow::bail!(self.message.clone())
    }

    async fn put(&self, _: Collection, _: &str, _: &Value, _: Option<&str>) -> anyhow::Result<()> {
        anyhow::bail!(self.message.clone())
    }
}

pub struct GatedStore {
    pub inner: Arc<InMemoryStore>,
    pub open: Arc<Notify>,
}

impl GatedStore {
    pub fn new(inner: Arc<InMemoryStore>) -> Self {
        Self {
            inner,
            open: Arc::new(Notify::new()),
        }
    }
}

#[async_trait]
impl RemoteStore for GatedStore {
    async fn push(&self, c: Collection, r: &Value, a: Option<&str>) -> anyhow::Result<String> {
        self.open.notified().await;
        self.inner.push(c, r, a).await
    }

    async fn latest(
        &self,
        c: Collection,
        n: usize,
        a: Option<&str>,
    ) -> anyhow::Result<Vec<(String, Value)>> {
        self.inner.latest(c, n, a).await
    }

    async fn get(&self, c: Collection, k: &str, a: Option<&str>) -> anyhow::Result<Option<Value>> {
        self.inner.get(c, k, a).await
    }

    async fn put(&self, c: Collection, k: &str, r: &Value, a: Option<&str>) -> anyhow::Result<()> {
        self.open.notified().await;
        self.inner.put(c, k, r, a).await
    }
}

// ── Auth ──

pub struct MockAuth {
    uid: String,
    reject_with: Option<String>,
    pub calls: Arc<Mutex<Vec<String>>>,
}

impl MockAuth {
    pub fn accepting(uid: &str) -> Self {
        Self {
            uid: uid.to_string(),
            reject_with: None,
            calls: Arc::new(Mutex::new(vec![])),
        }
    }

    pub fn rejecting(message: &str) -> Self {
        Self {
            uid: String::new(),
            reject_with: Some(message.to_string()),
            calls: Arc::new(Mutex::new(vec![])),
        }
    }

    fn grant(&self, method: &str, email: &str) -> anyhow::Result<AuthGrant> {
        self.calls.lock().unwrap().push(method.to_string());
        if let Some(msg) = &self.reject_with {
            anyhow::bail!(msg.clone());
        }
        Ok(AuthGrant {
            uid: self.uid.clone(),
            email: email.to_string(),
            id_token: "test-token".to_string(),
            refresh_token: "test-refresh".to_string(),
            expires_in: Some("3600".to_string()),
        })
    }
}

#[async_trait]
impl AuthProvider for MockAuth {
    async fn sign_in_with_password(&self, email: &str, _: &str) -> anyhow::Result<AuthGrant> {
        self.grant("password", email)
    }

    async fn sign_up(&self, email: &str, _: &str) -> anyhow::Result<AuthGrant> {
        self.grant("signup", email)
    }

    async fn sign_in_with_idp(&self, _: &str) -> anyhow::Result<AuthGrant> {
        self.grant("idp", "g@example.com")
    }
}

// ── Geocoding ──

pub struct FixedGeocoder {
    place: Place,
}

impl FixedGeocoder {
    pub fn kencom() -> Self {
        Self {
            place: Place {
                address: "Kencom House, Moi Avenue, Nairobi".to_string(),
                at: Coordinate::new(-1.2841, 36.8255),
            },
        }
    }

    pub fn place(&self) -> &Place {
        &self.place
    }
}

#[async_trait]
impl Geocoder for FixedGeocoder {
    async fn forward(&self, address: &str) -> anyhow::Result<Option<Place>> {
        if address.to_lowercase().contains("kencom") {
            Ok(Some(self.place.clone()))
        } else {
            Ok(None)
        }
    }

    async fn reverse(&self, at: Coordinate) -> anyhow::Result<Option<String>> {
        let close = (at.latitude - self.place.at.latitude).abs() < 1e-3
            && (at.longitude - self.place.at.longitude).abs() < 1e-3;
        Ok(close.then(|| self.place.address.clone()))
    }
}
