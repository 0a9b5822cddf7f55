use std::sync::{Arc, Mutex};

use crate::config::{AppConfig, MEMORY_STORE};
use crate::db;
use crate::gateways::{AuthGateway, DataGateway, MapAdapter};
use crate::notify::Notifier;
use crate::services::auth::firebase::FirebaseAuthProvider;
use crate::services::auth::AuthProvider;
use crate::services::geocoding::nominatim::NominatimGeocoder;
use crate::services::geocoding::Geocoder;
use crate::services::store::firebase::FirebaseRealtimeStore;
use crate::services::store::memory::InMemoryStore;
use crate::services::store::RemoteStore;
use crate::session::SessionContext;

pub struct AppState {
    pub session: SessionContext,
    pub notifier: Notifier,
    pub data: DataGateway,
    pub auth: AuthGateway,
    pub map: MapAdapter,
}

impl AppState {
    pub fn new(
        store: Arc<dyn RemoteStore>,
        auth: Arc<dyn AuthProvider>,
        geocoder: Arc<dyn Geocoder>,
        ledger: rusqlite::Connection,
        session: SessionContext,
    ) -> Self {
        let data = DataGateway::new(store, session.clone(), Arc::new(Mutex::new(ledger)));
        Self {
            session,
            notifier: Notifier::new(),
            auth: AuthGateway::new(auth, data.clone()),
            data,
            map: MapAdapter::new(geocoder),
        }
    }

    pub fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        config.validate()?;

        let store: Arc<dyn RemoteStore> = if config.database_url == MEMORY_STORE {
            tracing::warn!("using in-memory store; records are lost on exit");
            Arc::new(InMemoryStore::new())
        } else {
            tracing::info!("using realtime database at {}", config.database_url);
            Arc::new(FirebaseRealtimeStore::new(config.database_url.clone()))
        };

        if config.firebase_api_key.is_empty() {
            tracing::warn!("FIREBASE_API_KEY is not set; sign-in requests will be rejected");
        }
        let auth = Arc::new(FirebaseAuthProvider::new(
            config.firebase_api_key.clone(),
            config.auth_url.clone(),
        ));

        let geocoder = Arc::new(NominatimGeocoder::new(
            config.geocoder_url.clone(),
            &config.geocoder_user_agent,
        )?);

        let ledger = db::init_db(&config.ledger_path)?;

        Ok(Self::new(store, auth, geocoder, ledger, SessionContext::new()))
    }
}
