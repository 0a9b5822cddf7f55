pub mod nominatim;

use async_trait::async_trait;

use crate::models::Coordinate;

#[derive(Debug, Clone, PartialEq)]
pub struct Place {
    pub address: String,
    pub at: Coordinate,
}

// Address <-> coordinate lookups. `Ok(None)` means the service had no match.
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn forward(&self, address: &str) -> anyhow::Result<Option<Place>>;

    async fn reverse(&self, at: Coordinate) -> anyhow::Result<Option<String>>;
}
