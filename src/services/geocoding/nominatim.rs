use anyhow::Context;
use async_trait::async_trait;
use serde::Deserialize;

use super::{Geocoder, Place};
use crate::models::Coordinate;

pub struct NominatimGeocoder {
    base_url: String,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    lat: String,
    lon: String,
    display_name: String,
}

#[derive(Debug, Deserialize)]
struct ReverseHit {
    display_name: Option<String>,
    error: Option<String>,
}

impl NominatimGeocoder {
    pub fn new(base_url: String, user_agent: &str) -> anyhow::Result<Self> {
        // Nominatim's usage policy rejects requests without an identifying agent.
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .build()
            .context("failed to build geocoder HTTP client")?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    async fn forward(&self, address: &str) -> anyhow::Result<Option<Place>> {
        let hits: Vec<SearchHit> = self
            .client
            .get(format!("{}/search", self.base_url))
            .query(&[("q", address), ("format", "json"), ("limit", "1")])
            .send()
            .await
            .context("failed to call geocoder search")?
            .error_for_status()
            .context("geocoder search returned error")?
            .json()
            .await
            .context("failed to parse geocoder search response")?;

        let Some(hit) = hits.into_iter().next() else {
            return Ok(None);
        };
        let latitude: f64 = hit.lat.parse().context("invalid latitude from geocoder")?;
        let longitude: f64 = hit.lon.parse().context("invalid longitude from geocoder")?;

        Ok(Some(Place {
            address: hit.display_name,
            at: Coordinate::new(latitude, longitude),
        }))
    }

    async fn reverse(&self, at: Coordinate) -> anyhow::Result<Option<String>> {
        let lat = at.latitude.to_string();
        let lon = at.longitude.to_string();
        let hit: ReverseHit = self
            .client
            .get(format!("{}/reverse", self.base_url))
            .query(&[("lat", lat.as_str()), ("lon", lon.as_str()), ("format", "json")])
            .send()
            .await
            .context("failed to call geocoder reverse")?
            .error_for_status()
            .context("geocoder reverse returned error")?
            .json()
            .await
            .context("failed to parse geocoder reverse response")?;

        if let Some(err) = hit.error {
            tracing::debug!(error = %err, "reverse geocode miss");
            return Ok(None);
        }
        Ok(hit.display_name)
    }
}
