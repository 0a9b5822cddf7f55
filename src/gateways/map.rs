use std::sync::Arc;

use crate::errors::{AppError, AppResult};
use crate::models::Coordinate;
use crate::services::geocoding::{Geocoder, Place};

pub const DEFAULT_CENTER: Coordinate = Coordinate {
    latitude: -1.286389,
    longitude: 36.817223,
};
pub const DEFAULT_ZOOM: u8 = 12;
pub const MARKER_ZOOM: u8 = 16;

#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub at: Coordinate,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MapView {
    pub center: Coordinate,
    pub zoom: u8,
    pub marker: Option<Marker>,
}

impl Default for MapView {
    fn default() -> Self {
        Self {
            center: DEFAULT_CENTER,
            zoom: DEFAULT_ZOOM,
            marker: None,
        }
    }
}

#[derive(Clone)]
pub struct MapAdapter {
    geocoder: Arc<dyn Geocoder>,
}

impl MapAdapter {
    pub fn new(geocoder: Arc<dyn Geocoder>) -> Self {
        Self { geocoder }
    }

    pub async fn forward_geocode(&self, address: &str) -> AppResult<Place> {
        let address = address.trim();
        if address.is_empty() {
            return Err(AppError::Validation("Please enter a location".to_string()));
        }

        match self.geocoder.forward(address).await {
            Ok(Some(place)) => {
                tracing::debug!(address, ?place.at, "resolved address location");
                Ok(place)
            }
            Ok(None) => Err(AppError::NotFound("Address".to_string())),
            Err(e) => {
                tracing::warn!(address, error = %e, "failed to resolve address location");
                Err(AppError::Geocoding(format!("{e:#}")))
            }
        }
    }

    pub async fn reverse_geocode(&self, at: Coordinate) -> AppResult<String> {
        if !at.is_valid() {
            return Err(AppError::Validation("Invalid map position".to_string()));
        }

        match self.geocoder.reverse(at).await {
            Ok(Some(address)) => Ok(address),
            Ok(None) => Err(AppError::NotFound("Address".to_string())),
            Err(e) => {
                tracing::warn!(?at, error = %e, "failed to resolve map position");
                Err(AppError::Geocoding(format!("{e:#}")))
            }
        }
    }

    pub fn render_marker(&self, map: &mut MapView, at: Coordinate, title: &str) {
        map.marker = Some(Marker {
            at,
            title: title.to_string(),
        });
        map.center = at;
        map.zoom = map.zoom.max(MARKER_ZOOM);
    }
}
