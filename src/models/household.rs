use serde::{Deserialize, Serialize};

use super::Coordinate;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Household {
    pub household_name: String,
    pub location: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl Household {
    pub fn new(household_name: &str, location: &str, at: Coordinate) -> Self {
        Self {
            household_name: household_name.to_string(),
            location: location.to_string(),
            latitude: at.latitude,
            longitude: at.longitude,
        }
    }
}
