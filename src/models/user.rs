use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub username: String,
    pub email: String,
    pub phone: String,
}

pub type UserDetails = BTreeMap<String, String>;

pub fn details_from_value(value: &serde_json::Value) -> UserDetails {
    match value.as_object() {
        Some(map) => map
            .iter()
            .map(|(k, v)| {
                let s = v.as_str().map(|s| s.to_string()).unwrap_or_else(|| "N/A".to_string());
                (k.clone(), s)
            })
            .collect(),
        None => UserDetails::new(),
    }
}
