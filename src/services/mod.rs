pub mod auth;
pub mod geocoding;
pub mod store;
