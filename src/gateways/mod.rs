pub mod auth;
pub mod data;
pub mod map;

pub use auth::AuthGateway;
pub use data::{Created, DataGateway, IdempotencyKey};
pub use map::{MapAdapter, MapView, Marker};
