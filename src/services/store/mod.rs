pub mod firebase;
pub mod memory;

use async_trait::async_trait;
use serde_json::Value;

use crate::models::Collection;

#[async_trait]
pub trait RemoteStore: Send + Sync {
    async fn push(
        &self,
        collection: Collection,
        record: &Value,
        auth: Option<&str>,
    ) -> anyhow::Result<String>;

    // The last `n` records by key, oldest first.
    async fn latest(
        &self,
        collection: Collection,
        n: usize,
        auth: Option<&str>,
    ) -> anyhow::Result<Vec<(String, Value)>>;

    async fn get(
        &self,
        collection: Collection,
        key: &str,
        auth: Option<&str>,
    ) -> anyhow::Result<Option<Value>>;

    async fn put(
        &self,
        collection: Collection,
        key: &str,
        record: &Value,
        auth: Option<&str>,
    ) -> anyhow::Result<()>;
}
