use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use super::RemoteStore;
use crate::models::Collection;

#[derive(Default)]
pub struct InMemoryStore {
    data: Mutex<HashMap<Collection, BTreeMap<String, Value>>>,
    counter: AtomicU64,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self, collection: Collection) -> Vec<(String, Value)> {
        let data = self.data.lock().unwrap_or_else(|e| e.into_inner());
        data.get(&collection)
            .map(|m| m.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
            .unwrap_or_default()
    }

    pub fn len(&self, collection: Collection) -> usize {
        let data = self.data.lock().unwrap_or_else(|e| e.into_inner());
        data.get(&collection).map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self, collection: Collection) -> bool {
        self.len(collection) == 0
    }

    fn next_key(&self) -> String {
        let n = self.counter.fetch_add(1, Ordering::SeqCst);
        format!("-M{n:018}")
    }
}

#[async_trait]
impl RemoteStore for InMemoryStore {
    async fn push(
        &self,
        collection: Collection,
        record: &Value,
        _auth: Option<&str>,
    ) -> anyhow::Result<String> {
        let key = self.next_key();
        let mut data = self.data.lock().unwrap_or_else(|e| e.into_inner());
        data.entry(collection)
            .or_default()
            .insert(key.clone(), record.clone());
        Ok(key)
    }

    async fn latest(
        &self,
        collection: Collection,
        n: usize,
        _auth: Option<&str>,
    ) -> anyhow::Result<Vec<(String, Value)>> {
        let all = self.records(collection);
        let skip = all.len().saturating_sub(n);
        Ok(all.into_iter().skip(skip).collect())
    }

    async fn get(
        &self,
        collection: Collection,
        key: &str,
        _auth: Option<&str>,
    ) -> anyhow::Result<Option<Value>> {
        let data = self.data.lock().unwrap_or_else(|e| e.into_inner());
        Ok(data.get(&collection).and_then(|m| m.get(key)).cloned())
    }

    async fn put(
        &self,
        collection: Collection,
        key: &str,
        record: &Value,
        _auth: Option<&str>,
    ) -> anyhow::Result<()> {
        let mut data = self.data.lock().unwrap_or_else(|e| e.into_inner());
        data.entry(collection)
            .or_default()
            .insert(key.to_string(), record.clone());
        Ok(())
    }
}
