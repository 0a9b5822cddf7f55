use anyhow::Context;
use async_trait::async_trait;
use serde_json::Value;

use super::RemoteStore;
use crate::models::Collection;

pub struct FirebaseRealtimeStore {
    base_url: String,
    client: reqwest::Client,
}

impl FirebaseRealtimeStore {
    pub fn new(base_url: String) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}.json", self.base_url, path)
    }

    fn with_auth(req: reqwest::RequestBuilder, auth: Option<&str>) -> reqwest::RequestBuilder {
        match auth {
            Some(token) => req.query(&[("auth", token)]),
            None => req,
        }
    }
}

// Non-success responses carry the server's `error` text when the body is JSON.
async fn read_body(resp: reqwest::Response) -> anyhow::Result<Value> {
    let status = resp.status();
    if !status.is_success() {
        let text = resp.text().await.unwrap_or_default();
        let message = serde_json::from_str::<Value>(&text)
            .ok()
            .and_then(|v| v["error"].as_str().map(|s| s.to_string()))
            .unwrap_or_else(|| format!("realtime database error ({status})"));
        anyhow::bail!(message);
    }

    resp.json()
        .await
        .context("failed to parse realtime database response")
}

#[async_trait]
impl RemoteStore for FirebaseRealtimeStore {
    async fn push(
        &self,
        collection: Collection,
        record: &Value,
        auth: Option<&str>,
    ) -> anyhow::Result<String> {
        let req = self.client.post(self.url(collection.as_str())).json(record);
        let resp = Self::with_auth(req, auth)
            .send()
            .await
            .context("failed to reach realtime database")?;

        let data = read_body(resp).await?;
        data["name"]
            .as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| anyhow::anyhow!("missing generated key in push response"))
    }

    async fn latest(
        &self,
        collection: Collection,
        n: usize,
        auth: Option<&str>,
    ) -> anyhow::Result<Vec<(String, Value)>> {
        let limit = n.to_string();
        let req = self
            .client
            .get(self.url(collection.as_str()))
            .query(&[("orderBy", "\"$key\""), ("limitToLast", limit.as_str())]);
        let resp = Self::with_auth(req, auth)
            .send()
            .await
            .context("failed to reach realtime database")?;

        let data = read_body(resp).await?;
        let mut entries: Vec<(String, Value)> = match data {
            Value::Object(map) => map.into_iter().collect(),
            _ => vec![],
        };
        // Push keys sort chronologically.
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(entries)
    }

    async fn get(
        &self,
        collection: Collection,
        key: &str,
        auth: Option<&str>,
    ) -> anyhow::Result<Option<Value>> {
        let path = format!("{}/{}", collection.as_str(), key);
        let req = self.client.get(self.url(&path));
        let resp = Self::with_auth(req, auth)
            .send()
            .await
            .context("failed to reach realtime database")?;

        match read_body(resp).await? {
            Value::Null => Ok(None),
            v => Ok(Some(v)),
        }
    }

    async fn put(
        &self,
        collection: Collection,
        key: &str,
        record: &Value,
        auth: Option<&str>,
    ) -> anyhow::Result<()> {
        let path = format!("{}/{}", collection.as_str(), key);
        let req = self.client.put(self.url(&path)).json(record);
        let resp = Self::with_auth(req, auth)
            .send()
            .await
            .context("failed to reach realtime database")?;

        read_body(resp).await?;
        Ok(())
    }
}
