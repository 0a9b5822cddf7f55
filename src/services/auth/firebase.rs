use anyhow::Context;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use super::{AuthGrant, AuthProvider};

pub struct FirebaseAuthProvider {
    api_key: String,
    base_url: String,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GrantResponse {
    local_id: String,
    #[serde(default)]
    email: String,
    id_token: String,
    #[serde(default)]
    refresh_token: String,
    expires_in: Option<String>,
}

impl FirebaseAuthProvider {
    pub fn new(api_key: String, base_url: String) -> Self {
        Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    async fn call(&self, method: &str, body: serde_json::Value) -> anyhow::Result<AuthGrant> {
        let url = format!("{}/v1/accounts:{}", self.base_url, method);

        let resp = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await
            .with_context(|| format!("failed to call identity toolkit {method}"))?;

        let status = resp.status();
        let data: serde_json::Value = resp
            .json()
            .await
            .context("failed to parse identity toolkit response")?;

        if !status.is_success() {
            // e.g. {"error":{"code":400,"message":"EMAIL_NOT_FOUND"}}
            let message = data["error"]["message"]
                .as_str()
                .map(|s| s.to_string())
                .unwrap_or_else(|| format!("identity toolkit error ({status})"));
            anyhow::bail!(message);
        }

        let grant: GrantResponse =
            serde_json::from_value(data).context("unexpected identity toolkit response")?;
        Ok(AuthGrant {
            uid: grant.local_id,
            email: grant.email,
            id_token: grant.id_token,
            refresh_token: grant.refresh_token,
            expires_in: grant.expires_in,
        })
    }
}

#[async_trait]
impl AuthProvider for FirebaseAuthProvider {
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> anyhow::Result<AuthGrant> {
        self.call(
            "signInWithPassword",
            json!({ "email": email, "password": password, "returnSecureToken": true }),
        )
        .await
    }

    async fn sign_up(&self, email: &str, password: &str) -> anyhow::Result<AuthGrant> {
        self.call(
            "signUp",
            json!({ "email": email, "password": password, "returnSecureToken": true }),
        )
        .await
    }

    async fn sign_in_with_idp(&self, google_id_token: &str) -> anyhow::Result<AuthGrant> {
        self.call(
            "signInWithIdp",
            json!({
                "postBody": format!("id_token={google_id_token}&providerId=google.com"),
                "requestUri": "http://localhost",
                "returnSecureToken": true,
                "returnIdpCredential": true,
            }),
        )
        .await
    }
}
