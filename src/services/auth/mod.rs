pub mod firebase;

use async_trait::async_trait;

#[derive(Debug, Clone, PartialEq)]
pub struct AuthGrant {
    pub uid: String,
    pub email: String,
    pub id_token: String,
    pub refresh_token: String,
    pub expires_in: Option<String>,
}

#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn sign_in_with_password(&self, email: &str, password: &str)
        -> anyhow::Result<AuthGrant>;

    async fn sign_up(&self, email: &str, password: &str) -> anyhow::Result<AuthGrant>;

    async fn sign_in_with_idp(&self, google_id_token: &str) -> anyhow::Result<AuthGrant>;
}
