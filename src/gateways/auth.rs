use std::sync::Arc;

use crate::controllers::require_filled;
use crate::errors::{AppError, AppResult};
use crate::models::{Collection, User};
use crate::services::auth::{AuthGrant, AuthProvider};
use crate::session::{resolve_expiry, CurrentUser, Session, SessionContext};

use super::DataGateway;

#[derive(Clone)]
pub struct AuthGateway {
    provider: Arc<dyn AuthProvider>,
    data: DataGateway,
    session: SessionContext,
}

impl AuthGateway {
    pub fn new(provider: Arc<dyn AuthProvider>, data: DataGateway) -> Self {
        let session = data.session().clone();
        Self {
            provider,
            data,
            session,
        }
    }

    pub fn current_user(&self) -> Option<CurrentUser> {
        self.session.current_user()
    }

    pub async fn sign_in_with_email(&self, email: &str, password: &str) -> AppResult<CurrentUser> {
        require_filled(&[email, password])?;

        let grant = self
            .provider
            .sign_in_with_password(email.trim(), password)
            .await
            .map_err(|e| AppError::Auth(format!("{e:#}")))?;

        Ok(self.establish(grant, "password"))
    }

    pub async fn register_with_email(
        &self,
        username: &str,
        email: &str,
        phone: &str,
        password: &str,
    ) -> AppResult<CurrentUser> {
        require_filled(&[username, email, phone, password])?;

        let grant = self
            .provider
            .sign_up(email.trim(), password)
            .await
            .map_err(|e| AppError::Auth(format!("{e:#}")))?;
        let user = self.establish(grant, "register");

        let profile = User {
            username: username.trim().to_string(),
            email: email.trim().to_string(),
            phone: phone.trim().to_string(),
        };
        // Without a profile the account is unusable; back out so the form can be resubmitted.
        if let Err(e) = self
            .data
            .overwrite(Collection::Users, &user.uid, &profile)
            .await
        {
            tracing::warn!(uid = %user.uid, error = %e, "profile write failed, signing out");
            self.session.clear();
            return Err(e);
        }

        Ok(user)
    }

    pub async fn sign_in_with_google(&self, id_token: &str) -> AppResult<CurrentUser> {
        require_filled(&[id_token])?;

        let grant = self
            .provider
            .sign_in_with_idp(id_token)
            .await
            .map_err(|e| AppError::Auth(format!("{e:#}")))?;

        Ok(self.establish(grant, "google"))
    }

    pub fn sign_out(&self) {
        if let Some(user) = self.session.current_user() {
            tracing::info!(uid = %user.uid, "signed out");
        }
        self.session.clear();
    }

    fn establish(&self, grant: AuthGrant, method: &str) -> CurrentUser {
        let expires_at = resolve_expiry(&grant.id_token, grant.expires_in.as_deref());
        tracing::info!(uid = %grant.uid, method, "signed in");
        self.session.set(Session {
            uid: grant.uid.clone(),
            email: grant.email.clone(),
            id_token: grant.id_token,
            refresh_token: grant.refresh_token,
            expires_at,
        });
        CurrentUser {
            uid: grant.uid,
            email: grant.email,
        }
    }
}
