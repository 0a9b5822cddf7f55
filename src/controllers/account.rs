use std::sync::Mutex;

use crate::errors::{AppError, AppResult};
use crate::gateways::{AuthGateway, DataGateway};
use crate::models::user::details_from_value;
use crate::models::{Collection, UserDetails};
use crate::shell::Route;

use super::{lock, require_filled, ScreenContext};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AccountMode {
    #[default]
    Viewing,
    Editing,
}

#[derive(Debug, Clone, Default)]
pub struct AccountForm {
    pub mode: AccountMode,
    pub details: UserDetails,
    pub edits: UserDetails,
}

pub struct AccountScreen {
    ctx: ScreenContext,
    auth: AuthGateway,
    data: DataGateway,
    form: Mutex<AccountForm>,
}

impl AccountScreen {
    pub fn new(ctx: ScreenContext, auth: AuthGateway, data: DataGateway) -> Self {
        Self {
            ctx,
            auth,
            data,
            form: Mutex::new(AccountForm::default()),
        }
    }

    pub fn context(&self) -> &ScreenContext {
        &self.ctx
    }

    pub fn form(&self) -> AccountForm {
        lock(&self.form).clone()
    }

    pub fn title(&self) -> &'static str {
        match lock(&self.form).mode {
            AccountMode::Viewing => "Account Details",
            AccountMode::Editing => "Edit Account Details",
        }
    }

    fn uid(&self) -> AppResult<String> {
        self.auth
            .current_user()
            .map(|u| u.uid)
            .ok_or(AppError::Unauthenticated)
    }

    pub async fn load(&self) -> AppResult<()> {
        let uid = self.ctx.surface("account", self.uid())?;
        let result = self
            .ctx
            .scope
            .run(self.data.read(Collection::Users, &uid))
            .await;
        let value = self.ctx.surface("account", result)?;

        let details = value.as_ref().map(details_from_value).unwrap_or_default();
        let mut form = lock(&self.form);
        form.edits = details.clone();
        form.details = details;
        Ok(())
    }

    pub fn edit(&self) {
        lock(&self.form).mode = AccountMode::Editing;
    }

    pub fn cancel_edit(&self) {
        let mut form = lock(&self.form);
        form.edits = form.details.clone();
        form.mode = AccountMode::Viewing;
    }

    pub fn set_field(&self, key: &str, value: &str) -> bool {
        let mut form = lock(&self.form);
        if form.mode != AccountMode::Editing {
            return false;
        }
        match form.edits.get_mut(key) {
            Some(v) => {
                *v = value.to_string();
                true
            }
            None => false,
        }
    }

    pub async fn save(&self) -> AppResult<()> {
        let uid = self.ctx.surface("account", self.uid())?;
        let edits = lock(&self.form).edits.clone();
        {
            let values: Vec<&str> = edits.values().map(|v| v.as_str()).collect();
            self.ctx.surface("account", require_filled(&values))?;
        }

        let result = self
            .ctx
            .scope
            .run(self.data.overwrite(Collection::Users, &uid, &edits))
            .await;
        self.ctx.surface("account", result)?;

        let mut form = lock(&self.form);
        form.details = edits;
        form.mode = AccountMode::Viewing;
        tracing::info!(uid = %uid, "account details updated");
        self.ctx.notifier.info("Account details updated");
        Ok(())
    }

    pub fn logout(&self) -> Route {
        self.auth.sign_out();
        Route::SignIn
    }
}
