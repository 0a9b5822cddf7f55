use std::sync::Mutex;

use crate::errors::AppResult;
use crate::gateways::AuthGateway;
use crate::session::CurrentUser;
use crate::shell::Route;

use super::{lock, FormStatus, ScreenContext};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthMode {
    #[default]
    SignIn,
    Register,
}

#[derive(Debug, Clone, Default)]
pub struct SignInForm {
    pub mode: AuthMode,
    pub username: String,
    pub email: String,
    pub phone: String,
    pub password: String,
    pub status: FormStatus,
}

pub struct SignInScreen {
    ctx: ScreenContext,
    auth: AuthGateway,
    form: Mutex<SignInForm>,
}

impl SignInScreen {
    pub fn new(ctx: ScreenContext, auth: AuthGateway) -> Self {
        Self {
            ctx,
            auth,
            form: Mutex::new(SignInForm::default()),
        }
    }

    pub fn context(&self) -> &ScreenContext {
        &self.ctx
    }

    pub fn form(&self) -> SignInForm {
        lock(&self.form).clone()
    }

    pub fn toggle_mode(&self) {
        let mut form = lock(&self.form);
        form.mode = match form.mode {
            AuthMode::SignIn => AuthMode::Register,
            AuthMode::Register => AuthMode::SignIn,
        };
        form.status = FormStatus::Editing;
    }

    pub fn set_username(&self, v: &str) {
        self.edit(|f| f.username = v.to_string());
    }

    pub fn set_email(&self, v: &str) {
        self.edit(|f| f.email = v.to_string());
    }

    pub fn set_phone(&self, v: &str) {
        self.edit(|f| f.phone = v.to_string());
    }

    pub fn set_password(&self, v: &str) {
        self.edit(|f| f.password = v.to_string());
    }

    fn edit(&self, apply: impl FnOnce(&mut SignInForm)) {
        let mut form = lock(&self.form);
        apply(&mut form);
        form.status = FormStatus::Editing;
    }

    pub async fn submit(&self) -> AppResult<Route> {
        let form = self.form();
        let result = match form.mode {
            AuthMode::SignIn => {
                self.ctx
                    .scope
                    .run(self.auth.sign_in_with_email(&form.email, &form.password))
                    .await
            }
            AuthMode::Register => {
                self.ctx
                    .scope
                    .run(self.auth.register_with_email(
                        &form.username,
                        &form.email,
                        &form.phone,
                        &form.password,
                    ))
                    .await
            }
        };
        let user = self.ctx.surface("sign_in", result)?;
        Ok(self.finish(&user, form.mode))
    }

    pub async fn sign_in_with_google(&self, id_token: &str) -> AppResult<Route> {
        let result = self
            .ctx
            .scope
            .run(self.auth.sign_in_with_google(id_token))
            .await;
        let user = self.ctx.surface("sign_in", result)?;
        Ok(self.finish(&user, AuthMode::SignIn))
    }

    fn finish(&self, user: &CurrentUser, mode: AuthMode) -> Route {
        let mut form = lock(&self.form);
        form.password.clear();
        form.status = FormStatus::SubmittedOrIdle;
        let msg = match mode {
            AuthMode::SignIn => format!("Welcome back, {}", user.email),
            AuthMode::Register => "Registration successful!".to_string(),
        };
        self.ctx.notifier.info(msg);
        Route::Dashboard
    }
}
