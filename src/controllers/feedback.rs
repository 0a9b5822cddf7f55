use std::sync::Mutex;

use crate::errors::AppResult;
use crate::gateways::{Created, DataGateway};
use crate::models::{Collection, Feedback};

use super::{lock, require_filled, FormSession, ScreenContext};

#[derive(Debug, Clone, Default)]
pub struct FeedbackForm {
    pub email: String,
    pub message: String,
    pub session: FormSession,
}

pub struct FeedbackScreen {
    ctx: ScreenContext,
    data: DataGateway,
    form: Mutex<FeedbackForm>,
}

impl FeedbackScreen {
    pub fn new(ctx: ScreenContext, data: DataGateway) -> Self {
        Self {
            ctx,
            data,
            form: Mutex::new(FeedbackForm::default()),
        }
    }

    pub fn context(&self) -> &ScreenContext {
        &self.ctx
    }

    pub fn form(&self) -> FeedbackForm {
        lock(&self.form).clone()
    }

    pub fn set_email(&self, email: &str) {
        let mut form = lock(&self.form);
        form.email = email.to_string();
        form.session.touch();
    }

    pub fn set_message(&self, message: &str) {
        let mut form = lock(&self.form);
        form.message = message.to_string();
        form.session.touch();
    }

    pub async fn submit(&self) -> AppResult<Created> {
        let (record, key) = {
            let form = lock(&self.form);
            let checked = require_filled(&[&form.email, &form.message]);
            if let Err(e) = checked {
                drop(form);
                return self.ctx.surface("feedback", Err(e));
            }
            let record = Feedback {
                email: form.email.clone(),
                message: form.message.clone(),
            };
            (record, form.session.key().clone())
        };

        let result = self
            .ctx
            .scope
            .run(self.data.create(Collection::Feedback, &record, &key))
            .await;
        let created = self.ctx.surface("feedback", result)?;

        let mut form = lock(&self.form);
        if form.session.complete(&key) {
            form.email.clear();
            form.message.clear();
            self.ctx.notifier.info("Feedback submitted successfully!");
        }
        Ok(created)
    }
}
