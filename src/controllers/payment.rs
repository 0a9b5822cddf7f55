use std::sync::Mutex;

use crate::errors::AppResult;

use super::{lock, require_filled, ScreenContext};

#[derive(Debug, Clone, Default)]
pub struct CardForm {
    pub card_number: String,
    pub expiry_date: String,
    pub cvv: String,
}

// Card entry. Charging the card belongs to the payment processor, so a
// submit only checks the fields and acknowledges; nothing is persisted.
pub struct PaymentScreen {
    ctx: ScreenContext,
    form: Mutex<CardForm>,
}

impl PaymentScreen {
    pub fn new(ctx: ScreenContext) -> Self {
        Self {
            ctx,
            form: Mutex::new(CardForm::default()),
        }
    }

    pub fn context(&self) -> &ScreenContext {
        &self.ctx
    }

    pub fn form(&self) -> CardForm {
        lock(&self.form).clone()
    }

    pub fn set_card_number(&self, v: &str) {
        lock(&self.form).card_number = v.to_string();
    }

    pub fn set_expiry_date(&self, v: &str) {
        lock(&self.form).expiry_date = v.to_string();
    }

    pub fn set_cvv(&self, v: &str) {
        lock(&self.form).cvv = v.to_string();
    }

    pub fn submit(&self) -> AppResult<()> {
        let checked = {
            let form = lock(&self.form);
            require_filled(&[&form.card_number, &form.expiry_date, &form.cvv])
        };
        self.ctx.surface("payment", checked)?;
        tracing::info!("card payment handed off");
        self.ctx.notifier.info("Payment Processing...");
        Ok(())
    }
}
