use std::sync::Mutex;

use chrono::{Datelike, NaiveDate};

use crate::errors::{AppError, AppResult};
use crate::gateways::{Created, DataGateway};
use crate::models::{now_millis, Collection, SchedulingEntry};

use super::{lock, FormSession, ScreenContext};

#[derive(Debug, Clone, Default)]
pub struct PickupForm {
    pub date: String,
    pub session: FormSession,
}

pub struct SchedulingScreen {
    ctx: ScreenContext,
    data: DataGateway,
    form: Mutex<PickupForm>,
}

// `M/D/YYYY`, no zero padding.
pub fn picker_date(date: NaiveDate) -> String {
    format!("{}/{}/{}", date.month(), date.day(), date.year())
}

impl SchedulingScreen {
    pub fn new(ctx: ScreenContext, data: DataGateway) -> Self {
        Self {
            ctx,
            data,
            form: Mutex::new(PickupForm::default()),
        }
    }

    pub fn context(&self) -> &ScreenContext {
        &self.ctx
    }

    pub fn form(&self) -> PickupForm {
        lock(&self.form).clone()
    }

    pub fn pick_date(&self, date: NaiveDate) {
        let mut form = lock(&self.form);
        form.date = picker_date(date);
        form.session.touch();
    }

    pub async fn submit(&self) -> AppResult<Created> {
        let (entry, key) = {
            let form = lock(&self.form);
            if form.date.trim().is_empty() {
                drop(form);
                let err = AppError::Validation("Please select a date".to_string());
                return self.ctx.surface("scheduling", Err(err));
            }
            (
                SchedulingEntry::scheduled(&form.date, now_millis()),
                form.session.key().clone(),
            )
        };

        let result = self
            .ctx
            .scope
            .run(self.data.create(Collection::Scheduling, &entry, &key))
            .await;
        let created = self.ctx.surface("scheduling", result)?;

        let mut form = lock(&self.form);
        if form.session.complete(&key) {
            self.ctx
                .notifier
                .info(format!("Pickup scheduled for {}", entry.date));
        }
        Ok(created)
    }
}
