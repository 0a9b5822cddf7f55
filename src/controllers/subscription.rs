use std::sync::Mutex;

use chrono::NaiveDate;

use crate::errors::{AppError, AppResult};
use crate::gateways::{Created, DataGateway};
use crate::models::{now_millis, Collection, PaymentMethod, Plan, Subscription};
use crate::shell::Route;

use super::{lock, FormSession, ScreenContext};

#[derive(Debug, Clone, Default)]
pub struct SubscriptionForm {
    pub plan: Plan,
    pub payment_date: Option<String>,
    pub payment_method: Option<PaymentMethod>,
    pub method_menu_open: bool,
    pub session: FormSession,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SubscriptionOutcome {
    pub created: Created,
    pub next: Option<Route>,
}

pub struct SubscriptionScreen {
    ctx: ScreenContext,
    data: DataGateway,
    form: Mutex<SubscriptionForm>,
}

impl SubscriptionScreen {
    pub fn new(ctx: ScreenContext, data: DataGateway) -> Self {
        Self {
            ctx,
            data,
            form: Mutex::new(SubscriptionForm::default()),
        }
    }

    pub fn context(&self) -> &ScreenContext {
        &self.ctx
    }

    pub fn form(&self) -> SubscriptionForm {
        lock(&self.form).clone()
    }

    pub fn select_plan(&self, plan: Plan) {
        let mut form = lock(&self.form);
        form.plan = plan;
        form.session.touch();
    }

    pub fn pick_payment_date(&self, date: NaiveDate) {
        let mut form = lock(&self.form);
        form.payment_date = Some(date.format("%m/%d/%Y").to_string());
        form.session.touch();
    }

    pub fn open_method_menu(&self) {
        lock(&self.form).method_menu_open = true;
    }

    pub fn dismiss_method_menu(&self) {
        lock(&self.form).method_menu_open = false;
    }

    pub fn select_payment_method(&self, method: PaymentMethod) {
        let mut form = lock(&self.form);
        form.payment_method = Some(method);
        form.method_menu_open = false;
        form.session.touch();
    }

    pub async fn submit(&self) -> AppResult<SubscriptionOutcome> {
        let ready = {
            let form = lock(&self.form);
            match (&form.payment_date, form.payment_method) {
                (Some(date), Some(method)) if !date.trim().is_empty() => Some((
                    Subscription {
                        plan: form.plan,
                        payment_date: date.clone(),
                        payment_method: method,
                        timestamp: now_millis(),
                    },
                    form.session.key().clone(),
                )),
                _ => None,
            }
        };
        let Some((subscription, key)) = ready else {
            return self.ctx.surface("subscription", Err(AppError::blank_fields()));
        };

        let result = self
            .ctx
            .scope
            .run(self.data.create(Collection::Subscriptions, &subscription, &key))
            .await;
        let created = self.ctx.surface("subscription", result)?;

        let mut form = lock(&self.form);
        if form.session.complete(&key) {
            self.ctx.notifier.info(format!(
                "Payment initiated with {} plan and {}",
                subscription.plan.as_str(),
                subscription.payment_method.as_str()
            ));
        }

        let next = match subscription.payment_method {
            PaymentMethod::Card => Some(Route::Payment),
            PaymentMethod::MPesa => None,
        };
        Ok(SubscriptionOutcome { created, next })
    }
}
