use std::sync::Mutex;

use crate::errors::{AppError, AppResult};
use crate::gateways::{Created, DataGateway};
use crate::models::{now_millis, Collection, GarbageBinSelection};

use super::{lock, require_filled, FormSession, ScreenContext};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinKind {
    Organic,
    Recyclable,
    NonRecyclable,
}

impl BinKind {
    pub fn label(&self) -> &'static str {
        match self {
            BinKind::Organic => "Organic Waste",
            BinKind::Recyclable => "Recyclable Waste",
            BinKind::NonRecyclable => "Non-Recyclable Waste",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "organic" => Some(BinKind::Organic),
            "recyclable" => Some(BinKind::Recyclable),
            "non-recyclable" | "nonRecyclable" => Some(BinKind::NonRecyclable),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct BinsForm {
    pub delivery_address: String,
    pub organic: bool,
    pub recyclable: bool,
    pub non_recyclable: bool,
    pub session: FormSession,
}

pub struct GarbageBinsScreen {
    ctx: ScreenContext,
    data: DataGateway,
    form: Mutex<BinsForm>,
}

impl GarbageBinsScreen {
    pub fn new(ctx: ScreenContext, data: DataGateway) -> Self {
        Self {
            ctx,
            data,
            form: Mutex::new(BinsForm::default()),
        }
    }

    pub fn context(&self) -> &ScreenContext {
        &self.ctx
    }

    pub fn form(&self) -> BinsForm {
        lock(&self.form).clone()
    }

    pub async fn load(&self) {
        let result = self
            .ctx
            .scope
            .run(self.data.read_latest(Collection::Households, 1))
            .await;

        let last = match result {
            Ok(entries) => entries
                .last()
                .and_then(|(_, v)| v["location"].as_str())
                .map(|s| s.to_string())
                .unwrap_or_default(),
            Err(AppError::Cancelled) => return,
            Err(e) => {
                tracing::warn!(error = %e, "failed to fetch last delivery address");
                return;
            }
        };

        let mut form = lock(&self.form);
        if form.delivery_address.is_empty() {
            form.delivery_address = last;
        }
    }

    pub fn set_delivery_address(&self, address: &str) {
        let mut form = lock(&self.form);
        form.delivery_address = address.to_string();
        form.session.touch();
    }

    pub fn set_bin(&self, kind: BinKind, selected: bool) {
        let mut form = lock(&self.form);
        match kind {
            BinKind::Organic => form.organic = selected,
            BinKind::Recyclable => form.recyclable = selected,
            BinKind::NonRecyclable => form.non_recyclable = selected,
        }
        form.session.touch();
    }

    pub fn toggle_bin(&self, kind: BinKind) {
        let current = {
            let form = lock(&self.form);
            match kind {
                BinKind::Organic => form.organic,
                BinKind::Recyclable => form.recyclable,
                BinKind::NonRecyclable => form.non_recyclable,
            }
        };
        self.set_bin(kind, !current);
    }

    pub async fn submit(&self) -> AppResult<Created> {
        let (selection, key) = {
            let form = lock(&self.form);
            let checked = require_filled(&[&form.delivery_address]);
            if let Err(e) = checked {
                drop(form);
                return self.ctx.surface("garbage_bins", Err(e));
            }
            let selection = GarbageBinSelection {
                delivery_address: form.delivery_address.clone(),
                organic: form.organic,
                recyclable: form.recyclable,
                non_recyclable: form.non_recyclable,
                timestamp: now_millis(),
            };
            (selection, form.session.key().clone())
        };

        let result = self
            .ctx
            .scope
            .run(self.data.create(Collection::GarbageBins, &selection, &key))
            .await;

        let created = match result {
            Ok(created) => created,
            Err(AppError::Store(msg)) => {
                tracing::warn!(error = %msg, "failed to save bin selection");
                self.ctx
                    .notifier
                    .error(format!("Failed to save selection: {msg}"));
                return Err(AppError::Store(msg));
            }
            Err(e) => return self.ctx.surface("garbage_bins", Err(e)),
        };

        let mut form = lock(&self.form);
        if form.session.complete(&key) {
            self.ctx.notifier.info("Garbage bins selection saved!");
        }
        Ok(created)
    }
}
