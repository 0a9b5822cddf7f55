use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;

use crate::errors::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub kind: ToastKind,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct Notifier {
    tx: broadcast::Sender<Toast>,
}

impl Notifier {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(64);
        Self { tx }
    }

    pub fn info(&self, message: impl Into<String>) {
        self.publish(ToastKind::Info, message.into());
    }

    pub fn error(&self, message: impl Into<String>) {
        self.publish(ToastKind::Error, message.into());
    }

    pub fn report(&self, err: &AppError) {
        match err.toast_message() {
            Some(msg) => self.error(msg),
            None => tracing::debug!(error = %err, "suppressed toast"),
        }
    }

    pub fn receiver(&self) -> broadcast::Receiver<Toast> {
        self.tx.subscribe()
    }

    pub fn subscribe(&self) -> BroadcastStream<Toast> {
        BroadcastStream::new(self.tx.subscribe())
    }

    fn publish(&self, kind: ToastKind, message: String) {
        tracing::debug!(?kind, %message, "toast");
        // No subscribers is fine; the toast simply goes unseen.
        let _ = self.tx.send(Toast { kind, message });
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new()
    }
}
