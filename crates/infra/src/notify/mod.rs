//! Outbound notifications (order approvals/rejections, account approvals,
//! newsletter campaigns).
//!
//! Transactional notifications are fire-and-forget: [`NotificationDispatcher::dispatch`]
//! spawns the send and only logs failures, so a mail outage never blocks or
//! reverses the state change that triggered it.

pub mod logging;
pub mod recording;
pub mod smtp;
pub mod templates;

use std::sync::Arc;

use thiserror::Error;

pub use logging::LogNotifier;
pub use recording::RecordingNotifier;
pub use smtp::{SmtpNotifier, SmtpSettings};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub to: String,
    pub subject: String,
    pub body: String,
}

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("invalid email address: {0}")]
    InvalidAddress(String),

    #[error("failed to build message: {0}")]
    MessageBuild(#[from] lettre::error::Error),

    #[error("SMTP error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),

    #[error("delivery failed: {0}")]
    Delivery(String),
}

#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, notification: &Notification) -> Result<(), NotifyError>;
}

#[derive(Clone)]
pub struct NotificationDispatcher {
    notifier: Arc<dyn Notifier>,
}

impl NotificationDispatcher {
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        Self { notifier }
    }

    /// Send in the background; failures are logged and dropped.
    pub fn dispatch(&self, notification: Notification) {
        let notifier = self.notifier.clone();
        tokio::spawn(async move {
            if let Err(err) = notifier.send(&notification).await {
                tracing::warn!(
                    to = %notification.to,
                    subject = %notification.subject,
                    error = %err,
                    "notification delivery failed"
                );
            }
        });
    }

    /// Send and wait for the outcome.
    pub async fn deliver(&self, notification: &Notification) -> Result<(), NotifyError> {
        self.notifier.send(notification).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn note() -> Notification {
        Notification {
            to: "buyer@example.com".into(),
            subject: "Order confirmed".into(),
            body: "Thanks".into(),
        }
    }

    #[tokio::test]
    async fn dispatch_delivers_in_background() {
        let recorder = Arc::new(RecordingNotifier::new());
        let dispatcher = NotificationDispatcher::new(recorder.clone());
        dispatcher.dispatch(note());

        for _ in 0..50 {
            if !recorder.sent().is_empty() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(recorder.sent(), vec![note()]);
    }

    #[tokio::test]
    async fn failures_surface_only_through_deliver() {
        let recorder = Arc::new(RecordingNotifier::failing());
        let dispatcher = NotificationDispatcher::new(recorder.clone());
        dispatcher.dispatch(note());
        assert!(dispatcher.deliver(&note()).await.is_err());
    }
}
