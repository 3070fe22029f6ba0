use super::{Notification, Notifier, NotifyError};

/// Notifier used when no SMTP relay is configured: records the message in
/// the log stream instead of sending it.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

#[async_trait::async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, notification: &Notification) -> Result<(), NotifyError> {
        tracing::info!(
            to = %notification.to,
            subject = %notification.subject,
            "notification (smtp disabled)"
        );
        Ok(())
    }
}
