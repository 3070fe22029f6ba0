use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use secrecy::{ExposeSecret, SecretString};

use super::{Notification, Notifier, NotifyError};

#[derive(Debug, Clone)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: SecretString,
    pub from_address: String,
}

/// SMTP delivery over STARTTLS.
#[derive(Clone)]
pub struct SmtpNotifier {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from_address: String,
}

impl SmtpNotifier {
    pub fn new(settings: &SmtpSettings) -> Result<Self, NotifyError> {
        let credentials = Credentials::new(
            settings.username.clone(),
            settings.password.expose_secret().to_string(),
        );

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.host)?
            .port(settings.port)
            .credentials(credentials)
            .build();

        Ok(Self {
            mailer,
            from_address: settings.from_address.clone(),
        })
    }
}

#[async_trait::async_trait]
impl Notifier for SmtpNotifier {
    async fn send(&self, notification: &Notification) -> Result<(), NotifyError> {
        let email = Message::builder()
            .from(
                self.from_address
                    .parse()
                    .map_err(|_| NotifyError::InvalidAddress(self.from_address.clone()))?,
            )
            .to(notification
                .to
                .parse()
                .map_err(|_| NotifyError::InvalidAddress(notification.to.clone()))?)
            .subject(notification.subject.as_str())
            .header(ContentType::TEXT_PLAIN)
            .body(notification.body.clone())?;

        self.mailer.send(email).await?;

        tracing::info!(to = %notification.to, subject = %notification.subject, "email sent");
        Ok(())
    }
}
