//! Delivery through an authenticated SMTP relay.

use async_trait::async_trait;
use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::{MailError, MailTransport, MailerConfig, OutgoingMail};

/// How the connection to the relay is secured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TlsMode {
    /// TLS from the first byte, port 465 unless overridden.
    Implicit,
    /// STARTTLS upgrade, port 587 unless overridden.
    StartTls,
    /// No encryption, port 25 unless overridden.
    None,
}

/// Sends each message as `multipart/alternative` (text and HTML) over SMTP,
/// authenticating with the user and password from [`MailerConfig`].
pub struct SmtpMailTransport<T = AsyncSmtpTransport<Tokio1Executor>> {
    inner: T,
}

impl SmtpMailTransport {
    /// Configure a pooled relay connection. No connection is opened until the
    /// first message is sent.
    pub fn connect(
        host: &str,
        port: Option<u16>,
        tls: TlsMode,
        config: &MailerConfig,
    ) -> Result<Self, MailError> {
        if host.trim().is_empty() {
            return Err(MailError::Config("smtp host is empty".to_string()));
        }

        let builder = match tls {
            TlsMode::Implicit => AsyncSmtpTransport::<Tokio1Executor>::relay(host)?,
            TlsMode::StartTls => AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)?,
            TlsMode::None => AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(host),
        };
        let builder =
            builder.credentials(Credentials::new(config.user.clone(), config.pass.clone()));
        let builder = match port {
            Some(port) => builder.port(port),
            None => builder,
        };

        Ok(Self::with_transport(builder.build()))
    }
}

impl<T> SmtpMailTransport<T> {
    /// Wrap any `lettre` transport, e.g. a stub in tests.
    pub fn with_transport(inner: T) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<T> MailTransport for SmtpMailTransport<T>
where
    T: AsyncTransport + Send + Sync,
    T::Ok: Send,
    T::Error: std::fmt::Display + Send,
{
    async fn send(&self, mail: &OutgoingMail) -> Result<(), MailError> {
        let message = build_message(mail)?;

        self.inner
            .send(message)
            .await
            .map_err(|e| MailError::Delivery(e.to_string()))?;

        tracing::info!(to = %mail.to, subject = %mail.subject, "mail accepted by smtp relay");
        Ok(())
    }
}

fn build_message(mail: &OutgoingMail) -> Result<Message, MailError> {
    let from: Mailbox = mail.from.parse()?;
    let to: Mailbox = mail.to.parse()?;

    let message = Message::builder()
        .from(from)
        .to(to)
        .subject(mail.subject.clone())
        .multipart(MultiPart::alternative_plain_html(
            mail.text.clone(),
            mail.html.clone(),
        ))?;
    Ok(message)
}
