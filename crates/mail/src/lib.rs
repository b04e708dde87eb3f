//! Outbound mail for KitabCorner.
//!
//! Handlers hand a fully rendered [`OutgoingMail`] to a [`MailTransport`] and
//! await the outcome. Credentials live in [`MailerConfig`], built from
//! configuration at startup.

pub mod memory;
pub mod smtp;

use std::fmt;

use async_trait::async_trait;
use thiserror::Error;

pub use memory::MemoryOutbox;
pub use smtp::{SmtpMailTransport, TlsMode};

/// Errors raised while delivering a message.
#[derive(Error, Debug)]
pub enum MailError {
    /// A sender or recipient is not a valid mailbox.
    #[error("invalid address: {0}")]
    Address(#[from] lettre::address::AddressError),
    /// The message could not be assembled.
    #[error("failed to build message: {0}")]
    Build(#[from] lettre::error::Error),
    /// The relay could not be configured.
    #[error("smtp error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),
    /// The relay refused or failed to take the message.
    #[error("delivery failed: {0}")]
    Delivery(String),
    /// The transport is not usable with the given configuration.
    #[error("mail configuration error: {0}")]
    Config(String),
}

/// A rendered message ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMail {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub text: String,
    pub html: String,
}

/// Capability to deliver one message.
#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn send(&self, mail: &OutgoingMail) -> Result<(), MailError>;
}

/// Sender identity and SMTP AUTH credentials.
#[derive(Clone)]
pub struct MailerConfig {
    pub user: String,
    pub pass: String,
    pub from_address: String,
}

impl MailerConfig {
    /// Build a config, rejecting blank credentials or sender.
    pub fn new(
        user: impl Into<String>,
        pass: impl Into<String>,
        from_address: impl Into<String>,
    ) -> Result<Self, MailError> {
        let config = Self {
            user: user.into(),
            pass: pass.into(),
            from_address: from_address.into(),
        };

        if config.user.trim().is_empty() {
            return Err(MailError::Config("mail user is empty".to_string()));
        }
        if config.pass.is_empty() {
            return Err(MailError::Config("mail password is empty".to_string()));
        }
        if config.from_address.trim().is_empty() {
            return Err(MailError::Config("sender address is empty".to_string()));
        }

        Ok(config)
    }
}

impl fmt::Debug for MailerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MailerConfig")
            .field("user", &self.user)
            .field("pass", &"<redacted>")
            .field("from_address", &self.from_address)
            .finish()
    }
}
