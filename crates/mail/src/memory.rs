use std::sync::Mutex;

use async_trait::async_trait;

use crate::{MailError, MailTransport, OutgoingMail};

/// Transport that keeps messages in memory instead of delivering them.
#[derive(Default)]
pub struct MemoryOutbox {
    sent: Mutex<Vec<OutgoingMail>>,
}

impl MemoryOutbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages accepted so far, oldest first.
    pub fn sent(&self) -> Vec<OutgoingMail> {
        self.sent
            .lock()
            .map(|sent| sent.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl MailTransport for MemoryOutbox {
    async fn send(&self, mail: &OutgoingMail) -> Result<(), MailError> {
        // Bodies may carry secrets; only the envelope is logged.
        tracing::info!(to = %mail.to, subject = %mail.subject, "mail captured by memory outbox");

        self.sent
            .lock()
            .map_err(|_| MailError::Config("memory outbox lock poisoned".to_string()))?
            .push(mail.clone());
        Ok(())
    }
}
