use std::sync::Arc;

use async_trait::async_trait;
use kitab_kernel::{Callable, CallableError};
use kitab_mail::MailTransport;

use super::models::{PinRequest, SendPinPayload, SendPinResult};
use super::template::render_pin_mail;

pub const SEND_FAILED: &str = "Failed to send email";

/// `sendSecurityPin`: validate an email/PIN pair and mail the PIN.
pub struct SendPinHandler {
    transport: Arc<dyn MailTransport>,
    from_address: String,
}

impl SendPinHandler {
    pub fn new(transport: Arc<dyn MailTransport>, from_address: impl Into<String>) -> Self {
        Self {
            transport,
            from_address: from_address.into(),
        }
    }
}

#[async_trait]
impl Callable for SendPinHandler {
    const NAME: &'static str = "sendSecurityPin";
    type Payload = SendPinPayload;
    type Output = SendPinResult;

    async fn call(&self, payload: SendPinPayload) -> Result<SendPinResult, CallableError> {
        let request = PinRequest::try_from(payload)?;
        let mail = render_pin_mail(&self.from_address, &request.email, &request.pin);

        // The transport error stays in the logs; callers only see SEND_FAILED.
        self.transport.send(&mail).await.map_err(|e| {
            tracing::error!(error = %e, to = %request.email, "Email error");
            CallableError::internal(SEND_FAILED)
        })?;

        tracing::info!(to = %request.email, "security PIN sent");
        Ok(SendPinResult { success: true })
    }
}
