use serde::{Deserialize, Serialize};
use serde_json::Value;

use kitab_kernel::payload::{text, text_or_number};
use kitab_kernel::CallableError;

pub const MISSING_FIELDS: &str = "Email or PIN missing.";

/// Wire payload for `sendSecurityPin`. A numeric `pin` is accepted and
/// rendered as text.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SendPinPayload {
    pub email: Option<Value>,
    pub pin: Option<Value>,
}

/// A validated PIN delivery request.
#[derive(Clone, PartialEq, Eq)]
pub struct PinRequest {
    pub email: String,
    pub pin: String,
}

impl std::fmt::Debug for PinRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PinRequest")
            .field("email", &self.email)
            .field("pin", &"<redacted>")
            .finish()
    }
}

impl TryFrom<SendPinPayload> for PinRequest {
    type Error = CallableError;

    fn try_from(payload: SendPinPayload) -> Result<Self, Self::Error> {
        let email = text(payload.email);
        let pin = text_or_number(payload.pin);

        match (email, pin) {
            (Some(email), Some(pin)) => Ok(Self { email, pin }),
            _ => Err(CallableError::invalid_argument(MISSING_FIELDS)),
        }
    }
}

/// Result of a successful `sendSecurityPin` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendPinResult {
    pub success: bool,
}
