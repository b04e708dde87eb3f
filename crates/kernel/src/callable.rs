//! Callable endpoints: single-shot request handlers invoked by name with a
//! structured payload.

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

/// The two ways a callable can fail.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CallableError {
    /// The caller sent a malformed or incomplete payload.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A collaborator (store, mail transport) failed while serving the call.
    #[error("internal: {0}")]
    Internal(String),
}

impl CallableError {
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Caller-visible message without the kind prefix.
    pub fn message(&self) -> &str {
        match self {
            Self::InvalidArgument(message) | Self::Internal(message) => message,
        }
    }

    /// Canonical status name used on the wire.
    pub fn status(&self) -> &'static str {
        match self {
            Self::InvalidArgument(_) => "INVALID_ARGUMENT",
            Self::Internal(_) => "INTERNAL",
        }
    }
}

/// A request handler that validates its payload, performs at most one
/// external call and returns a structured result.
///
/// Implementations hold no per-call state and may be invoked concurrently.
#[async_trait]
pub trait Callable: Send + Sync {
    /// Name the endpoint is invoked by, e.g. `addBook`.
    const NAME: &'static str;

    /// Wire payload. Fields the handler requires should be optional here so
    /// that absence is reported by the handler itself.
    type Payload: DeserializeOwned + Send + 'static;

    /// Successful result, serialized under `result`.
    type Output: Serialize + Send + 'static;

    async fn call(&self, payload: Self::Payload) -> Result<Self::Output, CallableError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_strips_kind() {
        let error = CallableError::invalid_argument("Email or PIN missing.");
        assert_eq!(error.message(), "Email or PIN missing.");
        assert_eq!(error.to_string(), "invalid argument: Email or PIN missing.");
    }

    #[test]
    fn status_names_match_wire_protocol() {
        assert_eq!(
            CallableError::invalid_argument("x").status(),
            "INVALID_ARGUMENT"
        );
        assert_eq!(CallableError::internal("x").status(), "INTERNAL");
    }
}
