pub mod handler;
pub mod models;
pub mod template;

use std::sync::Arc;

use async_trait::async_trait;
use axum::{routing::get, Router};
use kitab_http::{callable_openapi, callable_router};
use kitab_kernel::{Callable, InitCtx, Module};
use kitab_mail::MailTransport;
use serde_json::json;

pub use handler::SendPinHandler;

/// Admin module: hosts the `sendSecurityPin` callable.
/// Callers are assumed to be authenticated admins already.
pub struct AdminModule {
    send_pin: Arc<SendPinHandler>,
}

impl AdminModule {
    pub fn new(transport: Arc<dyn MailTransport>, from_address: impl Into<String>) -> Self {
        Self {
            send_pin: Arc::new(SendPinHandler::new(transport, from_address)),
        }
    }
}

#[async_trait]
impl Module for AdminModule {
    fn name(&self) -> &'static str {
        "admin"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            mail = ?ctx.settings.mail.backend,
            "admin module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        callable_router(Arc::clone(&self.send_pin)).route("/health", get(health_check))
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        let mut spec = json!({
            "paths": {
                "/health": {
                    "get": {
                        "summary": "Admin health check",
                        "tags": ["Admin"],
                        "responses": {
                            "200": { "description": "OK" }
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "SendPinPayload": {
                        "type": "object",
                        "properties": {
                            "email": {
                                "type": "string",
                                "description": "Admin address the PIN is sent to"
                            },
                            "pin": {
                                "oneOf": [{ "type": "string" }, { "type": "integer" }],
                                "description": "Numeric PINs are sent as text"
                            }
                        },
                        "required": ["email", "pin"]
                    },
                    "SendPinResult": {
                        "type": "object",
                        "properties": {
                            "success": { "type": "boolean" }
                        },
                        "required": ["success"]
                    }
                }
            }
        });

        spec["paths"][format!("/{}", SendPinHandler::NAME)] = callable_openapi(
            "Email a security PIN to an admin",
            "Admin",
            "SendPinPayload",
            "SendPinResult",
        );
        Some(spec)
    }
}

async fn health_check() -> &'static str {
    "admin module is healthy"
}

/// Create a new instance of the admin module
pub fn create_module(
    transport: Arc<dyn MailTransport>,
    from_address: impl Into<String>,
) -> Arc<dyn Module> {
    Arc::new(AdminModule::new(transport, from_address))
}
