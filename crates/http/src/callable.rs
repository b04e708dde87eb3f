//! Wire adapter for [`Callable`] handlers.
//!
//! Requests are `POST` bodies of the form `{"data": <payload>}`; successes
//! answer `200 {"result": <output>}` and failures use the [`AppError`] body.

use std::sync::Arc;

use axum::{
    body::Bytes,
    routing::{post, MethodRouter},
    Json, Router,
};
use kitab_kernel::Callable;
use serde::{Deserialize, Serialize};
use tracing::Instrument;

use crate::error::AppError;

/// Request envelope sent by callable clients.
#[derive(Debug, Deserialize)]
pub struct CallableRequest<T> {
    pub data: T,
}

/// Success envelope returned to callable clients.
#[derive(Debug, Serialize)]
pub struct CallableResponse<T> {
    pub result: T,
}

/// Decode the envelope and run the handler once.
///
/// The envelope is decoded before the payload so the two failures carry
/// distinct messages. Field-level checks belong to the handler.
pub async fn invoke<C: Callable>(
    handler: &C,
    body: &[u8],
) -> Result<CallableResponse<C::Output>, AppError> {
    let request: CallableRequest<serde_json::Value> = serde_json::from_slice(body)
        .map_err(|e| AppError::invalid_argument(format!("Invalid request body: {}", e)))?;
    let payload: C::Payload = serde_json::from_value(request.data)
        .map_err(|e| AppError::invalid_argument(format!("Invalid request data: {}", e)))?;

    let result = handler.call(payload).await?;
    Ok(CallableResponse { result })
}

/// `POST` method router for a single callable.
pub fn callable_route<C: Callable + 'static>(handler: Arc<C>) -> MethodRouter {
    post(move |body: Bytes| {
        let handler = Arc::clone(&handler);
        let span = tracing::info_span!("callable", name = C::NAME);
        async move {
            let response = invoke(handler.as_ref(), &body).await?;
            tracing::info!("callable completed");
            Ok::<_, AppError>(Json(response))
        }
        .instrument(span)
    })
}

/// Router exposing the callable at `/{C::NAME}`.
pub fn callable_router<C: Callable + 'static>(handler: Arc<C>) -> Router {
    Router::new().route(&format!("/{}", C::NAME), callable_route(handler))
}

/// OpenAPI path item for a callable whose payload and result schemas are
/// registered under `components.schemas`.
pub fn callable_openapi(summary: &str, tag: &str, payload: &str, result: &str) -> serde_json::Value {
    let error_response = |description: &str| {
        serde_json::json!({
            "description": description,
            "content": {
                "application/json": {
                    "schema": { "$ref": "#/components/schemas/ErrorResponse" }
                }
            }
        })
    };

    serde_json::json!({
        "post": {
            "summary": summary,
            "tags": [tag],
            "requestBody": {
                "required": true,
                "content": {
                    "application/json": {
                        "schema": {
                            "type": "object",
                            "properties": {
                                "data": { "$ref": format!("#/components/schemas/{}", payload) }
                            },
                            "required": ["data"]
                        }
                    }
                }
            },
            "responses": {
                "200": {
                    "description": "Callable result",
                    "content": {
                        "application/json": {
                            "schema": {
                                "type": "object",
                                "properties": {
                                    "result": { "$ref": format!("#/components/schemas/{}", result) }
                                },
                                "required": ["result"]
                            }
                        }
                    }
                },
                "400": error_response("Invalid argument"),
                "500": error_response("Internal error")
            }
        }
    })
}
