pub mod handler;
pub mod models;

use std::sync::Arc;

use async_trait::async_trait;
use axum::{routing::get, Router};
use kitab_db::DocumentStore;
use kitab_http::{callable_openapi, callable_router};
use kitab_kernel::{Callable, InitCtx, Module};
use serde_json::json;

pub use handler::AddBookHandler;

/// Books module: hosts the `addBook` callable
pub struct BooksModule {
    add_book: Arc<AddBookHandler>,
}

impl BooksModule {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            add_book: Arc::new(AddBookHandler::new(store)),
        }
    }
}

#[async_trait]
impl Module for BooksModule {
    fn name(&self) -> &'static str {
        "books"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            store = ?ctx.settings.store.backend,
            "books module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        callable_router(Arc::clone(&self.add_book)).route("/health", get(health_check))
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        let mut spec = json!({
            "paths": {
                "/health": {
                    "get": {
                        "summary": "Books health check",
                        "tags": ["Books"],
                        "responses": {
                            "200": {
                                "description": "OK",
                                "content": {
                                    "text/plain": {
                                        "schema": { "type": "string" }
                                    }
                                }
                            }
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "AddBookPayload": {
                        "type": "object",
                        "properties": {
                            "title": {
                                "type": "string",
                                "description": "Title of the book"
                            },
                            "author": {
                                "type": "string",
                                "description": "Author of the book"
                            },
                            "year": {
                                "type": "integer",
                                "description": "Publication year"
                            }
                        },
                        "required": ["title", "author", "year"]
                    },
                    "AddBookResult": {
                        "type": "object",
                        "properties": {
                            "message": { "type": "string" },
                            "id": {
                                "type": "string",
                                "description": "Store-generated document id"
                            }
                        },
                        "required": ["message", "id"]
                    }
                }
            }
        });

        spec["paths"][format!("/{}", AddBookHandler::NAME)] = callable_openapi(
            "Add a book to the catalog",
            "Books",
            "AddBookPayload",
            "AddBookResult",
        );
        Some(spec)
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module stopped");
        Ok(())
    }
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "books module is healthy"
}

/// Create a new instance of the books module
pub fn create_module(store: Arc<dyn DocumentStore>) -> Arc<dyn Module> {
    Arc::new(BooksModule::new(store))
}
