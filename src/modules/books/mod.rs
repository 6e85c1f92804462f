pub mod models;
pub mod repository;
pub mod routes;
pub mod service;

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use bookshelf_kernel::{InitCtx, Module, SchemaStatement};
use serde_json::json;
use sqlx::AnyPool;
use utoipa::PartialSchema;

use models::{BookResponse, NewBookRequest};
use repository::{SqlBookRepository, BOOKS_TABLE};
use service::{BookService, BookServiceImpl};

/// Books module: create, fetch and list books.
pub struct BooksModule {
    service: Arc<dyn BookService>,
}

impl BooksModule {
    /// Wire repository and service on top of an existing pool
    pub fn new(pool: AnyPool) -> Self {
        let repository = Arc::new(SqlBookRepository::new(pool));
        Self::with_service(Arc::new(BookServiceImpl::new(repository)))
    }

    pub fn with_service(service: Arc<dyn BookService>) -> Self {
        Self { service }
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
            "books module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        routes::router(self.service.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        Some(json!({
            "paths": {
                "/": {
                    "get": {
                        "summary": "List books",
                        "tags": ["Books"],
                        "responses": {
                            "200": envelope_response("List of books"),
                            "404": envelope_response("No books stored"),
                            "500": envelope_response("Internal server error")
                        }
                    },
                    "post": {
                        "summary": "Create a book",
                        "tags": ["Books"],
                        "requestBody": {
                            "required": true,
                            "content": {
                                "application/json": {
                                    "schema": {
                                        "$ref": "#/components/schemas/NewBookRequest"
                                    }
                                }
                            }
                        },
                        "responses": {
                            "201": envelope_response("Book created"),
                            "422": envelope_response("Invalid JSON request body"),
                            "500": envelope_response("Internal server error")
                        }
                    }
                },
                "/{bookId}": {
                    "get": {
                        "summary": "Get a book by id",
                        "tags": ["Books"],
                        "parameters": [{
                            "name": "bookId",
                            "in": "path",
                            "required": true,
                            "schema": {
                                "type": "integer",
                                "format": "int64",
                                "minimum": 0
                            }
                        }],
                        "responses": {
                            "200": envelope_response("Book"),
                            "404": envelope_response("Book not found"),
                            "422": envelope_response("bookId is not a number"),
                            "500": envelope_response("Internal server error")
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "BookResponse": BookResponse::schema(),
                    "NewBookRequest": NewBookRequest::schema()
                }
            }
        }))
    }

    fn schema(&self) -> Vec<SchemaStatement> {
        vec![BOOKS_TABLE]
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module started");
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module stopped");
        Ok(())
    }
}

fn envelope_response(description: &str) -> serde_json::Value {
    json!({
        "description": description,
        "content": {
            "application/json": {
                "schema": {
                    "$ref": "#/components/schemas/ApiResponse"
                }
            }
        }
    })
}

/// Create a new instance of the books module
pub fn create_module(pool: AnyPool) -> Arc<dyn Module> {
    Arc::new(BooksModule::new(pool))
}
