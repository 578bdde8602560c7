pub mod models;
pub mod repository;
pub mod routes;
pub mod schema;

use async_trait::async_trait;
use axum::Router;
use bookshelf_kernel::{InitCtx, Migration, Module};
use serde_json::json;

use repository::BookRepository;

/// Book catalogue: CRUD over the `books` table, keyed by ISBN
pub struct BooksModule;

impl BooksModule {
    pub const fn new() -> Self {
        Self
    }
}

impl Default for BooksModule {
    fn default() -> Self {
        Self::new()
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

    fn routes(&self, ctx: &InitCtx<'_>) -> Router {
        routes::router(BookRepository::new(ctx.db.clone()))
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        let book_ref = json!({ "$ref": "#/components/schemas/Book" });
        let error = json!({
            "content": {
                "application/json": {
                    "schema": { "$ref": "#/components/schemas/ErrorResponse" }
                }
            }
        });
        let error_response = |description: &str| {
            let mut response = error.clone();
            response["description"] = json!(description);
            response
        };
        let book_body = |description: &str| {
            json!({
                "description": description,
                "content": {
                    "application/json": {
                        "schema": {
                            "type": "object",
                            "properties": { "book": book_ref },
                            "required": ["book"]
                        }
                    }
                }
            })
        };
        let isbn_param = json!({
            "name": "isbn",
            "in": "path",
            "required": true,
            "schema": { "type": "string" }
        });

        Some(json!({
            "paths": {
                "/": {
                    "get": {
                        "summary": "List books",
                        "tags": ["Books"],
                        "responses": {
                            "200": {
                                "description": "All books",
                                "content": {
                                    "application/json": {
                                        "schema": {
                                            "type": "object",
                                            "properties": {
                                                "books": { "type": "array", "items": book_ref }
                                            },
                                            "required": ["books"]
                                        }
                                    }
                                }
                            },
                            "500": error_response("Internal server error")
                        }
                    },
                    "post": {
                        "summary": "Create a book",
                        "tags": ["Books"],
                        "requestBody": {
                            "required": true,
                            "content": { "application/json": { "schema": book_ref } }
                        },
                        "responses": {
                            "201": book_body("Created book"),
                            "400": error_response("Validation error"),
                            "409": error_response("ISBN already exists")
                        }
                    }
                },
                "/{isbn}": {
                    "parameters": [isbn_param],
                    "get": {
                        "summary": "Get a book by ISBN",
                        "tags": ["Books"],
                        "responses": {
                            "200": book_body("The book"),
                            "404": error_response("Book not found")
                        }
                    },
                    "put": {
                        "summary": "Replace a book",
                        "tags": ["Books"],
                        "requestBody": {
                            "required": true,
                            "content": { "application/json": { "schema": book_ref } }
                        },
                        "responses": {
                            "200": book_body("Updated book"),
                            "400": error_response("Validation error"),
                            "404": error_response("Book not found")
                        }
                    },
                    "delete": {
                        "summary": "Delete a book",
                        "tags": ["Books"],
                        "responses": {
                            "200": {
                                "description": "Book deleted",
                                "content": {
                                    "application/json": {
                                        "schema": {
                                            "type": "object",
                                            "properties": { "message": { "type": "string" } }
                                        }
                                    }
                                }
                            },
                            "404": error_response("Book not found")
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "Book": book_schema()
                }
            }
        }))
    }

    fn migrations(&self) -> Vec<Migration> {
        vec![Migration {
            id: "001_init",
            up: r#"
                CREATE TABLE IF NOT EXISTS books (
                    isbn       TEXT PRIMARY KEY NOT NULL,
                    amazon_url TEXT NOT NULL,
                    author     TEXT NOT NULL,
                    language   TEXT NOT NULL,
                    pages      INTEGER NOT NULL,
                    publisher  TEXT NOT NULL,
                    title      TEXT NOT NULL,
                    year       INTEGER NOT NULL
                );
                "#,
        }]
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

/// OpenAPI rendering of the validator's field table
fn book_schema() -> serde_json::Value {
    let mut properties = serde_json::Map::new();
    let mut required = Vec::new();

    for rule in schema::BOOK_SCHEMA {
        let property = match rule.kind {
            schema::FieldKind::Text => json!({ "type": "string", "minLength": 1 }),
            schema::FieldKind::Integer => json!({ "type": "integer", "format": "int64" }),
        };
        properties.insert(rule.name.to_string(), property);
        if rule.required {
            required.push(rule.name);
        }
    }

    json!({
        "type": "object",
        "properties": properties,
        "required": required
    })
}

/// Create a new instance of the books module
pub fn create_module() -> std::sync::Arc<dyn Module> {
    std::sync::Arc::new(BooksModule::new())
}
