//! HTTP handlers for `/books`.

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    routing::get,
    Json, Router,
};
use bookshelf_http::error::AppError;
use serde_json::Value;

use super::models::{Book, BookEnvelope, BookList, MessageBody};
use super::repository::{BookError, BookRepository};
use super::schema;

impl From<BookError> for AppError {
    fn from(error: BookError) -> Self {
        match error {
            BookError::NotFound(_) => AppError::not_found(error.to_string()),
            BookError::Conflict(_) => AppError::conflict(error.to_string()),
            BookError::Store(source) => AppError::Internal(source.into()),
        }
    }
}

pub fn router(repository: BookRepository) -> Router {
    Router::new()
        .route("/", get(list_books).post(create_book))
        .route(
            "/{isbn}",
            get(get_book).put(update_book).delete(delete_book),
        )
        .with_state(repository)
}

/// Validate a raw body and decode it into a [`Book`]
fn parse_book(payload: Result<Json<Value>, JsonRejection>) -> Result<Book, AppError> {
    let Json(payload) = payload?;
    schema::validate_book(&payload).map_err(AppError::validation)?;
    serde_json::from_value(payload).map_err(|error| AppError::validation(vec![error.to_string()]))
}

async fn list_books(State(repository): State<BookRepository>) -> Result<Json<BookList>, AppError> {
    let books = repository.list_all().await?;
    Ok(Json(BookList { books }))
}

async fn get_book(
    State(repository): State<BookRepository>,
    isbn: Result<Path<String>, PathRejection>,
) -> Result<Json<BookEnvelope>, AppError> {
    let Path(isbn) = isbn?;
    let book = repository.get_by_isbn(&isbn).await?;
    Ok(Json(BookEnvelope { book }))
}

async fn create_book(
    State(repository): State<BookRepository>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<BookEnvelope>), AppError> {
    let book = parse_book(payload)?;
    let book = repository.create(&book).await?;
    Ok((StatusCode::CREATED, Json(BookEnvelope { book })))
}

async fn update_book(
    State(repository): State<BookRepository>,
    isbn: Result<Path<String>, PathRejection>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<BookEnvelope>, AppError> {
    let Path(isbn) = isbn?;
    let book = parse_book(payload)?;
    let book = repository.update(&isbn, &book).await?;
    Ok(Json(BookEnvelope { book }))
}

async fn delete_book(
    State(repository): State<BookRepository>,
    isbn: Result<Path<String>, PathRejection>,
) -> Result<Json<MessageBody>, AppError> {
    let Path(isbn) = isbn?;
    repository.delete(&isbn).await?;
    Ok(Json(MessageBody {
        message: "Book deleted".to_string(),
    }))
}
