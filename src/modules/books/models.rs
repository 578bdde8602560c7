use serde::{Deserialize, Serialize};

/// A catalogued book, keyed by ISBN.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Book {
    /// Primary key, immutable once created
    pub isbn: String,
    pub amazon_url: String,
    pub author: String,
    pub language: String,
    pub pages: i64,
    pub publisher: String,
    pub title: String,
    pub year: i64,
}

/// `{"book": ...}` response envelope
#[derive(Debug, Serialize, Deserialize)]
pub struct BookEnvelope {
    pub book: Book,
}

/// `{"books": [...]}` response envelope
#[derive(Debug, Serialize, Deserialize)]
pub struct BookList {
    pub books: Vec<Book>,
}

/// `{"message": ...}` response envelope
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageBody {
    pub message: String,
}
