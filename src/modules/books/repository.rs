use bookshelf_db::Database;
use thiserror::Error;

use super::models::Book;

const BOOK_COLUMNS: &str = "isbn, amazon_url, author, language, pages, publisher, title, year";

#[derive(Debug, Error)]
pub enum BookError {
    #[error("There is no book with an isbn of '{0}'")]
    NotFound(String),

    #[error("A book with isbn '{0}' already exists")]
    Conflict(String),

    #[error("book store failure: {0}")]
    Store(#[from] sqlx::Error),
}

/// CRUD access to the `books` table.
#[derive(Debug, Clone)]
pub struct BookRepository {
    db: Database,
}

impl BookRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// All books, most recently inserted first.
    pub async fn list_all(&self) -> Result<Vec<Book>, BookError> {
        let books = sqlx::query_as::<_, Book>(&format!(
            "SELECT {BOOK_COLUMNS} FROM books ORDER BY rowid DESC"
        ))
        .fetch_all(self.db.pool())
        .await?;
        Ok(books)
    }

    pub async fn get_by_isbn(&self, isbn: &str) -> Result<Book, BookError> {
        sqlx::query_as::<_, Book>(&format!(
            "SELECT {BOOK_COLUMNS} FROM books WHERE isbn = ?"
        ))
        .bind(isbn)
        .fetch_optional(self.db.pool())
        .await?
        .ok_or_else(|| BookError::NotFound(isbn.to_string()))
    }

    /// Insert `book`, failing with [`BookError::Conflict`] on a duplicate isbn.
    pub async fn create(&self, book: &Book) -> Result<Book, BookError> {
        let created = sqlx::query_as::<_, Book>(&format!(
            "INSERT INTO books ({BOOK_COLUMNS}) VALUES (?, ?, ?, ?, ?, ?, ?, ?) RETURNING {BOOK_COLUMNS}"
        ))
        .bind(&book.isbn)
        .bind(&book.amazon_url)
        .bind(&book.author)
        .bind(&book.language)
        .bind(book.pages)
        .bind(&book.publisher)
        .bind(&book.title)
        .bind(book.year)
        .fetch_one(self.db.pool())
        .await
        .map_err(|error| match error {
            sqlx::Error::Database(ref db_error) if db_error.is_unique_violation() => {
                BookError::Conflict(book.isbn.clone())
            }
            other => BookError::Store(other),
        })?;

        tracing::debug!(isbn = %created.isbn, "book created");
        Ok(created)
    }

    /// Replace every column of the row keyed by `isbn`; `book.isbn` is not consulted.
    pub async fn update(&self, isbn: &str, book: &Book) -> Result<Book, BookError> {
        let updated = sqlx::query_as::<_, Book>(&format!(
            "UPDATE books \
             SET amazon_url = ?, author = ?, language = ?, pages = ?, publisher = ?, title = ?, year = ? \
             WHERE isbn = ? \
             RETURNING {BOOK_COLUMNS}"
        ))
        .bind(&book.amazon_url)
        .bind(&book.author)
        .bind(&book.language)
        .bind(book.pages)
        .bind(&book.publisher)
        .bind(&book.title)
        .bind(book.year)
        .bind(isbn)
        .fetch_optional(self.db.pool())
        .await?
        .ok_or_else(|| BookError::NotFound(isbn.to_string()))?;

        tracing::debug!(isbn, "book updated");
        Ok(updated)
    }

    pub async fn delete(&self, isbn: &str) -> Result<(), BookError> {
        let result = sqlx::query("DELETE FROM books WHERE isbn = ?")
            .bind(isbn)
            .execute(self.db.pool())
            .await?;

        if result.rows_affected() == 0 {
            return Err(BookError::NotFound(isbn.to_string()));
        }

        tracing::debug!(isbn, "book deleted");
        Ok(())
    }
}
