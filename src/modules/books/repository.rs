//! SQL persistence for books.

use async_trait::async_trait;
use bookshelf_http::error::AppError;
use bookshelf_kernel::{RequestContext, SchemaStatement};
use sqlx::any::AnyRow;
use sqlx::{AnyPool, Row};

use super::models::Book;

pub const NOT_FOUND_MESSAGE: &str = "data not found";

const CREATE_QUERY: &str = "INSERT INTO books(title, author) VALUES($1,$2) RETURNING id";
const FIND_ONE_BY_ID_QUERY: &str = "SELECT id, title, author FROM books WHERE id=$1";
const FIND_ALL_QUERY: &str = "SELECT id, title, author FROM books";

pub const BOOKS_TABLE: SchemaStatement = SchemaStatement {
    id: "001_books",
    sqlite: "CREATE TABLE IF NOT EXISTS books (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        title TEXT NOT NULL,
        author TEXT NOT NULL
    )",
    postgres: "CREATE TABLE IF NOT EXISTS books (
        id BIGSERIAL PRIMARY KEY,
        title TEXT NOT NULL,
        author TEXT NOT NULL
    )",
};

#[async_trait]
pub trait BookRepository: Send + Sync {
    /// Insert `book` and return it with the generated id.
    async fn create(&self, ctx: &RequestContext, book: Book) -> Result<Book, AppError>;

    async fn find_one_by_id(&self, ctx: &RequestContext, id: u64) -> Result<Book, AppError>;

    /// All books in the order the store returns them.
    ///
    /// An empty table is reported as `NotFound`, not as an empty list.
    async fn find_all(&self, ctx: &RequestContext) -> Result<Vec<Book>, AppError>;
}

pub struct SqlBookRepository {
    pool: AnyPool,
}

impl SqlBookRepository {
    pub fn new(pool: AnyPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookRepository for SqlBookRepository {
    async fn create(&self, ctx: &RequestContext, mut book: Book) -> Result<Book, AppError> {
        let row = ctx
            .run(
                sqlx::query(CREATE_QUERY)
                    .bind(book.title.as_str())
                    .bind(book.author.as_str())
                    .fetch_one(&self.pool),
            )
            .await?
            .map_err(|err| query_failed("create_book", err))?;

        book.id = read_id(&row, "create_book")?;
        tracing::debug!(book_id = book.id, "book created");

        Ok(book)
    }

    async fn find_one_by_id(&self, ctx: &RequestContext, id: u64) -> Result<Book, AppError> {
        // Ids beyond the signed range can never have been assigned.
        let Ok(key) = i64::try_from(id) else {
            return Err(AppError::not_found(NOT_FOUND_MESSAGE));
        };

        let row = ctx
            .run(
                sqlx::query(FIND_ONE_BY_ID_QUERY)
                    .bind(key)
                    .fetch_optional(&self.pool),
            )
            .await?
            .map_err(|err| query_failed("find_one_book_by_id", err))?;

        match row {
            Some(row) => read_book(&row, "find_one_book_by_id"),
            None => Err(AppError::not_found(NOT_FOUND_MESSAGE)),
        }
    }

    async fn find_all(&self, ctx: &RequestContext) -> Result<Vec<Book>, AppError> {
        let rows = ctx
            .run(sqlx::query(FIND_ALL_QUERY).fetch_all(&self.pool))
            .await?
            .map_err(|err| query_failed("find_all_books", err))?;

        let books = rows
            .iter()
            .map(|row| read_book(row, "find_all_books"))
            .collect::<Result<Vec<_>, _>>()?;

        if books.is_empty() {
            return Err(AppError::not_found(NOT_FOUND_MESSAGE));
        }

        Ok(books)
    }
}

fn query_failed(operation: &'static str, err: sqlx::Error) -> AppError {
    tracing::error!(operation, error = %err, "book repository query failed");
    AppError::internal_with_cause(bookshelf_http::error::INTERNAL_ERROR_MESSAGE, err)
}

fn read_id(row: &AnyRow, operation: &'static str) -> Result<u64, AppError> {
    let id: i64 = row
        .try_get("id")
        .map_err(|err| query_failed(operation, err))?;

    u64::try_from(id).map_err(|err| {
        tracing::error!(operation, id, "database returned a negative book id");
        AppError::internal_with_cause(bookshelf_http::error::INTERNAL_ERROR_MESSAGE, err)
    })
}

fn read_book(row: &AnyRow, operation: &'static str) -> Result<Book, AppError> {
    Ok(Book {
        id: read_id(row, operation)?,
        title: row
            .try_get("title")
            .map_err(|err| query_failed(operation, err))?,
        author: row
            .try_get("author")
            .map_err(|err| query_failed(operation, err))?,
    })
}
