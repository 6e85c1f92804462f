use std::sync::Arc;

use async_trait::async_trait;
use bookshelf_http::error::AppError;
use bookshelf_kernel::RequestContext;

use super::models::{Book, BookResponse, NewBookRequest};
use super::repository::BookRepository;

/// Translates between the wire models and [`Book`]; errors pass through untouched.
#[async_trait]
pub trait BookService: Send + Sync {
    async fn create(
        &self,
        ctx: &RequestContext,
        request: NewBookRequest,
    ) -> Result<BookResponse, AppError>;

    async fn find_one_by_id(&self, ctx: &RequestContext, id: u64)
        -> Result<BookResponse, AppError>;

    async fn find_all(&self, ctx: &RequestContext) -> Result<Vec<BookResponse>, AppError>;
}

pub struct BookServiceImpl {
    repository: Arc<dyn BookRepository>,
}

impl BookServiceImpl {
    pub fn new(repository: Arc<dyn BookRepository>) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl BookService for BookServiceImpl {
    async fn create(
        &self,
        ctx: &RequestContext,
        request: NewBookRequest,
    ) -> Result<BookResponse, AppError> {
        let book = self.repository.create(ctx, Book::from(request)).await?;
        Ok(book.into())
    }

    async fn find_one_by_id(
        &self,
        ctx: &RequestContext,
        id: u64,
    ) -> Result<BookResponse, AppError> {
        let book = self.repository.find_one_by_id(ctx, id).await?;
        Ok(book.into())
    }

    async fn find_all(&self, ctx: &RequestContext) -> Result<Vec<BookResponse>, AppError> {
        let books = self.repository.find_all(ctx).await?;
        Ok(books.into_iter().map(BookResponse::from).collect())
    }
}
