//! HTTP handlers for the Books module.

use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    routing::get,
    Json, Router,
};
use bookshelf_http::{error::AppError, response::ApiResponse};
use bookshelf_kernel::RequestContext;

use super::models::{BookResponse, NewBookRequest};
use super::service::BookService;

pub const INVALID_BODY_MESSAGE: &str = "invalid json request body";
pub const INVALID_BOOK_ID_MESSAGE: &str = "bookId param must be a valid number";

type Service = Arc<dyn BookService>;

/// Routes relative to the module mount point (`/books`).
pub fn router(service: Service) -> Router {
    Router::new()
        .route("/", get(find_all).post(create))
        .route("/{book_id}", get(find_one_by_id))
        .with_state(service)
}

async fn create(
    State(service): State<Service>,
    ctx: RequestContext,
    payload: Result<Json<NewBookRequest>, JsonRejection>,
) -> Result<ApiResponse<BookResponse>, AppError> {
    let Json(request) = payload.map_err(|rejection| {
        tracing::debug!(error = %rejection, "rejected book payload");
        AppError::unprocessable_entity(INVALID_BODY_MESSAGE)
    })?;

    if !request.is_complete() {
        return Err(AppError::unprocessable_entity(INVALID_BODY_MESSAGE));
    }

    let book = service.create(&ctx, request).await?;
    tracing::info!(book_id = book.id, "book created");

    Ok(ApiResponse::created(book))
}

async fn find_one_by_id(
    State(service): State<Service>,
    ctx: RequestContext,
    book_id: Result<Path<String>, PathRejection>,
) -> Result<ApiResponse<BookResponse>, AppError> {
    let book_id = book_id
        .ok()
        .and_then(|Path(raw)| raw.parse::<u64>().ok())
        .ok_or_else(|| AppError::unprocessable_entity(INVALID_BOOK_ID_MESSAGE))?;

    let book = service.find_one_by_id(&ctx, book_id).await?;
    Ok(ApiResponse::ok(book))
}

async fn find_all(
    State(service): State<Service>,
    ctx: RequestContext,
) -> Result<ApiResponse<Vec<BookResponse>>, AppError> {
    let books = service.find_all(&ctx).await?;
    Ok(ApiResponse::ok(books))
}
