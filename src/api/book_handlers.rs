//! Book CRUD handlers. Every route here sits behind `require_auth`.

use crate::api::handlers::{ApiState, AppError};
use crate::api::PaginationParams;
use crate::auth::extractor::AuthUser;
use crate::books::{Book, BookRequest};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;

/// Response for DELETE /books/{id}
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

fn book_not_found() -> AppError {
    AppError::NotFound("Book not found".to_string())
}

/// POST /books
pub async fn create_book(
    State(state): State<ApiState>,
    _user: AuthUser,
    Json(req): Json<BookRequest>,
) -> Result<(StatusCode, Json<Book>), AppError> {
    let book = state.books.create_book(req).await?;
    Ok((StatusCode::CREATED, Json(book)))
}

/// GET /books?page=&limit=
pub async fn list_books(
    State(state): State<ApiState>,
    _user: AuthUser,
    Query(pagination): Query<PaginationParams>,
) -> Result<Json<Vec<Book>>, AppError> {
    pagination.validate().map_err(AppError::BadRequest)?;
    let books = state
        .books
        .list_books(pagination.offset(), pagination.limit())
        .await?;
    Ok(Json(books))
}

/// GET /books/{id}
pub async fn get_book(
    State(state): State<ApiState>,
    _user: AuthUser,
    Path(id): Path<u64>,
) -> Result<Json<Book>, AppError> {
    let book = state.books.get_book(id).await?.ok_or_else(book_not_found)?;
    Ok(Json(book))
}

/// PUT /books/{id}
pub async fn update_book(
    State(state): State<ApiState>,
    _user: AuthUser,
    Path(id): Path<u64>,
    Json(req): Json<BookRequest>,
) -> Result<Json<Book>, AppError> {
    let book = state
        .books
        .update_book(id, req)
        .await?
        .ok_or_else(book_not_found)?;
    Ok(Json(book))
}

/// DELETE /books/{id}
pub async fn delete_book(
    State(state): State<ApiState>,
    _user: AuthUser,
    Path(id): Path<u64>,
) -> Result<Json<MessageResponse>, AppError> {
    if !state.books.delete_book(id).await? {
        return Err(book_not_found());
    }
    Ok(Json(MessageResponse {
        message: "Book was deleted successfully".to_string(),
    }))
}
