//! Book endpoints

use axum::{extract::State, http::StatusCode, Json};
use axum_extra::extract::Multipart;

use crate::{
    error::AppResult,
    models::{
        book::{Book, BookDetail, BookPayload, BookQuery},
        cover::{CoverImage, ImageTarget},
    },
};

use super::{read_cover_field, AuthenticatedUser, JsonBody, PathParam, QueryParams};

/// List books with optional id filters
#[utoipa::path(
    get,
    path = "/api/book/book/",
    tag = "book",
    security(("token_auth" = [])),
    params(BookQuery),
    responses(
        (status = 200, description = "Books, newest first", body = Vec<Book>),
        (status = 400, description = "Invalid filter", body = crate::error::ErrorResponse),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_books(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_user): AuthenticatedUser,
    QueryParams(query): QueryParams<BookQuery>,
) -> AppResult<Json<Vec<Book>>> {
    let books = state.services.catalog.list_books(&query).await?;
    Ok(Json(books))
}

/// Get a book with its relations expanded
#[utoipa::path(
    get,
    path = "/api/book/book/{id}/",
    tag = "book",
    security(("token_auth" = [])),
    params(("id" = i32, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Book details", body = BookDetail),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn get_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_user): AuthenticatedUser,
    PathParam(id): PathParam<i32>,
) -> AppResult<Json<BookDetail>> {
    let book = state.services.catalog.get_book(id).await?;
    Ok(Json(book))
}

/// Create a book
#[utoipa::path(
    post,
    path = "/api/book/book/",
    tag = "book",
    security(("token_auth" = [])),
    request_body = BookPayload,
    responses(
        (status = 201, description = "Book created", body = Book),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn create_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_user): AuthenticatedUser,
    JsonBody(payload): JsonBody<BookPayload>,
) -> AppResult<(StatusCode, Json<Book>)> {
    let book = state.services.catalog.create_book(payload).await?;
    Ok((StatusCode::CREATED, Json(book)))
}

/// Replace a book; every required field must be supplied
#[utoipa::path(
    put,
    path = "/api/book/book/{id}/",
    tag = "book",
    security(("token_auth" = [])),
    params(("id" = i32, Path, description = "Book ID")),
    request_body = BookPayload,
    responses(
        (status = 200, description = "Book updated", body = Book),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn update_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_user): AuthenticatedUser,
    PathParam(id): PathParam<i32>,
    JsonBody(payload): JsonBody<BookPayload>,
) -> AppResult<Json<Book>> {
    let book = state.services.catalog.update_book(id, payload, false).await?;
    Ok(Json(book))
}

/// Change only the supplied fields of a book
#[utoipa::path(
    patch,
    path = "/api/book/book/{id}/",
    tag = "book",
    security(("token_auth" = [])),
    params(("id" = i32, Path, description = "Book ID")),
    request_body = BookPayload,
    responses(
        (status = 200, description = "Book updated", body = Book),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn partial_update_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_user): AuthenticatedUser,
    PathParam(id): PathParam<i32>,
    JsonBody(payload): JsonBody<BookPayload>,
) -> AppResult<Json<Book>> {
    let book = state.services.catalog.update_book(id, payload, true).await?;
    Ok(Json(book))
}

/// Delete a book and its copies
#[utoipa::path(
    delete,
    path = "/api/book/book/{id}/",
    tag = "book",
    security(("token_auth" = [])),
    params(("id" = i32, Path, description = "Book ID")),
    responses(
        (status = 204, description = "Book deleted"),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn delete_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_user): AuthenticatedUser,
    PathParam(id): PathParam<i32>,
) -> AppResult<StatusCode> {
    state.services.catalog.delete_book(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Upload a cover image for a book
#[utoipa::path(
    post,
    path = "/api/book/book/{id}/upload-image/",
    tag = "book",
    security(("token_auth" = [])),
    params(("id" = i32, Path, description = "Book ID")),
    request_body(content = crate::models::cover::CoverUpload, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Cover stored", body = CoverImage),
        (status = 400, description = "Not a valid image", body = crate::error::ErrorResponse),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn upload_book_image(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_user): AuthenticatedUser,
    PathParam(id): PathParam<i32>,
    multipart: Multipart,
) -> AppResult<Json<CoverImage>> {
    let bytes = read_cover_field(multipart).await?;
    let cover = state
        .services
        .catalog
        .upload_cover(ImageTarget::Book(id), bytes)
        .await?;
    Ok(Json(cover))
}
