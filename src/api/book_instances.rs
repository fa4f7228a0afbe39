//! Book instance (copy) endpoints

use axum::{extract::State, http::StatusCode, Json};
use axum_extra::extract::Multipart;
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{
        book_instance::{BookInstance, BookInstancePayload, BookInstanceQuery},
        cover::{CoverImage, ImageTarget},
    },
};

use super::{read_cover_field, AuthenticatedUser, JsonBody, PathParam, QueryParams};

/// List copies with optional id filters
#[utoipa::path(
    get,
    path = "/api/book/bookinstance/",
    tag = "book",
    security(("token_auth" = [])),
    params(BookInstanceQuery),
    responses(
        (status = 200, description = "Copies", body = Vec<BookInstance>),
        (status = 400, description = "Invalid filter", body = crate::error::ErrorResponse),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_book_instances(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_user): AuthenticatedUser,
    QueryParams(query): QueryParams<BookInstanceQuery>,
) -> AppResult<Json<Vec<BookInstance>>> {
    let copies = state.services.catalog.list_book_instances(&query).await?;
    Ok(Json(copies))
}

/// Get a copy
#[utoipa::path(
    get,
    path = "/api/book/bookinstance/{id}/",
    tag = "book",
    security(("token_auth" = [])),
    params(("id" = Uuid, Path, description = "Copy ID")),
    responses(
        (status = 200, description = "Copy", body = BookInstance),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "Copy not found")
    )
)]
pub async fn get_book_instance(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_user): AuthenticatedUser,
    PathParam(id): PathParam<Uuid>,
) -> AppResult<Json<BookInstance>> {
    let copy = state.services.catalog.get_book_instance(id).await?;
    Ok(Json(copy))
}

/// Create a copy of a book
#[utoipa::path(
    post,
    path = "/api/book/bookinstance/",
    tag = "book",
    security(("token_auth" = [])),
    request_body = BookInstancePayload,
    responses(
        (status = 201, description = "Copy created", body = BookInstance),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn create_book_instance(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_user): AuthenticatedUser,
    JsonBody(payload): JsonBody<BookInstancePayload>,
) -> AppResult<(StatusCode, Json<BookInstance>)> {
    let copy = state.services.catalog.create_book_instance(payload).await?;
    Ok((StatusCode::CREATED, Json(copy)))
}

/// Change status, book or borrowers of a copy
#[utoipa::path(
    patch,
    path = "/api/book/bookinstance/{id}/",
    tag = "book",
    security(("token_auth" = [])),
    params(("id" = Uuid, Path, description = "Copy ID")),
    request_body = BookInstancePayload,
    responses(
        (status = 200, description = "Copy updated", body = BookInstance),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "Copy not found")
    )
)]
pub async fn update_book_instance(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_user): AuthenticatedUser,
    PathParam(id): PathParam<Uuid>,
    JsonBody(payload): JsonBody<BookInstancePayload>,
) -> AppResult<Json<BookInstance>> {
    let copy = state.services.catalog.update_book_instance(id, payload).await?;
    Ok(Json(copy))
}

/// Delete a copy
#[utoipa::path(
    delete,
    path = "/api/book/bookinstance/{id}/",
    tag = "book",
    security(("token_auth" = [])),
    params(("id" = Uuid, Path, description = "Copy ID")),
    responses(
        (status = 204, description = "Copy deleted"),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "Copy not found")
    )
)]
pub async fn delete_book_instance(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_user): AuthenticatedUser,
    PathParam(id): PathParam<Uuid>,
) -> AppResult<StatusCode> {
    state.services.catalog.delete_book_instance(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Upload a cover image for a copy
#[utoipa::path(
    post,
    path = "/api/book/bookinstance/{id}/upload-image/",
    tag = "book",
    security(("token_auth" = [])),
    params(("id" = Uuid, Path, description = "Copy ID")),
    request_body(content = crate::models::cover::CoverUpload, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Cover stored", body = CoverImage),
        (status = 400, description = "Not a valid image", body = crate::error::ErrorResponse),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "Copy not found")
    )
)]
pub async fn upload_book_instance_image(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_user): AuthenticatedUser,
    PathParam(id): PathParam<Uuid>,
    multipart: Multipart,
) -> AppResult<Json<CoverImage>> {
    let bytes = read_cover_field(multipart).await?;
    let cover = state
        .services
        .catalog
        .upload_cover(ImageTarget::BookInstance(id), bytes)
        .await?;
    Ok(Json(cover))
}
