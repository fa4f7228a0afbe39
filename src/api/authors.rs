//! Author endpoints

use axum::{extract::State, http::StatusCode, Json};

use crate::{
    error::AppResult,
    models::{
        author::{Author, CreateAuthor},
        query::AttributeQuery,
    },
};

use super::{AuthenticatedUser, JsonBody, QueryParams};

/// List authors
#[utoipa::path(
    get,
    path = "/api/book/author/",
    tag = "book",
    security(("token_auth" = [])),
    params(AttributeQuery),
    responses(
        (status = 200, description = "Authors, by last and first name", body = Vec<Author>),
        (status = 400, description = "Invalid query parameter", body = crate::error::ErrorResponse),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_authors(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_user): AuthenticatedUser,
    QueryParams(query): QueryParams<AttributeQuery>,
) -> AppResult<Json<Vec<Author>>> {
    let authors = state.services.catalog.list_authors(&query).await?;
    Ok(Json(authors))
}

/// Create an author
#[utoipa::path(
    post,
    path = "/api/book/author/",
    tag = "book",
    security(("token_auth" = [])),
    request_body = CreateAuthor,
    responses(
        (status = 201, description = "Author created", body = Author),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn create_author(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_user): AuthenticatedUser,
    JsonBody(data): JsonBody<CreateAuthor>,
) -> AppResult<(StatusCode, Json<Author>)> {
    let author = state.services.catalog.create_author(data).await?;
    Ok((StatusCode::CREATED, Json(author)))
}
