//! Genre endpoints

use axum::{extract::State, http::StatusCode, Json};

use crate::{
    error::AppResult,
    models::{
        genre::{CreateGenre, Genre},
        query::AttributeQuery,
    },
};

use super::{AuthenticatedUser, JsonBody, QueryParams};

/// List genres
#[utoipa::path(
    get,
    path = "/api/book/genre/",
    tag = "book",
    security(("token_auth" = [])),
    params(AttributeQuery),
    responses(
        (status = 200, description = "Genres, by name descending", body = Vec<Genre>),
        (status = 400, description = "Invalid query parameter", body = crate::error::ErrorResponse),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_genres(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_user): AuthenticatedUser,
    QueryParams(query): QueryParams<AttributeQuery>,
) -> AppResult<Json<Vec<Genre>>> {
    let genres = state.services.catalog.list_genres(&query).await?;
    Ok(Json(genres))
}

/// Create a genre
#[utoipa::path(
    post,
    path = "/api/book/genre/",
    tag = "book",
    security(("token_auth" = [])),
    request_body = CreateGenre,
    responses(
        (status = 201, description = "Genre created", body = Genre),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn create_genre(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_user): AuthenticatedUser,
    JsonBody(data): JsonBody<CreateGenre>,
) -> AppResult<(StatusCode, Json<Genre>)> {
    let genre = state.services.catalog.create_genre(data).await?;
    Ok((StatusCode::CREATED, Json(genre)))
}
