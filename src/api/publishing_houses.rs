//! Publishing house endpoints

use axum::{extract::State, http::StatusCode, Json};

use crate::{
    error::AppResult,
    models::{
        publishing_house::{CreatePublishingHouse, PublishingHouse},
        query::AttributeQuery,
    },
};

use super::{AuthenticatedUser, JsonBody, QueryParams};

/// List publishing houses
#[utoipa::path(
    get,
    path = "/api/book/publihouse/",
    tag = "book",
    security(("token_auth" = [])),
    params(AttributeQuery),
    responses(
        (status = 200, description = "Publishing houses, by name", body = Vec<PublishingHouse>),
        (status = 400, description = "Invalid query parameter", body = crate::error::ErrorResponse),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_publishing_houses(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_user): AuthenticatedUser,
    QueryParams(query): QueryParams<AttributeQuery>,
) -> AppResult<Json<Vec<PublishingHouse>>> {
    let houses = state.services.catalog.list_publishing_houses(&query).await?;
    Ok(Json(houses))
}

/// Create a publishing house; names are unique
#[utoipa::path(
    post,
    path = "/api/book/publihouse/",
    tag = "book",
    security(("token_auth" = [])),
    request_body = CreatePublishingHouse,
    responses(
        (status = 201, description = "Publishing house created", body = PublishingHouse),
        (status = 400, description = "Invalid input or duplicate name", body = crate::error::ErrorResponse),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn create_publishing_house(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_user): AuthenticatedUser,
    JsonBody(data): JsonBody<CreatePublishingHouse>,
) -> AppResult<(StatusCode, Json<PublishingHouse>)> {
    let house = state.services.catalog.create_publishing_house(data).await?;
    Ok((StatusCode::CREATED, Json(house)))
}
