//! API handlers for Bookcase REST endpoints

pub mod authors;
pub mod book_instances;
pub mod books;
pub mod genres;
pub mod health;
pub mod openapi;
pub mod publishing_houses;
pub mod users;

use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};
use axum_extra::extract::Multipart;

use crate::{
    error::{AppError, AppResult},
    models::user::User,
    AppState,
};

/// Extractor for the user owning the presented token
pub struct AuthenticatedUser(pub User);

/// Key part of an `Authorization: Token <key>` (or `Bearer <key>`) header
pub fn token_from_header(header: &str) -> Option<&str> {
    let (scheme, key) = header.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("token") && !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let key = key.trim();
    if key.is_empty() || key.contains(' ') {
        return None;
    }
    Some(key)
}

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| {
                AppError::Authentication("Authentication credentials were not provided.".to_string())
            })?;

        let key = token_from_header(auth_header).ok_or_else(|| {
            AppError::Authentication("Invalid authorization header format".to_string())
        })?;

        let user = state.services.users.authenticate_token(key).await?;

        Ok(AuthenticatedUser(user))
    }
}

/// JSON body whose rejections are reported as 400 with the standard error body
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct JsonBody<T>(pub T);

/// Query string whose rejections are reported with the standard error body
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct QueryParams<T>(pub T);

/// Path parameters; an id that does not parse names no row and is a 404
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct PathParam<T>(pub T);

/// Read the `cover` file field of an upload form
pub async fn read_cover_field(mut multipart: Multipart) -> AppResult<Vec<u8>> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        if field.name() == Some("cover") {
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(e.to_string()))?;
            return Ok(bytes.to_vec());
        }
    }
    Err(AppError::field("cover", "No file was submitted."))
}
