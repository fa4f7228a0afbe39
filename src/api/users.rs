//! Registration, token exchange and own-profile endpoints

use axum::{extract::State, http::StatusCode, Json};

use crate::{
    error::AppResult,
    models::user::{CreateUser, TokenRequest, TokenResponse, UpdateProfile, UserProfile},
};

use super::{AuthenticatedUser, JsonBody};

/// Register a new user
#[utoipa::path(
    post,
    path = "/api/user/create/",
    tag = "user",
    request_body = CreateUser,
    responses(
        (status = 201, description = "User created", body = UserProfile),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_user(
    State(state): State<crate::AppState>,
    JsonBody(data): JsonBody<CreateUser>,
) -> AppResult<(StatusCode, Json<UserProfile>)> {
    let profile = state.services.users.register(data).await?;
    Ok((StatusCode::CREATED, Json(profile)))
}

/// Exchange email and password for an auth token
#[utoipa::path(
    post,
    path = "/api/user/token/",
    tag = "user",
    request_body = TokenRequest,
    responses(
        (status = 200, description = "Token issued", body = TokenResponse),
        (status = 400, description = "Missing fields or bad credentials", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_token(
    State(state): State<crate::AppState>,
    JsonBody(request): JsonBody<TokenRequest>,
) -> AppResult<Json<TokenResponse>> {
    let token = state.services.users.obtain_token(request).await?;
    Ok(Json(token))
}

/// Get the caller's profile
#[utoipa::path(
    get,
    path = "/api/user/me/",
    tag = "user",
    security(("token_auth" = [])),
    responses(
        (status = 200, description = "Own profile", body = UserProfile),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn get_me(
    State(state): State<crate::AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> AppResult<Json<UserProfile>> {
    let profile = state.services.users.get_profile(user.id).await?;
    Ok(Json(profile))
}

/// Update the caller's profile (supplied fields only)
#[utoipa::path(
    patch,
    path = "/api/user/me/",
    tag = "user",
    security(("token_auth" = [])),
    request_body = UpdateProfile,
    responses(
        (status = 200, description = "Profile updated", body = UserProfile),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn update_me(
    State(state): State<crate::AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    JsonBody(data): JsonBody<UpdateProfile>,
) -> AppResult<Json<UserProfile>> {
    let profile = state.services.users.update_profile(user.id, data).await?;
    Ok(Json(profile))
}

/// Replace the caller's profile fields
#[utoipa::path(
    put,
    path = "/api/user/me/",
    tag = "user",
    security(("token_auth" = [])),
    request_body = UpdateProfile,
    responses(
        (status = 200, description = "Profile updated", body = UserProfile),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn replace_me(
    state: State<crate::AppState>,
    user: AuthenticatedUser,
    data: JsonBody<UpdateProfile>,
) -> AppResult<Json<UserProfile>> {
    update_me(state, user, data).await
}
