//! OpenAPI documentation

use axum::Router;
use utoipa::{
    openapi::security::{ApiKey, ApiKeyValue, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{authors, book_instances, books, genres, health, publishing_houses, users};

/// Registers the `Authorization: Token <key>` scheme
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "token_auth",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new("Authorization"))),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Bookcase API",
        version = "1.0.0",
        description = "Library catalogue REST API: authors, genres, publishing houses, books and their copies"
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // User
        users::create_user,
        users::create_token,
        users::get_me,
        users::update_me,
        users::replace_me,
        // Attributes
        genres::list_genres,
        genres::create_genre,
        authors::list_authors,
        authors::create_author,
        publishing_houses::list_publishing_houses,
        publishing_houses::create_publishing_house,
        // Books
        books::list_books,
        books::get_book,
        books::create_book,
        books::update_book,
        books::partial_update_book,
        books::delete_book,
        books::upload_book_image,
        // Copies
        book_instances::list_book_instances,
        book_instances::get_book_instance,
        book_instances::create_book_instance,
        book_instances::update_book_instance,
        book_instances::delete_book_instance,
        book_instances::upload_book_instance_image,
    ),
    components(
        schemas(
            // User
            crate::models::user::CreateUser,
            crate::models::user::UpdateProfile,
            crate::models::user::UserProfile,
            crate::models::user::TokenRequest,
            crate::models::user::TokenResponse,
            // Catalogue
            crate::models::genre::Genre,
            crate::models::genre::CreateGenre,
            crate::models::author::Author,
            crate::models::author::CreateAuthor,
            crate::models::publishing_house::PublishingHouse,
            crate::models::publishing_house::CreatePublishingHouse,
            crate::models::book::Book,
            crate::models::book::BookDetail,
            crate::models::book::BookPayload,
            crate::models::book_instance::BookInstance,
            crate::models::book_instance::BookInstancePayload,
            crate::models::book_instance::BookStatus,
            crate::models::cover::CoverImage,
            crate::models::cover::CoverUpload,
            crate::models::cover::EntityId,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "user", description = "Registration, tokens and own profile"),
        (name = "book", description = "Catalogue management")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
