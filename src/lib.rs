//! Bookcase library catalogue server
//!
//! REST JSON API for authors, genres, publishing houses, books and their
//! physical copies, with email-based accounts and token authentication.

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower::Layer;
use tower_http::{
    cors::{Any, CorsLayer},
    normalize_path::{NormalizePath, NormalizePathLayer},
    services::ServeDir,
    trace::TraceLayer,
};

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}

/// Create the application router with all routes
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let body_limit = state.config.media.max_upload_bytes;
    let media_prefix = format!("/{}", state.config.media.url_prefix.trim_matches('/'));
    let media_files = ServeDir::new(&state.config.media.root);

    // Declared without the trailing slash; requests are normalized below
    let routes = Router::new()
        // Health check
        .route("/health", get(api::health::health_check))
        .route("/ready", get(api::health::readiness_check))
        // User
        .route("/api/user/create", post(api::users::create_user))
        .route("/api/user/token", post(api::users::create_token))
        .route(
            "/api/user/me",
            get(api::users::get_me)
                .patch(api::users::update_me)
                .put(api::users::replace_me),
        )
        // Attributes
        .route(
            "/api/book/genre",
            get(api::genres::list_genres).post(api::genres::create_genre),
        )
        .route(
            "/api/book/author",
            get(api::authors::list_authors).post(api::authors::create_author),
        )
        .route(
            "/api/book/publihouse",
            get(api::publishing_houses::list_publishing_houses)
                .post(api::publishing_houses::create_publishing_house),
        )
        // Books
        .route(
            "/api/book/book",
            get(api::books::list_books).post(api::books::create_book),
        )
        .route(
            "/api/book/book/:id",
            get(api::books::get_book)
                .put(api::books::update_book)
                .patch(api::books::partial_update_book)
                .delete(api::books::delete_book),
        )
        .route(
            "/api/book/book/:id/upload-image",
            post(api::books::upload_book_image),
        )
        // Copies
        .route(
            "/api/book/bookinstance",
            get(api::book_instances::list_book_instances)
                .post(api::book_instances::create_book_instance),
        )
        .route(
            "/api/book/bookinstance/:id",
            get(api::book_instances::get_book_instance)
                .patch(api::book_instances::update_book_instance)
                .delete(api::book_instances::delete_book_instance),
        )
        .route(
            "/api/book/bookinstance/:id/upload-image",
            post(api::book_instances::upload_book_instance_image),
        )
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state);

    // `/path/` and `/path` reach the same handler. Normalization must run
    // before routing, so it wraps the API router instead of being a layer on it.
    let routes: NormalizePath<Router> = NormalizePathLayer::trim_trailing_slash().layer(routes);

    // OpenAPI documentation
    let openapi = api::openapi::create_openapi_router();

    Router::new()
        .merge(openapi)
        .nest_service(&media_prefix, media_files)
        .fallback_service(routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
