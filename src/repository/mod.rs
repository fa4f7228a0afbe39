//! Repository layer for database operations
//!
//! Each submodule adds `impl Repository` methods for one table group,
//! prefixed with the group name (`books_list`, `users_get_by_email`, ...).

pub mod authors;
pub mod book_instances;
pub mod books;
pub mod genres;
pub mod publishing_houses;
pub mod users;

use sqlx::{Pool, Postgres};

use crate::error::{AppError, AppResult};

/// Main repository struct holding database connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Round-trip to the database (readiness check)
    pub async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

/// Map store-level constraint violations onto field errors.
///
/// Uniqueness is checked before writing, but the store has the final word when
/// two writers race; foreign keys likewise when a referenced row vanishes.
pub(crate) fn map_constraint_error(e: sqlx::Error) -> AppError {
    if let Some(db_err) = e.as_database_error() {
        let field_message = match db_err.constraint() {
            Some("users_email_key") => Some(("email", "user with this email already exists.")),
            Some("publishing_houses_name_key") => {
                Some(("name", "publishing house with this name already exists."))
            }
            Some("books_isbn_key") => Some(("isbn", "book with this isbn already exists.")),
            Some("books_author_id_fkey") => Some(("author", "Object does not exist.")),
            Some("books_publishing_house_id_fkey") => {
                Some(("publishing_house", "Object does not exist."))
            }
            Some("book_genres_genre_id_fkey") => Some(("genre", "Object does not exist.")),
            Some("book_instances_book_id_fkey") => Some(("book", "Object does not exist.")),
            Some("book_instance_users_user_id_fkey") => Some(("user", "Object does not exist.")),
            _ => None,
        };
        if let Some((field, message)) = field_message {
            return AppError::field(field, message);
        }
    }
    AppError::Database(e)
}
