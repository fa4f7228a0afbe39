//! Users and auth tokens

use sqlx::Row;

use super::{map_constraint_error, Repository};
use crate::{
    error::{AppError, AppResult},
    models::user::User,
};

impl Repository {
    /// Get user by ID
    pub async fn users_get_by_id(&self, id: i32) -> AppResult<User> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User with id {} not found", id)))
    }

    /// Get user by (normalized) email, the login key
    pub async fn users_get_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    /// Check if email already exists
    pub async fn users_email_exists(&self, email: &str, exclude_id: Option<i32>) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM users WHERE email = $1 AND ($2::int IS NULL OR id != $2))",
        )
        .bind(email)
        .bind(exclude_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    /// Return those of `ids` that do not match any user
    pub async fn users_missing_ids(&self, ids: &[i32]) -> AppResult<Vec<i32>> {
        let missing: Vec<i32> = sqlx::query_scalar(
            r#"
            SELECT wanted.id
            FROM UNNEST($1::int[]) AS wanted(id)
            WHERE NOT EXISTS (SELECT 1 FROM users u WHERE u.id = wanted.id)
            ORDER BY wanted.id
            "#,
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(missing)
    }

    /// Create a new user with an already hashed password
    pub async fn users_create(
        &self,
        email: &str,
        name: &str,
        last_name: &str,
        password_hash: &str,
    ) -> AppResult<User> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, name, last_name, password)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(email)
        .bind(name)
        .bind(last_name)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(map_constraint_error)
    }

    /// Update name, email and/or password; `None` leaves the column untouched
    pub async fn users_update_profile(
        &self,
        id: i32,
        name: Option<&str>,
        email: Option<&str>,
        password_hash: Option<&str>,
    ) -> AppResult<User> {
        sqlx::query_as::<_, User>(
            r#"
            UPDATE users SET
                name = COALESCE($2, name),
                email = COALESCE($3, email),
                password = COALESCE($4, password)
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(email)
        .bind(password_hash)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_constraint_error)?
        .ok_or_else(|| AppError::NotFound(format!("User with id {} not found", id)))
    }

    /// Return the user's token, inserting `candidate` if the user has none yet
    pub async fn users_get_or_create_token(&self, user_id: i32, candidate: &str) -> AppResult<String> {
        sqlx::query(
            r#"
            INSERT INTO auth_tokens (key, user_id)
            VALUES ($1, $2)
            ON CONFLICT (user_id) DO NOTHING
            "#,
        )
        .bind(candidate)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        let row = sqlx::query("SELECT key FROM auth_tokens WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(row.get("key"))
    }

    /// Resolve a token key to its owner
    pub async fn users_get_by_token(&self, key: &str) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT u.*
            FROM auth_tokens t
            JOIN users u ON u.id = t.user_id
            WHERE t.key = $1
            "#,
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }
}
