//! Authors

use super::Repository;
use crate::{
    error::{AppError, AppResult},
    models::author::{Author, CreateAuthor},
};

impl Repository {
    /// List authors by (last_name, first_name), optionally only those with books
    pub async fn authors_list(&self, assigned_only: bool) -> AppResult<Vec<Author>> {
        let rows = sqlx::query_as::<_, Author>(
            r#"
            SELECT a.*
            FROM authors a
            WHERE NOT $1 OR EXISTS (SELECT 1 FROM books b WHERE b.author_id = a.id)
            ORDER BY a.last_name, a.first_name, a.id
            "#,
        )
        .bind(assigned_only)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn authors_get_by_id(&self, id: i32) -> AppResult<Author> {
        sqlx::query_as::<_, Author>("SELECT * FROM authors WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Author {} not found", id)))
    }

    pub async fn authors_exists(&self, id: i32) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM authors WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    pub async fn authors_create(&self, data: &CreateAuthor) -> AppResult<Author> {
        let row = sqlx::query_as::<_, Author>(
            r#"
            INSERT INTO authors (first_name, last_name)
            VALUES ($1, $2)
            RETURNING *
            "#,
        )
        .bind(&data.first_name)
        .bind(&data.last_name)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }
}
