//! Genres

use super::Repository;
use crate::{
    error::AppResult,
    models::genre::{CreateGenre, Genre},
};

impl Repository {
    /// List genres by name, descending; optionally only those attached to a book
    pub async fn genres_list(&self, assigned_only: bool) -> AppResult<Vec<Genre>> {
        let rows = sqlx::query_as::<_, Genre>(
            r#"
            SELECT g.*
            FROM genres g
            WHERE NOT $1 OR EXISTS (SELECT 1 FROM book_genres bg WHERE bg.genre_id = g.id)
            ORDER BY g.name DESC, g.id
            "#,
        )
        .bind(assigned_only)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Genres attached to a book
    pub async fn genres_for_book(&self, book_id: i32) -> AppResult<Vec<Genre>> {
        let rows = sqlx::query_as::<_, Genre>(
            r#"
            SELECT g.*
            FROM genres g
            JOIN book_genres bg ON bg.genre_id = g.id
            WHERE bg.book_id = $1
            ORDER BY g.id
            "#,
        )
        .bind(book_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Return those of `ids` that do not match any genre
    pub async fn genres_missing_ids(&self, ids: &[i32]) -> AppResult<Vec<i32>> {
        let missing: Vec<i32> = sqlx::query_scalar(
            r#"
            SELECT wanted.id
            FROM UNNEST($1::int[]) AS wanted(id)
            WHERE NOT EXISTS (SELECT 1 FROM genres g WHERE g.id = wanted.id)
            ORDER BY wanted.id
            "#,
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(missing)
    }

    pub async fn genres_create(&self, data: &CreateGenre) -> AppResult<Genre> {
        let row = sqlx::query_as::<_, Genre>("INSERT INTO genres (name) VALUES ($1) RETURNING *")
            .bind(&data.name)
            .fetch_one(&self.pool)
            .await?;
        Ok(row)
    }
}
