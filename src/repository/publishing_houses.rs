//! Publishing houses

use super::{map_constraint_error, Repository};
use crate::{
    error::{AppError, AppResult},
    models::publishing_house::{CreatePublishingHouse, PublishingHouse},
};

impl Repository {
    pub async fn publishing_houses_list(&self, assigned_only: bool) -> AppResult<Vec<PublishingHouse>> {
        let rows = sqlx::query_as::<_, PublishingHouse>(
            r#"
            SELECT p.*
            FROM publishing_houses p
            WHERE NOT $1 OR EXISTS (SELECT 1 FROM books b WHERE b.publishing_house_id = p.id)
            ORDER BY p.name
            "#,
        )
        .bind(assigned_only)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn publishing_houses_get_by_id(&self, id: i32) -> AppResult<PublishingHouse> {
        sqlx::query_as::<_, PublishingHouse>("SELECT * FROM publishing_houses WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Publishing house {} not found", id)))
    }

    pub async fn publishing_houses_exists(&self, id: i32) -> AppResult<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM publishing_houses WHERE id = $1)")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    pub async fn publishing_houses_name_exists(&self, name: &str) -> AppResult<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM publishing_houses WHERE name = $1)")
                .bind(name)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    pub async fn publishing_houses_create(
        &self,
        data: &CreatePublishingHouse,
    ) -> AppResult<PublishingHouse> {
        sqlx::query_as::<_, PublishingHouse>(
            "INSERT INTO publishing_houses (name) VALUES ($1) RETURNING *",
        )
        .bind(&data.name)
        .fetch_one(&self.pool)
        .await
        .map_err(map_constraint_error)
    }
}
