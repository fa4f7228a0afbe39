//! Book instances (copies) and their borrowers

use sqlx::{Postgres, QueryBuilder};
use uuid::Uuid;

use super::{map_constraint_error, Repository};
use crate::{
    error::{AppError, AppResult},
    models::book_instance::{BookInstance, BookInstanceFilter, BookInstancePayload, BookStatus},
};

const INSTANCE_SELECT: &str = r#"
    SELECT bi.id, bi.book_id AS book, bi.status,
           ARRAY(
               SELECT biu.user_id FROM book_instance_users biu
               WHERE biu.book_instance_id = bi.id
               ORDER BY biu.user_id
           ) AS "user",
           bi.cover, bi.created_at
    FROM book_instances bi
    JOIN books b ON b.id = bi.book_id
"#;

impl Repository {
    /// List copies, oldest first, narrowed by every supplied filter
    pub async fn book_instances_list(&self, filter: &BookInstanceFilter) -> AppResult<Vec<BookInstance>> {
        let mut builder = QueryBuilder::<Postgres>::new(INSTANCE_SELECT);
        builder.push(" WHERE TRUE");

        if let Some(ref book_ids) = filter.book {
            builder
                .push(" AND bi.book_id = ANY(")
                .push_bind(book_ids.clone())
                .push(")");
        }

        if let Some(ref user_ids) = filter.user {
            builder
                .push(
                    " AND EXISTS (SELECT 1 FROM book_instance_users fu \
                     WHERE fu.book_instance_id = bi.id AND fu.user_id = ANY(",
                )
                .push_bind(user_ids.clone())
                .push("))");
        }

        if let Some(ref author_ids) = filter.author {
            builder
                .push(" AND b.author_id = ANY(")
                .push_bind(author_ids.clone())
                .push(")");
        }

        if let Some(ref house_ids) = filter.publishing_house {
            builder
                .push(" AND b.publishing_house_id = ANY(")
                .push_bind(house_ids.clone())
                .push(")");
        }

        builder.push(" ORDER BY bi.created_at, bi.id");

        let copies = builder
            .build_query_as::<BookInstance>()
            .fetch_all(&self.pool)
            .await?;

        Ok(copies)
    }

    pub async fn book_instances_get_by_id(&self, id: Uuid) -> AppResult<BookInstance> {
        let query = format!("{} WHERE bi.id = $1", INSTANCE_SELECT);
        sqlx::query_as::<_, BookInstance>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book instance {} not found", id)))
    }

    /// Insert a copy with a fresh random id, plus its borrower links
    pub async fn book_instances_create(
        &self,
        book_id: i32,
        status: BookStatus,
        users: &[i32],
    ) -> AppResult<BookInstance> {
        let id = Uuid::new_v4();
        let mut tx = self.pool.begin().await?;

        sqlx::query("INSERT INTO book_instances (id, book_id, status) VALUES ($1, $2, $3)")
            .bind(id)
            .bind(book_id)
            .bind(status)
            .execute(&mut *tx)
            .await
            .map_err(map_constraint_error)?;

        if !users.is_empty() {
            sqlx::query(
                "INSERT INTO book_instance_users (book_instance_id, user_id) SELECT $1, UNNEST($2::int[])",
            )
            .bind(id)
            .bind(users)
            .execute(&mut *tx)
            .await
            .map_err(map_constraint_error)?;
        }

        tx.commit().await?;

        self.book_instances_get_by_id(id).await
    }

    /// Apply supplied fields; a supplied `user` list replaces the borrowers
    pub async fn book_instances_update(
        &self,
        id: Uuid,
        data: &BookInstancePayload,
    ) -> AppResult<BookInstance> {
        let mut tx = self.pool.begin().await?;

        let updated: Option<Uuid> = sqlx::query_scalar(
            r#"
            UPDATE book_instances SET
                book_id = COALESCE($2, book_id),
                status = COALESCE($3, status)
            WHERE id = $1
            RETURNING id
            "#,
        )
        .bind(id)
        .bind(data.book)
        .bind(data.status)
        .fetch_optional(&mut *tx)
        .await
        .map_err(map_constraint_error)?;

        if updated.is_none() {
            return Err(AppError::NotFound(format!("Book instance {} not found", id)));
        }

        if let Some(ref user_ids) = data.user {
            sqlx::query("DELETE FROM book_instance_users WHERE book_instance_id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?;

            if !user_ids.is_empty() {
                sqlx::query(
                    "INSERT INTO book_instance_users (book_instance_id, user_id) SELECT $1, UNNEST($2::int[])",
                )
                .bind(id)
                .bind(user_ids)
                .execute(&mut *tx)
                .await
                .map_err(map_constraint_error)?;
            }
        }

        tx.commit().await?;

        self.book_instances_get_by_id(id).await
    }

    pub async fn book_instances_set_cover(&self, id: Uuid, cover: &str) -> AppResult<()> {
        let result = sqlx::query("UPDATE book_instances SET cover = $2 WHERE id = $1")
            .bind(id)
            .bind(cover)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Book instance {} not found", id)));
        }
        Ok(())
    }

    pub async fn book_instances_delete(&self, id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM book_instances WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Book instance {} not found", id)));
        }
        Ok(())
    }
}
