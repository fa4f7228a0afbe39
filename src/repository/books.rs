//! Books repository: listing with filters, CRUD, and genre links

use sqlx::{Postgres, QueryBuilder};

use super::{map_constraint_error, Repository};
use crate::{
    error::{AppError, AppResult},
    models::book::{Book, BookFilter, BookPayload, NewBook},
};

/// Flat book row; genre ids are aggregated from the link table
const BOOK_SELECT: &str = r#"
    SELECT b.id, b.name,
           b.author_id AS author,
           b.publishing_house_id AS publishing_house,
           b.summary, b.number_of_pages, b.isbn, b.year_of_publish,
           ARRAY(
               SELECT bg.genre_id FROM book_genres bg
               WHERE bg.book_id = b.id
               ORDER BY bg.genre_id
           ) AS genre,
           b.cover, b.created_at, b.updated_at
    FROM books b
"#;

impl Repository {
    // =========================================================================
    // READ
    // =========================================================================

    /// List books, newest first. Each supplied filter narrows the result (AND);
    /// ids within one filter are alternatives (OR).
    pub async fn books_list(&self, filter: &BookFilter) -> AppResult<Vec<Book>> {
        let mut builder = QueryBuilder::<Postgres>::new(BOOK_SELECT);
        builder.push(" WHERE TRUE");

        if let Some(ref genre_ids) = filter.genre {
            builder
                .push(
                    " AND EXISTS (SELECT 1 FROM book_genres fg \
                     WHERE fg.book_id = b.id AND fg.genre_id = ANY(",
                )
                .push_bind(genre_ids.clone())
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

        builder.push(" ORDER BY b.created_at DESC, b.id DESC");

        let books = builder
            .build_query_as::<Book>()
            .fetch_all(&self.pool)
            .await?;

        Ok(books)
    }

    pub async fn books_get_by_id(&self, id: i32) -> AppResult<Book> {
        let query = format!("{} WHERE b.id = $1", BOOK_SELECT);
        sqlx::query_as::<_, Book>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))
    }

    pub async fn books_exists(&self, id: i32) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM books WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    /// Check if an ISBN is already used by another book
    pub async fn books_isbn_exists(&self, isbn: &str, exclude_id: Option<i32>) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM books WHERE isbn = $1 AND ($2::int IS NULL OR id != $2))",
        )
        .bind(isbn)
        .bind(exclude_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    // =========================================================================
    // CREATE
    // =========================================================================

    /// Insert a book and its genre links in one transaction
    pub async fn books_create(&self, book: &NewBook) -> AppResult<Book> {
        let mut tx = self.pool.begin().await?;

        let id: i32 = sqlx::query_scalar(
            r#"
            INSERT INTO books (
                name, summary, number_of_pages, isbn, year_of_publish,
                author_id, publishing_house_id
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id
            "#,
        )
        .bind(&book.name)
        .bind(&book.summary)
        .bind(book.number_of_pages)
        .bind(&book.isbn)
        .bind(book.year_of_publish)
        .bind(book.author)
        .bind(book.publishing_house)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_constraint_error)?;

        if !book.genre.is_empty() {
            sqlx::query("INSERT INTO book_genres (book_id, genre_id) SELECT $1, UNNEST($2::int[])")
                .bind(id)
                .bind(&book.genre)
                .execute(&mut *tx)
                .await
                .map_err(map_constraint_error)?;
        }

        tx.commit().await?;

        self.books_get_by_id(id).await
    }

    // =========================================================================
    // UPDATE
    // =========================================================================

    /// Apply the supplied fields; a supplied `genre` list replaces the links
    pub async fn books_update(&self, id: i32, data: &BookPayload) -> AppResult<Book> {
        let mut tx = self.pool.begin().await?;

        let updated: Option<i32> = sqlx::query_scalar(
            r#"
            UPDATE books SET
                name = COALESCE($2, name),
                summary = COALESCE($3, summary),
                number_of_pages = COALESCE($4, number_of_pages),
                isbn = COALESCE($5, isbn),
                year_of_publish = COALESCE($6, year_of_publish),
                author_id = COALESCE($7, author_id),
                publishing_house_id = COALESCE($8, publishing_house_id),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id
            "#,
        )
        .bind(id)
        .bind(data.name.as_deref())
        .bind(data.summary.as_deref())
        .bind(data.number_of_pages)
        .bind(data.isbn.as_deref())
        .bind(data.year_of_publish)
        .bind(data.author)
        .bind(data.publishing_house)
        .fetch_optional(&mut *tx)
        .await
        .map_err(map_constraint_error)?;

        if updated.is_none() {
            return Err(AppError::NotFound(format!("Book with id {} not found", id)));
        }

        if let Some(ref genre_ids) = data.genre {
            sqlx::query("DELETE FROM book_genres WHERE book_id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?;

            if !genre_ids.is_empty() {
                sqlx::query(
                    "INSERT INTO book_genres (book_id, genre_id) SELECT $1, UNNEST($2::int[])",
                )
                .bind(id)
                .bind(genre_ids)
                .execute(&mut *tx)
                .await
                .map_err(map_constraint_error)?;
            }
        }

        tx.commit().await?;

        self.books_get_by_id(id).await
    }

    /// Store the media path of the book's cover
    pub async fn books_set_cover(&self, id: i32, cover: &str) -> AppResult<()> {
        let result = sqlx::query("UPDATE books SET cover = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(cover)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Book with id {} not found", id)));
        }
        Ok(())
    }

    // =========================================================================
    // DELETE
    // =========================================================================

    /// Delete a book; its copies and genre links go with it
    pub async fn books_delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Book with id {} not found", id)));
        }
        Ok(())
    }
}
