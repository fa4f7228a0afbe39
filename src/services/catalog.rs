//! Catalogue service: attributes, books, copies and their cover images

use uuid::Uuid;
use validator::Validate;

use crate::{
    error::{AppError, AppResult, FieldErrors},
    models::{
        author::{Author, CreateAuthor},
        book::{Book, BookDetail, BookFilter, BookPayload, BookQuery},
        book_instance::{
            BookInstance, BookInstanceFilter, BookInstancePayload, BookInstanceQuery,
        },
        cover::{CoverImage, ImageTarget},
        genre::{CreateGenre, Genre},
        publishing_house::{CreatePublishingHouse, PublishingHouse},
        query::AttributeQuery,
    },
    repository::Repository,
    services::media::MediaService,
};

const REQUIRED: &str = "This field is required.";

fn does_not_exist(id: i32) -> String {
    format!("Invalid pk \"{}\" - object does not exist.", id)
}

fn push_error(errors: &mut FieldErrors, field: &str, message: String) {
    errors.entry(field.to_string()).or_default().push(message);
}

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
    media: MediaService,
}

impl CatalogService {
    pub fn new(repository: Repository, media: MediaService) -> Self {
        Self { repository, media }
    }

    // =========================================================================
    // ATTRIBUTES
    // =========================================================================

    pub async fn list_genres(&self, query: &AttributeQuery) -> AppResult<Vec<Genre>> {
        self.repository.genres_list(query.assigned_only()?).await
    }

    pub async fn create_genre(&self, mut data: CreateGenre) -> AppResult<Genre> {
        data.name = data.name.trim().to_string();
        data.validate()?;
        self.repository.genres_create(&data).await
    }

    pub async fn list_authors(&self, query: &AttributeQuery) -> AppResult<Vec<Author>> {
        self.repository.authors_list(query.assigned_only()?).await
    }

    pub async fn create_author(&self, mut data: CreateAuthor) -> AppResult<Author> {
        data.first_name = data.first_name.trim().to_string();
        data.last_name = data.last_name.trim().to_string();
        data.validate()?;
        self.repository.authors_create(&data).await
    }

    pub async fn list_publishing_houses(
        &self,
        query: &AttributeQuery,
    ) -> AppResult<Vec<PublishingHouse>> {
        self.repository
            .publishing_houses_list(query.assigned_only()?)
            .await
    }

    pub async fn create_publishing_house(
        &self,
        mut data: CreatePublishingHouse,
    ) -> AppResult<PublishingHouse> {
        data.name = data.name.trim().to_string();
        data.validate()?;

        if self.repository.publishing_houses_name_exists(&data.name).await? {
            return Err(AppError::field(
                "name",
                "publishing house with this name already exists.",
            ));
        }

        self.repository.publishing_houses_create(&data).await
    }

    // =========================================================================
    // BOOKS
    // =========================================================================

    pub async fn list_books(&self, query: &BookQuery) -> AppResult<Vec<Book>> {
        let filter = BookFilter::try_from(query)?;
        self.repository.books_list(&filter).await
    }

    /// Single book with author, publishing house and genres expanded
    pub async fn get_book(&self, id: i32) -> AppResult<BookDetail> {
        let book = self.repository.books_get_by_id(id).await?;
        let author = self.repository.authors_get_by_id(book.author).await?;
        let house = self
            .repository
            .publishing_houses_get_by_id(book.publishing_house)
            .await?;
        let genres = self.repository.genres_for_book(id).await?;
        Ok(BookDetail::from_parts(book, author, house, genres))
    }

    pub async fn create_book(&self, payload: BookPayload) -> AppResult<Book> {
        let payload = payload.normalized();
        let mut errors = payload.check(false);
        self.check_book_references(&payload, None, &mut errors).await?;
        if !errors.is_empty() {
            return Err(AppError::Fields(errors));
        }

        let book = self.repository.books_create(&payload.into_new_book()?).await?;
        tracing::info!("Created book id={} isbn={}", book.id, book.isbn);
        Ok(book)
    }

    /// Full (`partial = false`) or partial update of a book
    pub async fn update_book(&self, id: i32, payload: BookPayload, partial: bool) -> AppResult<Book> {
        if !self.repository.books_exists(id).await? {
            return Err(AppError::NotFound(format!("Book with id {} not found", id)));
        }

        let mut payload = payload.normalized();
        let mut errors = payload.check(partial);
        self.check_book_references(&payload, Some(id), &mut errors).await?;
        if !errors.is_empty() {
            return Err(AppError::Fields(errors));
        }

        // A full update without genres clears them
        if !partial && payload.genre.is_none() {
            payload.genre = Some(Vec::new());
        }

        self.repository.books_update(id, &payload).await
    }

    pub async fn delete_book(&self, id: i32) -> AppResult<()> {
        self.repository.books_delete(id).await?;
        tracing::info!("Deleted book id={}", id);
        Ok(())
    }

    /// Existence of referenced rows and ISBN uniqueness
    async fn check_book_references(
        &self,
        payload: &BookPayload,
        exclude_id: Option<i32>,
        errors: &mut FieldErrors,
    ) -> AppResult<()> {
        if let Some(author) = payload.author {
            if !self.repository.authors_exists(author).await? {
                push_error(errors, "author", does_not_exist(author));
            }
        }

        if let Some(house) = payload.publishing_house {
            if !self.repository.publishing_houses_exists(house).await? {
                push_error(errors, "publishing_house", does_not_exist(house));
            }
        }

        if let Some(ref genres) = payload.genre {
            if !genres.is_empty() {
                for missing in self.repository.genres_missing_ids(genres).await? {
                    push_error(errors, "genre", does_not_exist(missing));
                }
            }
        }

        if let Some(ref isbn) = payload.isbn {
            if !errors.contains_key("isbn")
                && self.repository.books_isbn_exists(isbn, exclude_id).await?
            {
                push_error(errors, "isbn", "book with this isbn already exists.".to_string());
            }
        }

        Ok(())
    }

    // =========================================================================
    // BOOK INSTANCES
    // =========================================================================

    pub async fn list_book_instances(&self, query: &BookInstanceQuery) -> AppResult<Vec<BookInstance>> {
        let filter = BookInstanceFilter::try_from(query)?;
        self.repository.book_instances_list(&filter).await
    }

    pub async fn get_book_instance(&self, id: Uuid) -> AppResult<BookInstance> {
        self.repository.book_instances_get_by_id(id).await
    }

    pub async fn create_book_instance(&self, payload: BookInstancePayload) -> AppResult<BookInstance> {
        let payload = payload.normalized();
        let mut errors = FieldErrors::new();
        if payload.book.is_none() {
            push_error(&mut errors, "book", REQUIRED.to_string());
        }
        self.check_instance_references(&payload, &mut errors).await?;
        if !errors.is_empty() {
            return Err(AppError::Fields(errors));
        }

        let book = payload
            .book
            .ok_or_else(|| AppError::Internal("validated copy payload has no book".to_string()))?;
        let users = payload.user.unwrap_or_default();
        let copy = self
            .repository
            .book_instances_create(book, payload.status.unwrap_or_default(), &users)
            .await?;

        tracing::info!("Created copy {} of book id={}", copy.id, copy.book);
        Ok(copy)
    }

    pub async fn update_book_instance(
        &self,
        id: Uuid,
        payload: BookInstancePayload,
    ) -> AppResult<BookInstance> {
        // 404 before reporting field errors
        self.repository.book_instances_get_by_id(id).await?;

        let payload = payload.normalized();
        let mut errors = FieldErrors::new();
        self.check_instance_references(&payload, &mut errors).await?;
        if !errors.is_empty() {
            return Err(AppError::Fields(errors));
        }
        self.repository.book_instances_update(id, &payload).await
    }

    pub async fn delete_book_instance(&self, id: Uuid) -> AppResult<()> {
        self.repository.book_instances_delete(id).await
    }

    async fn check_instance_references(
        &self,
        payload: &BookInstancePayload,
        errors: &mut FieldErrors,
    ) -> AppResult<()> {
        if let Some(book) = payload.book {
            if !self.repository.books_exists(book).await? {
                push_error(errors, "book", does_not_exist(book));
            }
        }

        if let Some(ref users) = payload.user {
            if !users.is_empty() {
                for missing in self.repository.users_missing_ids(users).await? {
                    push_error(errors, "user", does_not_exist(missing));
                }
            }
        }

        Ok(())
    }

    // =========================================================================
    // COVERS
    // =========================================================================

    /// Store an uploaded image and attach it to a book or a copy
    pub async fn upload_cover(&self, target: ImageTarget, bytes: Vec<u8>) -> AppResult<CoverImage> {
        // 404 before touching the disk
        match target {
            ImageTarget::Book(id) => {
                if !self.repository.books_exists(id).await? {
                    return Err(AppError::NotFound(format!("Book with id {} not found", id)));
                }
            }
            ImageTarget::BookInstance(id) => {
                self.repository.book_instances_get_by_id(id).await?;
            }
        }

        let relative = self.media.store_image(target, bytes).await?;

        match target {
            ImageTarget::Book(id) => self.repository.books_set_cover(id, &relative).await?,
            ImageTarget::BookInstance(id) => {
                self.repository.book_instances_set_cover(id, &relative).await?
            }
        }

        Ok(CoverImage {
            id: target.id(),
            cover: Some(self.media.public_url(&relative)),
        })
    }
}
