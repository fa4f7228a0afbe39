//! Book model: flat (write/list) form, detail form, and request types

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};

use super::{
    author::Author, genre::Genre, isbn, publishing_house::PublishingHouse, query::parse_id_list,
};
use crate::error::{AppError, AppResult, FieldErrors};

const REQUIRED: &str = "This field is required.";
const BLANK: &str = "This field may not be blank.";

/// Book with relations as bare ids. Used for list, create and update responses.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    pub id: i32,
    pub name: String,
    /// Author id
    pub author: i32,
    /// Publishing house id
    pub publishing_house: i32,
    pub summary: String,
    pub number_of_pages: i32,
    pub isbn: String,
    #[schema(value_type = String, format = Date)]
    pub year_of_publish: NaiveDate,
    /// Genre ids
    pub genre: Vec<i32>,
    #[serde(skip)]
    pub cover: Option<String>,
    #[serde(skip)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Book with relations expanded. Returned by single-book retrieval.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BookDetail {
    pub id: i32,
    pub name: String,
    pub author: Author,
    pub publishing_house: PublishingHouse,
    pub summary: String,
    pub number_of_pages: i32,
    pub isbn: String,
    #[schema(value_type = String, format = Date)]
    pub year_of_publish: NaiveDate,
    pub genre: Vec<Genre>,
}

impl BookDetail {
    pub fn from_parts(
        book: Book,
        author: Author,
        publishing_house: PublishingHouse,
        genre: Vec<Genre>,
    ) -> Self {
        Self {
            id: book.id,
            name: book.name,
            author,
            publishing_house,
            summary: book.summary,
            number_of_pages: book.number_of_pages,
            isbn: book.isbn,
            year_of_publish: book.year_of_publish,
            genre,
        }
    }
}

/// Create / update request. Every field is optional at the wire level so that
/// partial updates and field-level error reporting share one type.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct BookPayload {
    pub name: Option<String>,
    pub author: Option<i32>,
    pub publishing_house: Option<i32>,
    pub summary: Option<String>,
    pub number_of_pages: Option<i32>,
    pub isbn: Option<String>,
    #[schema(value_type = Option<String>, format = Date)]
    pub year_of_publish: Option<NaiveDate>,
    pub genre: Option<Vec<i32>>,
}

/// Fully validated book ready for insertion
#[derive(Debug, Clone)]
pub struct NewBook {
    pub name: String,
    pub author: i32,
    pub publishing_house: i32,
    pub summary: String,
    pub number_of_pages: i32,
    pub isbn: String,
    pub year_of_publish: NaiveDate,
    pub genre: Vec<i32>,
}

impl BookPayload {
    /// Trim text fields, reduce the ISBN to its bare digits and drop duplicate genre ids
    pub fn normalized(mut self) -> Self {
        self.name = self.name.map(|s| s.trim().to_string());
        // Unparseable values are kept as given so `check` reports them
        self.isbn = self.isbn.map(|s| {
            let trimmed = s.trim();
            isbn::normalize(trimmed)
                .filter(|digits| !digits.is_empty())
                .unwrap_or_else(|| trimmed.to_string())
        });
        if let Some(genre) = self.genre.as_mut() {
            let mut seen = Vec::with_capacity(genre.len());
            genre.retain(|id| {
                if seen.contains(id) {
                    false
                } else {
                    seen.push(*id);
                    true
                }
            });
        }
        self
    }

    /// Check field syntax. With `partial`, absent fields are left alone;
    /// otherwise every required field must be present.
    pub fn check(&self, partial: bool) -> FieldErrors {
        let mut errors = FieldErrors::new();
        let mut push = |field: &str, message: &str| {
            errors
                .entry(field.to_string())
                .or_default()
                .push(message.to_string());
        };

        match self.name.as_deref() {
            Some("") => push("name", BLANK),
            Some(name) if name.chars().count() > 255 => {
                push("name", "Ensure this field has no more than 255 characters.")
            }
            None if !partial => push("name", REQUIRED),
            _ => {}
        }

        match self.isbn.as_deref() {
            Some("") => push("isbn", BLANK),
            Some(value) if !isbn::is_valid(value) => push("isbn", "Invalid ISBN."),
            None if !partial => push("isbn", REQUIRED),
            _ => {}
        }

        match self.number_of_pages {
            Some(pages) if pages < 0 => {
                push("number_of_pages", "Ensure this value is greater than or equal to 0.")
            }
            None if !partial => push("number_of_pages", REQUIRED),
            _ => {}
        }

        if !partial {
            if self.author.is_none() {
                push("author", REQUIRED);
            }
            if self.publishing_house.is_none() {
                push("publishing_house", REQUIRED);
            }
            if self.year_of_publish.is_none() {
                push("year_of_publish", REQUIRED);
            }
        }

        errors
    }

    /// Convert a complete payload into an insertable book
    pub fn into_new_book(self) -> AppResult<NewBook> {
        let errors = self.check(false);
        if !errors.is_empty() {
            return Err(AppError::Fields(errors));
        }
        let missing = || AppError::Internal("validated book payload is incomplete".to_string());
        Ok(NewBook {
            name: self.name.ok_or_else(missing)?,
            author: self.author.ok_or_else(missing)?,
            publishing_house: self.publishing_house.ok_or_else(missing)?,
            summary: self.summary.unwrap_or_default(),
            number_of_pages: self.number_of_pages.ok_or_else(missing)?,
            isbn: self.isbn.ok_or_else(missing)?,
            year_of_publish: self.year_of_publish.ok_or_else(missing)?,
            genre: self.genre.unwrap_or_default(),
        })
    }
}

/// Raw query parameters of the book listing
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct BookQuery {
    /// Comma-separated genre ids
    pub genre: Option<String>,
    /// Comma-separated author ids
    pub author: Option<String>,
    /// Comma-separated publishing house ids
    pub publishing_house: Option<String>,
}

/// Parsed book listing filter; `None` means unconstrained
#[derive(Debug, Default, Clone, PartialEq)]
pub struct BookFilter {
    pub genre: Option<Vec<i32>>,
    pub author: Option<Vec<i32>>,
    pub publishing_house: Option<Vec<i32>>,
}

impl TryFrom<&BookQuery> for BookFilter {
    type Error = AppError;

    fn try_from(query: &BookQuery) -> AppResult<Self> {
        Ok(Self {
            genre: parse_id_list("genre", query.genre.as_deref())?,
            author: parse_id_list("author", query.author.as_deref())?,
            publishing_house: parse_id_list(
                "publishing_house",
                query.publishing_house.as_deref(),
            )?,
        })
    }
}
