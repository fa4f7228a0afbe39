//! Book instance (physical copy) model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Decode, Encode, FromRow, Postgres};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use super::query::parse_id_list;
use crate::error::{AppError, AppResult};

/// Loan status of a copy. Stored and serialized as a one-letter code.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum BookStatus {
    #[serde(rename = "o")]
    OnLoan,
    #[default]
    #[serde(rename = "a")]
    Available,
    #[serde(rename = "r")]
    Reserved,
}

impl BookStatus {
    pub fn as_code(&self) -> &'static str {
        match self {
            BookStatus::OnLoan => "o",
            BookStatus::Available => "a",
            BookStatus::Reserved => "r",
        }
    }
}

impl std::fmt::Display for BookStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_code())
    }
}

impl std::str::FromStr for BookStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "o" => Ok(BookStatus::OnLoan),
            "a" => Ok(BookStatus::Available),
            "r" => Ok(BookStatus::Reserved),
            _ => Err(format!("Invalid book status: {}", s)),
        }
    }
}

impl sqlx::Type<Postgres> for BookStatus {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<Postgres>>::compatible(ty)
    }
}

impl<'r> Decode<'r, Postgres> for BookStatus {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s: String = Decode::<Postgres>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl Encode<'_, Postgres> for BookStatus {
    fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
        <&str as Encode<Postgres>>::encode(self.as_code(), buf)
    }
}

/// Physical copy of a book
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BookInstance {
    pub id: Uuid,
    /// Book id
    pub book: i32,
    pub status: BookStatus,
    /// Ids of the users borrowing this copy
    pub user: Vec<i32>,
    #[serde(skip)]
    pub cover: Option<String>,
    #[serde(skip)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Create / update request for a copy
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct BookInstancePayload {
    pub book: Option<i32>,
    pub status: Option<BookStatus>,
    pub user: Option<Vec<i32>>,
}

impl BookInstancePayload {
    pub fn normalized(mut self) -> Self {
        if let Some(users) = self.user.as_mut() {
            users.sort_unstable();
            users.dedup();
        }
        self
    }
}

/// Raw query parameters of the copy listing
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct BookInstanceQuery {
    /// Comma-separated book ids
    pub book: Option<String>,
    /// Comma-separated borrower ids
    pub user: Option<String>,
    /// Comma-separated author ids (of the copy's book)
    pub author: Option<String>,
    /// Comma-separated publishing house ids (of the copy's book)
    pub publishing_house: Option<String>,
}

/// Parsed copy listing filter
#[derive(Debug, Default, Clone, PartialEq)]
pub struct BookInstanceFilter {
    pub book: Option<Vec<i32>>,
    pub user: Option<Vec<i32>>,
    pub author: Option<Vec<i32>>,
    pub publishing_house: Option<Vec<i32>>,
}

impl TryFrom<&BookInstanceQuery> for BookInstanceFilter {
    type Error = AppError;

    fn try_from(query: &BookInstanceQuery) -> AppResult<Self> {
        Ok(Self {
            book: parse_id_list("book", query.book.as_deref())?,
            user: parse_id_list("user", query.user.as_deref())?,
            author: parse_id_list("author", query.author.as_deref())?,
            publishing_house: parse_id_list(
                "publishing_house",
                query.publishing_house.as_deref(),
            )?,
        })
    }
}
