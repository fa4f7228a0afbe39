//! Cover images shared by books and book instances

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Entity an uploaded image is attached to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageTarget {
    Book(i32),
    BookInstance(Uuid),
}

impl ImageTarget {
    /// Sub-directory of the media root holding this kind of image
    pub fn directory(&self) -> &'static str {
        match self {
            ImageTarget::Book(_) => "book",
            ImageTarget::BookInstance(_) => "bookinstance",
        }
    }

    pub fn id(&self) -> EntityId {
        match *self {
            ImageTarget::Book(id) => EntityId::Int(id),
            ImageTarget::BookInstance(id) => EntityId::Uuid(id),
        }
    }
}

impl std::fmt::Display for ImageTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImageTarget::Book(id) => write!(f, "book {}", id),
            ImageTarget::BookInstance(id) => write!(f, "book instance {}", id),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum EntityId {
    Int(i32),
    Uuid(Uuid),
}

/// Image form returned by the upload endpoints
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CoverImage {
    pub id: EntityId,
    /// Public URL of the stored image
    pub cover: Option<String>,
}

/// Multipart body of the upload endpoints (OpenAPI only)
#[derive(ToSchema)]
#[allow(dead_code)]
pub struct CoverUpload {
    #[schema(value_type = String, format = Binary)]
    pub cover: Vec<u8>,
}
