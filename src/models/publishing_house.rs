//! Publishing house model

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// Publishing house; `name` is unique
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct PublishingHouse {
    pub id: i32,
    pub name: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreatePublishingHouse {
    #[validate(length(min = 1, max = 255, message = "This field may not be blank."))]
    pub name: String,
}
