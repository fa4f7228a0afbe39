//! Data models for Bookcase

pub mod author;
pub mod book;
pub mod book_instance;
pub mod cover;
pub mod genre;
pub mod isbn;
pub mod publishing_house;
pub mod query;
pub mod user;

// Re-export commonly used types
pub use author::Author;
pub use book::{Book, BookDetail};
pub use book_instance::{BookInstance, BookStatus};
pub use cover::{CoverImage, ImageTarget};
pub use genre::Genre;
pub use publishing_house::PublishingHouse;
pub use user::{User, UserProfile};
