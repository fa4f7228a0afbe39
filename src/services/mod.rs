//! Business logic services

pub mod catalog;
pub mod media;
pub mod users;

use crate::{config::MediaConfig, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub repository: Repository,
    pub users: users::UsersService,
    pub catalog: catalog::CatalogService,
    pub media: media::MediaService,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository, media_config: MediaConfig) -> Self {
        let media = media::MediaService::new(media_config);
        Self {
            users: users::UsersService::new(repository.clone()),
            catalog: catalog::CatalogService::new(repository.clone(), media.clone()),
            media,
            repository,
        }
    }
}
