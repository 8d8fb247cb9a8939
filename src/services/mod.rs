//! Business logic services

pub mod bookings;
pub mod items;
pub mod requests;
pub mod users;

use crate::{error::AppResult, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub users: users::UsersService,
    pub items: items::ItemsService,
    pub bookings: bookings::BookingsService,
    pub requests: requests::RequestsService,
    repository: Repository,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository) -> Self {
        Self {
            users: users::UsersService::new(repository.clone()),
            items: items::ItemsService::new(repository.clone()),
            bookings: bookings::BookingsService::new(repository.clone()),
            requests: requests::RequestsService::new(repository.clone()),
            repository,
        }
    }

    /// Check storage connectivity (readiness probe)
    pub async fn ping(&self) -> AppResult<()> {
        self.repository.ping().await
    }
}

/// NotFound unless the user exists
pub(crate) async fn ensure_user(repository: &Repository, user_id: i64) -> AppResult<()> {
    if !repository.users.exists(user_id).await? {
        return Err(crate::error::AppError::NotFound(format!(
            "User with id {} not found",
            user_id
        )));
    }
    Ok(())
}
