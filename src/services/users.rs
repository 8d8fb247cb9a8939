//! Users service

use crate::{
    error::{AppError, AppResult},
    models::user::{CreateUser, UpdateUser, User},
    repository::Repository,
};

#[derive(Clone)]
pub struct UsersService {
    repository: Repository,
}

impl UsersService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn list(&self) -> AppResult<Vec<User>> {
        self.repository.users.list().await
    }

    pub async fn get_by_id(&self, id: i64) -> AppResult<User> {
        tracing::debug!(user_id = id, "Fetching user");
        self.repository.users.get_by_id(id).await
    }

    pub async fn create(&self, data: &CreateUser) -> AppResult<User> {
        if self.repository.users.email_exists(data.email(), None).await? {
            return Err(AppError::Conflict(format!(
                "Email {} is already registered",
                data.email()
            )));
        }

        let user = self.repository.users.create(data).await?;
        tracing::info!(user_id = user.id, "User created");
        Ok(user)
    }

    /// Apply a partial update; the new email must not belong to someone else
    pub async fn update(&self, id: i64, data: &UpdateUser) -> AppResult<User> {
        // NotFound wins over Conflict
        self.repository.users.get_by_id(id).await?;

        if let Some(email) = &data.email {
            if self.repository.users.email_exists(email, Some(id)).await? {
                return Err(AppError::Conflict(format!(
                    "Email {} is already registered",
                    email
                )));
            }
        }

        let user = self.repository.users.update(id, data).await?;
        tracing::info!(user_id = id, "User updated");
        Ok(user)
    }

    /// Delete a user with their items, bookings, comments and requests
    pub async fn delete(&self, id: i64) -> AppResult<()> {
        self.repository.users.delete(id).await?;
        tracing::info!(user_id = id, "User deleted");
        Ok(())
    }
}
