//! User model and related types

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use super::not_blank;

/// User model from database
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct User {
    pub id: i64,
    pub name: String,
    /// Unique, compared case-insensitively
    pub email: String,
}

/// Create user request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateUser {
    #[validate(custom(function = "not_blank", message = "Name cannot be blank"))]
    pub name: String,
    #[validate(
        required(message = "Email cannot be null"),
        email(message = "Email should be valid")
    )]
    pub email: Option<String>,
}

impl CreateUser {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: Some(email.into()),
        }
    }

    /// Email after validation; empty when absent
    pub fn email(&self) -> &str {
        self.email.as_deref().unwrap_or_default()
    }
}

/// Update user request (only provided fields change)
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateUser {
    #[validate(custom(function = "not_blank", message = "Name cannot be blank"))]
    pub name: Option<String>,
    #[validate(email(message = "Email should be valid"))]
    pub email: Option<String>,
}
