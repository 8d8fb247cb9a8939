//! Item model and related types

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::{booking::BookingResponse, comment::CommentResponse, not_blank};

/// Item model from database
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Item {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub available: bool,
    pub owner_id: i64,
    /// Item request this item was listed for
    pub request_id: Option<i64>,
}

/// Create item request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateItem {
    #[validate(custom(function = "not_blank", message = "Name cannot be blank"))]
    pub name: String,
    #[validate(custom(function = "not_blank", message = "Description cannot be blank"))]
    pub description: String,
    #[validate(required(message = "Available flag is required"))]
    pub available: Option<bool>,
    pub request_id: Option<i64>,
}

/// Update item request (only provided fields change)
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateItem {
    #[validate(custom(function = "not_blank", message = "Name cannot be blank"))]
    pub name: Option<String>,
    #[validate(custom(function = "not_blank", message = "Description cannot be blank"))]
    pub description: Option<String>,
    pub available: Option<bool>,
}

/// Search query parameters
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ItemSearchQuery {
    /// Text matched against name and description
    pub text: Option<String>,
}

/// Item embedded in a booking
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ItemSummary {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub available: bool,
    pub request_id: Option<i64>,
}

/// Item as returned by the item endpoints
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ItemResponse {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub available: bool,
    pub request_id: Option<i64>,
    pub comments: Vec<CommentResponse>,
    /// Most recently finished approved booking (owner only)
    pub last_booking: Option<BookingResponse>,
    /// Soonest upcoming approved booking (owner only)
    pub next_booking: Option<BookingResponse>,
}

impl From<Item> for ItemSummary {
    fn from(item: Item) -> Self {
        Self {
            id: item.id,
            name: item.name,
            description: item.description,
            available: item.available,
            request_id: item.request_id,
        }
    }
}

impl From<Item> for ItemResponse {
    fn from(item: Item) -> Self {
        Self {
            id: item.id,
            name: item.name,
            description: item.description,
            available: item.available,
            request_id: item.request_id,
            comments: Vec::new(),
            last_booking: None,
            next_booking: None,
        }
    }
}

impl ItemResponse {
    pub fn with_comments(mut self, comments: Vec<CommentResponse>) -> Self {
        self.comments = comments;
        self
    }

    pub fn with_bookings(
        mut self,
        last_booking: Option<BookingResponse>,
        next_booking: Option<BookingResponse>,
    ) -> Self {
        self.last_booking = last_booking;
        self.next_booking = next_booking;
        self
    }
}
