//! Data models for ShareIt

pub mod booking;
pub mod comment;
pub mod item;
pub mod request;
pub mod user;

// Re-export commonly used types
pub use booking::{Booking, BookingDetails, BookingResponse, BookingState, BookingStatus};
pub use comment::{Comment, CommentDetails, CommentResponse};
pub use item::{Item, ItemResponse, ItemSummary};
pub use request::{ItemRequest, ItemRequestResponse, RequestedItem};
pub use user::User;

use validator::ValidationError;

/// Rejects strings that are empty or whitespace only
pub(crate) fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}
