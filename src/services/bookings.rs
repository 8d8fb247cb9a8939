//! Bookings service: creation, owner decisions and listings

use chrono::{DateTime, Utc};

use super::ensure_user;
use crate::{
    error::{AppError, AppResult},
    models::booking::{
        BookingParty, BookingResponse, BookingState, BookingStatus, CreateBooking, NewBooking,
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct BookingsService {
    repository: Repository,
}

impl BookingsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Request to book an item; the booking starts out WAITING
    pub async fn create(&self, booker_id: i64, data: &CreateBooking) -> AppResult<BookingResponse> {
        ensure_user(&self.repository, booker_id).await?;
        let item = self.repository.items.get_by_id(data.item_id).await?;

        if item.owner_id == booker_id {
            return Err(AppError::Validation(
                "Owner cannot book their own item".to_string(),
            ));
        }
        if !item.available {
            return Err(AppError::Validation(format!(
                "Item with id {} is not available",
                item.id
            )));
        }

        let (start, end) = match (data.start, data.end) {
            (Some(start), Some(end)) => (start, end),
            _ => {
                return Err(AppError::Validation(
                    "Start and end dates are required".to_string(),
                ))
            }
        };
        if start >= end {
            return Err(AppError::Validation(
                "Start date must be before end date".to_string(),
            ));
        }

        let booking = self
            .repository
            .bookings
            .create(&NewBooking {
                item_id: item.id,
                booker_id,
                start,
                end,
                status: BookingStatus::Waiting,
            })
            .await?;

        tracing::info!(
            booking_id = booking.booking.id,
            item_id = item.id,
            user_id = booker_id,
            "Booking created"
        );
        Ok(booking.into())
    }

    /// Owner approves or rejects a booking; a decided booking may be decided again
    pub async fn decide(
        &self,
        booking_id: i64,
        owner_id: i64,
        approved: bool,
    ) -> AppResult<BookingResponse> {
        let booking = self.repository.bookings.get_by_id(booking_id).await?;

        if booking.owner_id() != owner_id {
            return Err(AppError::Validation(format!(
                "User with id {} is not the owner of item {}",
                owner_id, booking.item.id
            )));
        }

        let status = BookingStatus::from_decision(approved);
        let booking = self
            .repository
            .bookings
            .update_status(booking_id, status)
            .await?;

        tracing::info!(booking_id, user_id = owner_id, %status, "Booking decided");
        Ok(booking.into())
    }

    /// Visible to the booker and the item owner only
    pub async fn get(&self, booking_id: i64, user_id: i64) -> AppResult<BookingResponse> {
        tracing::debug!(booking_id, user_id, "Fetching booking");
        let booking = self.repository.bookings.get_by_id(booking_id).await?;

        if !booking.is_party(user_id) {
            return Err(AppError::Validation(format!(
                "User with id {} is neither booker nor owner of booking {}",
                user_id, booking_id
            )));
        }

        Ok(booking.into())
    }

    pub async fn list_by_booker(
        &self,
        booker_id: i64,
        state: BookingState,
    ) -> AppResult<Vec<BookingResponse>> {
        self.list(BookingParty::Booker(booker_id), state, Utc::now())
            .await
    }

    /// Bookings on items the user owns
    pub async fn list_by_owner(
        &self,
        owner_id: i64,
        state: BookingState,
    ) -> AppResult<Vec<BookingResponse>> {
        self.list(BookingParty::Owner(owner_id), state, Utc::now())
            .await
    }

    async fn list(
        &self,
        party: BookingParty,
        state: BookingState,
        now: DateTime<Utc>,
    ) -> AppResult<Vec<BookingResponse>> {
        let user_id = match party {
            BookingParty::Booker(id) | BookingParty::Owner(id) => id,
        };
        ensure_user(&self.repository, user_id).await?;

        tracing::debug!(user_id, ?party, ?state, "Listing bookings");
        let bookings = self.repository.bookings.list(party, state, now).await?;
        Ok(bookings.into_iter().map(BookingResponse::from).collect())
    }
}
