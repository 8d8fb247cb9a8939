//! Booking model, status and state filters

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Decode, Encode, FromRow, Postgres};
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationError};

use super::{
    item::{Item, ItemSummary},
    user::User,
};
use crate::error::AppError;

/// Booking lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    Waiting,
    Approved,
    Rejected,
    Canceled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Waiting => "WAITING",
            BookingStatus::Approved => "APPROVED",
            BookingStatus::Rejected => "REJECTED",
            BookingStatus::Canceled => "CANCELED",
        }
    }

    /// Status an owner decision moves a booking to
    pub fn from_decision(approved: bool) -> Self {
        if approved {
            BookingStatus::Approved
        } else {
            BookingStatus::Rejected
        }
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for BookingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "WAITING" => Ok(BookingStatus::Waiting),
            "APPROVED" => Ok(BookingStatus::Approved),
            "REJECTED" => Ok(BookingStatus::Rejected),
            "CANCELED" => Ok(BookingStatus::Canceled),
            _ => Err(format!("Invalid booking status: {}", s)),
        }
    }
}

// SQLx conversion for BookingStatus (stored as VARCHAR)
impl sqlx::Type<Postgres> for BookingStatus {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<Postgres>>::compatible(ty)
    }
}

impl<'r> Decode<'r, Postgres> for BookingStatus {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s: String = Decode::<Postgres>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl Encode<'_, Postgres> for BookingStatus {
    fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
        <String as Encode<Postgres>>::encode(self.as_str().to_string(), buf)
    }
}

/// State filter for booking listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingState {
    #[default]
    All,
    /// start <= now < end
    Current,
    /// end < now
    Past,
    /// start > now
    Future,
    Waiting,
    Rejected,
}

impl BookingState {
    /// Whether a booking belongs to this state at instant `now`
    pub fn matches(&self, booking: &Booking, now: DateTime<Utc>) -> bool {
        match self {
            BookingState::All => true,
            BookingState::Current => booking.start <= now && now < booking.end,
            BookingState::Past => booking.end < now,
            BookingState::Future => booking.start > now,
            BookingState::Waiting => booking.status == BookingStatus::Waiting,
            BookingState::Rejected => booking.status == BookingStatus::Rejected,
        }
    }
}

impl std::str::FromStr for BookingState {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "ALL" => Ok(BookingState::All),
            "CURRENT" => Ok(BookingState::Current),
            "PAST" => Ok(BookingState::Past),
            "FUTURE" => Ok(BookingState::Future),
            "WAITING" => Ok(BookingState::Waiting),
            "REJECTED" => Ok(BookingState::Rejected),
            _ => Err(AppError::Validation(format!("Unknown state: {}", s))),
        }
    }
}

/// Booking model from database
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Booking {
    pub id: i64,
    #[sqlx(rename = "start_date")]
    pub start: DateTime<Utc>,
    #[sqlx(rename = "end_date")]
    pub end: DateTime<Utc>,
    pub item_id: i64,
    pub booker_id: i64,
    pub status: BookingStatus,
}

/// Booking joined with the booked item and the booker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingDetails {
    pub booking: Booking,
    pub item: Item,
    pub booker: User,
}

impl BookingDetails {
    pub fn owner_id(&self) -> i64 {
        self.item.owner_id
    }

    /// Booker or item owner
    pub fn is_party(&self, user_id: i64) -> bool {
        self.booking.booker_id == user_id || self.item.owner_id == user_id
    }
}

/// Values for a booking about to be stored
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBooking {
    pub item_id: i64,
    pub booker_id: i64,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub status: BookingStatus,
}

/// Whose bookings a listing returns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingParty {
    Booker(i64),
    /// Bookings on items owned by this user
    Owner(i64),
}

/// Create booking request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_booking_window"))]
pub struct CreateBooking {
    pub item_id: i64,
    #[validate(required(message = "Start date is required"))]
    pub start: Option<DateTime<Utc>>,
    #[validate(required(message = "End date is required"))]
    pub end: Option<DateTime<Utc>>,
}

fn validate_booking_window(booking: &CreateBooking) -> Result<(), ValidationError> {
    let now = Utc::now();

    if let Some(start) = booking.start {
        if start < now {
            let mut error = ValidationError::new("start_in_past");
            error.message = Some("Start date must be present or in the future".into());
            return Err(error);
        }
    }

    if let Some(end) = booking.end {
        if end <= now {
            let mut error = ValidationError::new("end_not_future");
            error.message = Some("End date must be in the future".into());
            return Err(error);
        }
    }

    Ok(())
}

/// Owner decision query parameters
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DecisionQuery {
    pub approved: bool,
}

/// Listing query parameters
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct StateQuery {
    /// ALL, CURRENT, PAST, FUTURE, WAITING or REJECTED (default ALL)
    pub state: Option<String>,
}

impl StateQuery {
    pub fn state(&self) -> Result<BookingState, AppError> {
        match &self.state {
            Some(raw) => raw.parse(),
            None => Ok(BookingState::All),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookingResponse {
    pub id: i64,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub item: ItemSummary,
    pub booker: User,
    pub status: BookingStatus,
}

impl From<BookingDetails> for BookingResponse {
    fn from(details: BookingDetails) -> Self {
        Self {
            id: details.booking.id,
            start: details.booking.start,
            end: details.booking.end,
            item: details.item.into(),
            booker: details.booker,
            status: details.booking.status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn booking(start_offset: i64, end_offset: i64, status: BookingStatus, now: DateTime<Utc>) -> Booking {
        Booking {
            id: 1,
            start: now + Duration::hours(start_offset),
            end: now + Duration::hours(end_offset),
            item_id: 1,
            booker_id: 2,
            status,
        }
    }

    #[test]
    fn test_state_parsing() {
        assert_eq!("all".parse::<BookingState>().unwrap(), BookingState::All);
        assert_eq!("Current".parse::<BookingState>().unwrap(), BookingState::Current);
        assert_eq!("PAST".parse::<BookingState>().unwrap(), BookingState::Past);
        assert_eq!("future".parse::<BookingState>().unwrap(), BookingState::Future);
        assert_eq!("WAITING".parse::<BookingState>().unwrap(), BookingState::Waiting);
        assert_eq!("rejected".parse::<BookingState>().unwrap(), BookingState::Rejected);

        let err = "UNSUPPORTED_STATUS".parse::<BookingState>().unwrap_err();
        assert!(matches!(err, AppError::Validation(msg) if msg == "Unknown state: UNSUPPORTED_STATUS"));
    }

    #[test]
    fn test_time_states_are_disjoint() {
        let now = Utc::now();
        let samples = [
            booking(-48, -24, BookingStatus::Approved, now),
            booking(-1, 1, BookingStatus::Approved, now),
            booking(24, 48, BookingStatus::Waiting, now),
        ];

        for b in &samples {
            let hits = [BookingState::Current, BookingState::Past, BookingState::Future]
                .iter()
                .filter(|s| s.matches(b, now))
                .count();
            assert_eq!(hits, 1);
            assert!(BookingState::All.matches(b, now));
        }
    }

    #[test]
    fn test_current_window_bounds() {
        let now = Utc::now();
        let starts_now = Booking {
            start: now,
            ..booking(0, 2, BookingStatus::Approved, now)
        };
        assert!(BookingState::Current.matches(&starts_now, now));

        let ends_now = Booking {
            end: now,
            ..booking(-2, 0, BookingStatus::Approved, now)
        };
        assert!(!BookingState::Current.matches(&ends_now, now));
        assert!(!BookingState::Past.matches(&ends_now, now));
    }

    #[test]
    fn test_status_states_ignore_time() {
        let now = Utc::now();
        let past_waiting = booking(-48, -24, BookingStatus::Waiting, now);
        let future_rejected = booking(24, 48, BookingStatus::Rejected, now);

        assert!(BookingState::Waiting.matches(&past_waiting, now));
        assert!(!BookingState::Rejected.matches(&past_waiting, now));
        assert!(BookingState::Rejected.matches(&future_rejected, now));
    }

    #[test]
    fn test_create_booking_window_validation() {
        let now = Utc::now();
        let valid = CreateBooking {
            item_id: 1,
            start: Some(now + Duration::days(1)),
            end: Some(now + Duration::days(2)),
        };
        assert!(valid.validate().is_ok());

        let past_start = CreateBooking {
            start: Some(now - Duration::days(1)),
            ..valid.clone()
        };
        assert!(past_start.validate().is_err());

        let missing_end = CreateBooking {
            end: None,
            ..valid
        };
        assert!(missing_end.validate().is_err());
    }
}
