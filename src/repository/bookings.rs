//! Bookings repository for database operations

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, Pool, Postgres};

use super::BookingsStore;
use crate::{
    error::{AppError, AppResult},
    models::{
        booking::{Booking, BookingDetails, BookingParty, BookingState, BookingStatus, NewBooking},
        item::Item,
        user::User,
    },
};

/// Booking joined with its item and booker
const BOOKING_SELECT: &str = r#"
    SELECT b.id, b.start_date, b.end_date, b.item_id, b.booker_id, b.status,
           i.name AS item_name, i.description AS item_description,
           i.available AS item_available, i.owner_id AS item_owner_id,
           i.request_id AS item_request_id,
           u.name AS booker_name, u.email AS booker_email
    FROM bookings b
    JOIN items i ON b.item_id = i.id
    JOIN users u ON b.booker_id = u.id
"#;

#[derive(FromRow)]
struct BookingRow {
    id: i64,
    start_date: DateTime<Utc>,
    end_date: DateTime<Utc>,
    item_id: i64,
    booker_id: i64,
    status: BookingStatus,
    item_name: String,
    item_description: String,
    item_available: bool,
    item_owner_id: i64,
    item_request_id: Option<i64>,
    booker_name: String,
    booker_email: String,
}

impl From<BookingRow> for BookingDetails {
    fn from(row: BookingRow) -> Self {
        Self {
            booking: Booking {
                id: row.id,
                start: row.start_date,
                end: row.end_date,
                item_id: row.item_id,
                booker_id: row.booker_id,
                status: row.status,
            },
            item: Item {
                id: row.item_id,
                name: row.item_name,
                description: row.item_description,
                available: row.item_available,
                owner_id: row.item_owner_id,
                request_id: row.item_request_id,
            },
            booker: User {
                id: row.booker_id,
                name: row.booker_name,
                email: row.booker_email,
            },
        }
    }
}

/// Extra WHERE condition of a state filter and the value bound to `$2`
enum StateBind {
    None,
    Now(DateTime<Utc>),
    Status(BookingStatus),
}

fn state_condition(state: BookingState, now: DateTime<Utc>) -> (&'static str, StateBind) {
    match state {
        BookingState::All => ("", StateBind::None),
        BookingState::Current => (
            " AND b.start_date <= $2 AND b.end_date > $2",
            StateBind::Now(now),
        ),
        BookingState::Past => (" AND b.end_date < $2", StateBind::Now(now)),
        BookingState::Future => (" AND b.start_date > $2", StateBind::Now(now)),
        BookingState::Waiting => (
            " AND b.status = $2",
            StateBind::Status(BookingStatus::Waiting),
        ),
        BookingState::Rejected => (
            " AND b.status = $2",
            StateBind::Status(BookingStatus::Rejected),
        ),
    }
}

#[derive(Clone)]
pub struct BookingsRepository {
    pool: Pool<Postgres>,
}

impl BookingsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookingsStore for BookingsRepository {
    async fn get_by_id(&self, id: i64) -> AppResult<BookingDetails> {
        sqlx::query_as::<_, BookingRow>(&format!("{} WHERE b.id = $1", BOOKING_SELECT))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(BookingDetails::from)
            .ok_or_else(|| AppError::NotFound(format!("Booking with id {} not found", id)))
    }

    async fn create(&self, data: &NewBooking) -> AppResult<BookingDetails> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO bookings (start_date, end_date, item_id, booker_id, status)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(data.start)
        .bind(data.end)
        .bind(data.item_id)
        .bind(data.booker_id)
        .bind(data.status)
        .fetch_one(&self.pool)
        .await?;

        self.get_by_id(id).await
    }

    async fn update_status(&self, id: i64, status: BookingStatus) -> AppResult<BookingDetails> {
        let result = sqlx::query("UPDATE bookings SET status = $1 WHERE id = $2")
            .bind(status)
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Booking with id {} not found", id)));
        }

        self.get_by_id(id).await
    }

    async fn list(
        &self,
        party: BookingParty,
        state: BookingState,
        now: DateTime<Utc>,
    ) -> AppResult<Vec<BookingDetails>> {
        let (party_condition, party_id) = match party {
            BookingParty::Booker(id) => ("b.booker_id = $1", id),
            BookingParty::Owner(id) => ("i.owner_id = $1", id),
        };
        let (state_condition, state_bind) = state_condition(state, now);

        let sql = format!(
            "{} WHERE {}{} ORDER BY b.start_date DESC",
            BOOKING_SELECT, party_condition, state_condition
        );

        let query = sqlx::query_as::<_, BookingRow>(&sql).bind(party_id);
        let query = match state_bind {
            StateBind::None => query,
            StateBind::Now(now) => query.bind(now),
            StateBind::Status(status) => query.bind(status),
        };

        let rows = query.fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(BookingDetails::from).collect())
    }

    async fn list_approved_for_items(&self, item_ids: &[i64]) -> AppResult<Vec<BookingDetails>> {
        if item_ids.is_empty() {
            return Ok(Vec::new());
        }
        let rows = sqlx::query_as::<_, BookingRow>(&format!(
            "{} WHERE b.item_id = ANY($1) AND b.status = $2 ORDER BY b.start_date",
            BOOKING_SELECT
        ))
        .bind(item_ids)
        .bind(BookingStatus::Approved)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(BookingDetails::from).collect())
    }

    async fn has_finished_booking(
        &self,
        booker_id: i64,
        item_id: i64,
        now: DateTime<Utc>,
    ) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM bookings
                WHERE booker_id = $1 AND item_id = $2 AND status = $3 AND end_date < $4
            )
            "#,
        )
        .bind(booker_id)
        .bind(item_id)
        .bind(BookingStatus::Approved)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }
}
