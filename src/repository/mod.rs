//! Repository layer: storage traits and their implementations

pub mod bookings;
pub mod comments;
pub mod items;
pub mod memory;
pub mod requests;
pub mod users;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres};

use crate::{
    error::AppResult,
    models::{
        booking::{BookingDetails, BookingParty, BookingState, BookingStatus, NewBooking},
        comment::CommentDetails,
        item::{CreateItem, Item, UpdateItem},
        request::ItemRequest,
        user::{CreateUser, UpdateUser, User},
    },
};

/// User persistence
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UsersStore: Send + Sync {
    /// Get user by ID, NotFound when absent
    async fn get_by_id(&self, id: i64) -> AppResult<User>;

    async fn exists(&self, id: i64) -> AppResult<bool>;

    /// All users ordered by ID
    async fn list(&self) -> AppResult<Vec<User>>;

    /// Case-insensitive email lookup, optionally ignoring one user
    async fn email_exists(&self, email: &str, exclude_id: Option<i64>) -> AppResult<bool>;

    async fn create(&self, data: &CreateUser) -> AppResult<User>;

    async fn update(&self, id: i64, data: &UpdateUser) -> AppResult<User>;

    /// Delete a user together with everything that depends on them
    async fn delete(&self, id: i64) -> AppResult<()>;
}

/// Item persistence
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ItemsStore: Send + Sync {
    async fn get_by_id(&self, id: i64) -> AppResult<Item>;

    async fn create(&self, owner_id: i64, data: &CreateItem) -> AppResult<Item>;

    async fn update(&self, id: i64, data: &UpdateItem) -> AppResult<Item>;

    async fn delete(&self, id: i64) -> AppResult<()>;

    /// Items owned by a user, ordered by ID
    async fn list_by_owner(&self, owner_id: i64) -> AppResult<Vec<Item>>;

    /// Available items whose name or description contains `text`, ignoring case
    async fn search(&self, text: &str) -> AppResult<Vec<Item>>;

    /// Items linked to any of the given requests
    async fn list_by_request_ids(&self, request_ids: &[i64]) -> AppResult<Vec<Item>>;
}

/// Booking persistence
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookingsStore: Send + Sync {
    async fn get_by_id(&self, id: i64) -> AppResult<BookingDetails>;

    async fn create(&self, data: &NewBooking) -> AppResult<BookingDetails>;

    async fn update_status(&self, id: i64, status: BookingStatus) -> AppResult<BookingDetails>;

    /// Bookings of a booker or an owner in the given state, start descending
    async fn list(
        &self,
        party: BookingParty,
        state: BookingState,
        now: DateTime<Utc>,
    ) -> AppResult<Vec<BookingDetails>>;

    /// APPROVED bookings on any of the given items
    async fn list_approved_for_items(&self, item_ids: &[i64]) -> AppResult<Vec<BookingDetails>>;

    /// Whether the user has an APPROVED booking on the item that ended before `now`
    async fn has_finished_booking(
        &self,
        booker_id: i64,
        item_id: i64,
        now: DateTime<Utc>,
    ) -> AppResult<bool>;
}

/// Item request persistence
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RequestsStore: Send + Sync {
    async fn get_by_id(&self, id: i64) -> AppResult<ItemRequest>;

    async fn exists(&self, id: i64) -> AppResult<bool>;

    async fn create(
        &self,
        requester_id: i64,
        description: &str,
        created: DateTime<Utc>,
    ) -> AppResult<ItemRequest>;

    /// Requests made by the user, newest first
    async fn list_by_requester(&self, requester_id: i64) -> AppResult<Vec<ItemRequest>>;

    /// Requests made by everyone but the user, newest first
    async fn list_excluding_requester(&self, requester_id: i64) -> AppResult<Vec<ItemRequest>>;
}

/// Comment persistence
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CommentsStore: Send + Sync {
    async fn create(
        &self,
        item_id: i64,
        author_id: i64,
        text: &str,
        created: DateTime<Utc>,
    ) -> AppResult<CommentDetails>;

    /// Comments on any of the given items, oldest first
    async fn list_by_items(&self, item_ids: &[i64]) -> AppResult<Vec<CommentDetails>>;
}

/// Main repository struct holding one store per entity
#[derive(Clone)]
pub struct Repository {
    pub users: Arc<dyn UsersStore>,
    pub items: Arc<dyn ItemsStore>,
    pub bookings: Arc<dyn BookingsStore>,
    pub requests: Arc<dyn RequestsStore>,
    pub comments: Arc<dyn CommentsStore>,
    pool: Option<Pool<Postgres>>,
}

impl Repository {
    /// Create a repository backed by PostgreSQL
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            users: Arc::new(users::UsersRepository::new(pool.clone())),
            items: Arc::new(items::ItemsRepository::new(pool.clone())),
            bookings: Arc::new(bookings::BookingsRepository::new(pool.clone())),
            requests: Arc::new(requests::RequestsRepository::new(pool.clone())),
            comments: Arc::new(comments::CommentsRepository::new(pool.clone())),
            pool: Some(pool),
        }
    }

    /// Create a repository keeping everything in process memory
    pub fn in_memory() -> Self {
        let store = Arc::new(memory::InMemoryRepository::new());
        Self {
            users: store.clone(),
            items: store.clone(),
            bookings: store.clone(),
            requests: store.clone(),
            comments: store,
            pool: None,
        }
    }

    /// Assemble a repository from individual stores
    pub fn from_stores(
        users: Arc<dyn UsersStore>,
        items: Arc<dyn ItemsStore>,
        bookings: Arc<dyn BookingsStore>,
        requests: Arc<dyn RequestsStore>,
        comments: Arc<dyn CommentsStore>,
    ) -> Self {
        Self {
            users,
            items,
            bookings,
            requests,
            comments,
            pool: None,
        }
    }

    /// Check that the backing storage answers
    pub async fn ping(&self) -> AppResult<()> {
        if let Some(pool) = &self.pool {
            sqlx::query("SELECT 1").execute(pool).await?;
        }
        Ok(())
    }
}
