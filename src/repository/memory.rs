//! In-memory implementation of every store (for development/testing)

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use super::{BookingsStore, CommentsStore, ItemsStore, RequestsStore, UsersStore};
use crate::{
    error::{AppError, AppResult},
    models::{
        booking::{Booking, BookingDetails, BookingParty, BookingState, BookingStatus, NewBooking},
        comment::{Comment, CommentDetails},
        item::{CreateItem, Item, UpdateItem},
        request::ItemRequest,
        user::{CreateUser, UpdateUser, User},
    },
};

#[derive(Debug, Default)]
struct Tables {
    users: BTreeMap<i64, User>,
    items: BTreeMap<i64, Item>,
    bookings: BTreeMap<i64, Booking>,
    requests: BTreeMap<i64, ItemRequest>,
    comments: BTreeMap<i64, Comment>,
    last_id: i64,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }

    fn booking_details(&self, booking: &Booking) -> AppResult<BookingDetails> {
        let item = self.items.get(&booking.item_id).cloned().ok_or_else(|| {
            AppError::Internal(format!("Booking {} references a missing item", booking.id))
        })?;
        let booker = self.users.get(&booking.booker_id).cloned().ok_or_else(|| {
            AppError::Internal(format!("Booking {} references a missing user", booking.id))
        })?;
        Ok(BookingDetails {
            booking: booking.clone(),
            item,
            booker,
        })
    }

    fn comment_details(&self, comment: &Comment) -> AppResult<CommentDetails> {
        let author = self.users.get(&comment.author_id).ok_or_else(|| {
            AppError::Internal(format!("Comment {} references a missing user", comment.id))
        })?;
        Ok(CommentDetails {
            comment: comment.clone(),
            author_name: author.name.clone(),
        })
    }

    fn delete_item_cascade(&mut self, item_id: i64) {
        self.items.remove(&item_id);
        self.bookings.retain(|_, b| b.item_id != item_id);
        self.comments.retain(|_, c| c.item_id != item_id);
    }

    fn delete_request_cascade(&mut self, request_id: i64) {
        self.requests.remove(&request_id);
        for item in self.items.values_mut() {
            if item.request_id == Some(request_id) {
                item.request_id = None;
            }
        }
    }
}

/// Tables shared by all the store traits, guarded by one lock
#[derive(Debug, Default, Clone)]
pub struct InMemoryRepository {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UsersStore for InMemoryRepository {
    async fn get_by_id(&self, id: i64) -> AppResult<User> {
        let tables = self.tables.read().await;
        tables
            .users
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("User with id {} not found", id)))
    }

    async fn exists(&self, id: i64) -> AppResult<bool> {
        Ok(self.tables.read().await.users.contains_key(&id))
    }

    async fn list(&self) -> AppResult<Vec<User>> {
        Ok(self.tables.read().await.users.values().cloned().collect())
    }

    async fn email_exists(&self, email: &str, exclude_id: Option<i64>) -> AppResult<bool> {
        let tables = self.tables.read().await;
        let email = email.to_lowercase();
        Ok(tables
            .users
            .values()
            .any(|u| Some(u.id) != exclude_id && u.email.to_lowercase() == email))
    }

    async fn create(&self, data: &CreateUser) -> AppResult<User> {
        let mut tables = self.tables.write().await;
        let email = data.email().to_string();

        // Mirrors the unique index on LOWER(email)
        let lowered = email.to_lowercase();
        if tables.users.values().any(|u| u.email.to_lowercase() == lowered) {
            return Err(AppError::Conflict(format!("Email {} is already registered", email)));
        }

        let user = User {
            id: tables.next_id(),
            name: data.name.clone(),
            email,
        };
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn update(&self, id: i64, data: &UpdateUser) -> AppResult<User> {
        let mut tables = self.tables.write().await;
        let user = tables
            .users
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("User with id {} not found", id)))?;

        if let Some(name) = &data.name {
            user.name = name.clone();
        }
        if let Some(email) = &data.email {
            user.email = email.clone();
        }
        Ok(user.clone())
    }

    async fn delete(&self, id: i64) -> AppResult<()> {
        let mut tables = self.tables.write().await;
        if tables.users.remove(&id).is_none() {
            return Err(AppError::NotFound(format!("User with id {} not found", id)));
        }

        let owned: Vec<i64> = tables
            .items
            .values()
            .filter(|i| i.owner_id == id)
            .map(|i| i.id)
            .collect();
        for item_id in owned {
            tables.delete_item_cascade(item_id);
        }

        let requested: Vec<i64> = tables
            .requests
            .values()
            .filter(|r| r.requester_id == id)
            .map(|r| r.id)
            .collect();
        for request_id in requested {
            tables.delete_request_cascade(request_id);
        }

        tables.bookings.retain(|_, b| b.booker_id != id);
        tables.comments.retain(|_, c| c.author_id != id);
        Ok(())
    }
}

#[async_trait]
impl ItemsStore for InMemoryRepository {
    async fn get_by_id(&self, id: i64) -> AppResult<Item> {
        let tables = self.tables.read().await;
        tables
            .items
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Item with id {} not found", id)))
    }

    async fn create(&self, owner_id: i64, data: &CreateItem) -> AppResult<Item> {
        let mut tables = self.tables.write().await;
        let item = Item {
            id: tables.next_id(),
            name: data.name.clone(),
            description: data.description.clone(),
            available: data.available.unwrap_or(false),
            owner_id,
            request_id: data.request_id,
        };
        tables.items.insert(item.id, item.clone());
        Ok(item)
    }

    async fn update(&self, id: i64, data: &UpdateItem) -> AppResult<Item> {
        let mut tables = self.tables.write().await;
        let item = tables
            .items
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("Item with id {} not found", id)))?;

        if let Some(name) = &data.name {
            item.name = name.clone();
        }
        if let Some(description) = &data.description {
            item.description = description.clone();
        }
        if let Some(available) = data.available {
            item.available = available;
        }
        Ok(item.clone())
    }

    async fn delete(&self, id: i64) -> AppResult<()> {
        let mut tables = self.tables.write().await;
        if !tables.items.contains_key(&id) {
            return Err(AppError::NotFound(format!("Item with id {} not found", id)));
        }
        tables.delete_item_cascade(id);
        Ok(())
    }

    async fn list_by_owner(&self, owner_id: i64) -> AppResult<Vec<Item>> {
        let tables = self.tables.read().await;
        Ok(tables
            .items
            .values()
            .filter(|i| i.owner_id == owner_id)
            .cloned()
            .collect())
    }

    async fn search(&self, text: &str) -> AppResult<Vec<Item>> {
        let tables = self.tables.read().await;
        let needle = text.to_lowercase();
        Ok(tables
            .items
            .values()
            .filter(|i| {
                i.available
                    && (i.name.to_lowercase().contains(&needle)
                        || i.description.to_lowercase().contains(&needle))
            })
            .cloned()
            .collect())
    }

    async fn list_by_request_ids(&self, request_ids: &[i64]) -> AppResult<Vec<Item>> {
        let tables = self.tables.read().await;
        Ok(tables
            .items
            .values()
            .filter(|i| i.request_id.is_some_and(|r| request_ids.contains(&r)))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl BookingsStore for InMemoryRepository {
    async fn get_by_id(&self, id: i64) -> AppResult<BookingDetails> {
        let tables = self.tables.read().await;
        let booking = tables
            .bookings
            .get(&id)
            .ok_or_else(|| AppError::NotFound(format!("Booking with id {} not found", id)))?;
        tables.booking_details(booking)
    }

    async fn create(&self, data: &NewBooking) -> AppResult<BookingDetails> {
        let mut tables = self.tables.write().await;

        // Mirrors the bookings_window_check constraint
        if data.start >= data.end {
            return Err(AppError::Validation(
                "Start date must be before end date".to_string(),
            ));
        }

        let booking = Booking {
            id: tables.next_id(),
            start: data.start,
            end: data.end,
            item_id: data.item_id,
            booker_id: data.booker_id,
            status: data.status,
        };
        let details = tables.booking_details(&booking)?;
        tables.bookings.insert(booking.id, booking);
        Ok(details)
    }

    async fn update_status(&self, id: i64, status: BookingStatus) -> AppResult<BookingDetails> {
        let mut tables = self.tables.write().await;
        let booking = tables
            .bookings
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("Booking with id {} not found", id)))?;
        booking.status = status;
        let booking = booking.clone();
        tables.booking_details(&booking)
    }

    async fn list(
        &self,
        party: BookingParty,
        state: BookingState,
        now: DateTime<Utc>,
    ) -> AppResult<Vec<BookingDetails>> {
        let tables = self.tables.read().await;

        let mut result = tables
            .bookings
            .values()
            .filter(|b| state.matches(b, now))
            .map(|b| tables.booking_details(b))
            .filter(|d| match (d, party) {
                (Ok(d), BookingParty::Booker(id)) => d.booking.booker_id == id,
                (Ok(d), BookingParty::Owner(id)) => d.owner_id() == id,
                (Err(_), _) => true,
            })
            .collect::<AppResult<Vec<_>>>()?;

        result.sort_by(|a, b| b.booking.start.cmp(&a.booking.start));
        Ok(result)
    }

    async fn list_approved_for_items(&self, item_ids: &[i64]) -> AppResult<Vec<BookingDetails>> {
        let tables = self.tables.read().await;

        let mut result = tables
            .bookings
            .values()
            .filter(|b| b.status == BookingStatus::Approved && item_ids.contains(&b.item_id))
            .map(|b| tables.booking_details(b))
            .collect::<AppResult<Vec<_>>>()?;

        result.sort_by(|a, b| a.booking.start.cmp(&b.booking.start));
        Ok(result)
    }

    async fn has_finished_booking(
        &self,
        booker_id: i64,
        item_id: i64,
        now: DateTime<Utc>,
    ) -> AppResult<bool> {
        let tables = self.tables.read().await;
        Ok(tables.bookings.values().any(|b| {
            b.booker_id == booker_id
                && b.item_id == item_id
                && b.status == BookingStatus::Approved
                && b.end < now
        }))
    }
}

#[async_trait]
impl RequestsStore for InMemoryRepository {
    async fn get_by_id(&self, id: i64) -> AppResult<ItemRequest> {
        let tables = self.tables.read().await;
        tables
            .requests
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("ItemRequest with id {} not found", id)))
    }

    async fn exists(&self, id: i64) -> AppResult<bool> {
        Ok(self.tables.read().await.requests.contains_key(&id))
    }

    async fn create(
        &self,
        requester_id: i64,
        description: &str,
        created: DateTime<Utc>,
    ) -> AppResult<ItemRequest> {
        let mut tables = self.tables.write().await;
        let request = ItemRequest {
            id: tables.next_id(),
            description: description.to_string(),
            requester_id,
            created,
        };
        tables.requests.insert(request.id, request.clone());
        Ok(request)
    }

    async fn list_by_requester(&self, requester_id: i64) -> AppResult<Vec<ItemRequest>> {
        let tables = self.tables.read().await;
        let mut result: Vec<ItemRequest> = tables
            .requests
            .values()
            .filter(|r| r.requester_id == requester_id)
            .cloned()
            .collect();
        result.sort_by(|a, b| b.created.cmp(&a.created).then(b.id.cmp(&a.id)));
        Ok(result)
    }

    async fn list_excluding_requester(&self, requester_id: i64) -> AppResult<Vec<ItemRequest>> {
        let tables = self.tables.read().await;
        let mut result: Vec<ItemRequest> = tables
            .requests
            .values()
            .filter(|r| r.requester_id != requester_id)
            .cloned()
            .collect();
        result.sort_by(|a, b| b.created.cmp(&a.created).then(b.id.cmp(&a.id)));
        Ok(result)
    }
}

#[async_trait]
impl CommentsStore for InMemoryRepository {
    async fn create(
        &self,
        item_id: i64,
        author_id: i64,
        text: &str,
        created: DateTime<Utc>,
    ) -> AppResult<CommentDetails> {
        let mut tables = self.tables.write().await;
        let comment = Comment {
            id: tables.next_id(),
            text: text.to_string(),
            item_id,
            author_id,
            created,
        };
        let details = tables.comment_details(&comment)?;
        tables.comments.insert(comment.id, comment);
        Ok(details)
    }

    async fn list_by_items(&self, item_ids: &[i64]) -> AppResult<Vec<CommentDetails>> {
        let tables = self.tables.read().await;
        let mut result = tables
            .comments
            .values()
            .filter(|c| item_ids.contains(&c.item_id))
            .map(|c| tables.comment_details(c))
            .collect::<AppResult<Vec<_>>>()?;
        result.sort_by(|a, b| {
            a.comment
                .created
                .cmp(&b.comment.created)
                .then(a.comment.id.cmp(&b.comment.id))
        });
        Ok(result)
    }
}
