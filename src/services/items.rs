//! Items service: listing, ownership, search and comments

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use super::ensure_user;
use crate::{
    error::{AppError, AppResult},
    models::{
        booking::{BookingDetails, BookingResponse},
        comment::{CommentResponse, CreateComment},
        item::{CreateItem, Item, ItemResponse, UpdateItem},
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct ItemsService {
    repository: Repository,
}

/// Last finished and next upcoming booking among APPROVED ones
pub fn nearest_bookings(
    bookings: &[BookingDetails],
    now: DateTime<Utc>,
) -> (Option<BookingDetails>, Option<BookingDetails>) {
    let last = bookings
        .iter()
        .filter(|b| b.booking.end < now)
        .max_by_key(|b| b.booking.end)
        .cloned();
    let next = bookings
        .iter()
        .filter(|b| b.booking.start > now)
        .min_by_key(|b| b.booking.start)
        .cloned();
    (last, next)
}

impl ItemsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn create(&self, owner_id: i64, data: &CreateItem) -> AppResult<ItemResponse> {
        ensure_user(&self.repository, owner_id).await?;

        if let Some(request_id) = data.request_id {
            if !self.repository.requests.exists(request_id).await? {
                return Err(AppError::NotFound(format!(
                    "ItemRequest with id {} not found",
                    request_id
                )));
            }
        }

        let item = self.repository.items.create(owner_id, data).await?;
        tracing::info!(item_id = item.id, user_id = owner_id, "Item created");
        Ok(item.into())
    }

    /// Partial update by the owner
    pub async fn update(
        &self,
        item_id: i64,
        user_id: i64,
        data: &UpdateItem,
    ) -> AppResult<ItemResponse> {
        self.owned_item(item_id, user_id).await?;

        let item = self.repository.items.update(item_id, data).await?;
        tracing::info!(item_id, user_id, "Item updated");
        Ok(item.into())
    }

    /// Item with comments; booking neighbours only for its owner
    pub async fn get(&self, item_id: i64, user_id: i64) -> AppResult<ItemResponse> {
        tracing::debug!(item_id, user_id, "Fetching item");
        let item = self.repository.items.get_by_id(item_id).await?;

        let comments = self
            .repository
            .comments
            .list_by_items(&[item_id])
            .await?
            .into_iter()
            .map(CommentResponse::from)
            .collect();

        let is_owner = item.owner_id == user_id;
        let mut response = ItemResponse::from(item).with_comments(comments);

        if is_owner {
            let bookings = self
                .repository
                .bookings
                .list_approved_for_items(&[item_id])
                .await?;
            let (last, next) = nearest_bookings(&bookings, Utc::now());
            response = response.with_bookings(
                last.map(BookingResponse::from),
                next.map(BookingResponse::from),
            );
        }

        Ok(response)
    }

    /// Owner's items, with comments and bookings fetched in one batch each
    pub async fn list_by_owner(&self, owner_id: i64) -> AppResult<Vec<ItemResponse>> {
        ensure_user(&self.repository, owner_id).await?;

        let items = self.repository.items.list_by_owner(owner_id).await?;
        if items.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<i64> = items.iter().map(|i| i.id).collect();

        let mut comments: HashMap<i64, Vec<CommentResponse>> = HashMap::new();
        for comment in self.repository.comments.list_by_items(&ids).await? {
            comments
                .entry(comment.comment.item_id)
                .or_default()
                .push(comment.into());
        }

        let mut bookings: HashMap<i64, Vec<BookingDetails>> = HashMap::new();
        for booking in self.repository.bookings.list_approved_for_items(&ids).await? {
            bookings
                .entry(booking.booking.item_id)
                .or_default()
                .push(booking);
        }

        let now = Utc::now();
        tracing::debug!(user_id = owner_id, count = items.len(), "Listing owner items");

        Ok(items
            .into_iter()
            .map(|item| {
                let id = item.id;
                let (last, next) = bookings
                    .get(&id)
                    .map(|b| nearest_bookings(b, now))
                    .unwrap_or((None, None));
                ItemResponse::from(item)
                    .with_comments(comments.remove(&id).unwrap_or_default())
                    .with_bookings(
                        last.map(BookingResponse::from),
                        next.map(BookingResponse::from),
                    )
            })
            .collect())
    }

    pub async fn delete(&self, item_id: i64, user_id: i64) -> AppResult<()> {
        self.owned_item(item_id, user_id).await?;

        self.repository.items.delete(item_id).await?;
        tracing::info!(item_id, user_id, "Item deleted");
        Ok(())
    }

    /// Available items matching `text`; blank text finds nothing
    pub async fn search(&self, text: Option<&str>) -> AppResult<Vec<ItemResponse>> {
        let text = match text {
            Some(t) if !t.trim().is_empty() => t,
            _ => return Ok(Vec::new()),
        };

        tracing::debug!(text, "Searching items");
        let items = self.repository.items.search(text).await?;
        Ok(items.into_iter().map(ItemResponse::from).collect())
    }

    /// Only users with a finished APPROVED booking of the item may comment
    pub async fn create_comment(
        &self,
        item_id: i64,
        author_id: i64,
        data: &CreateComment,
    ) -> AppResult<CommentResponse> {
        self.repository.items.get_by_id(item_id).await?;
        ensure_user(&self.repository, author_id).await?;

        let now = Utc::now();
        if !self
            .repository
            .bookings
            .has_finished_booking(author_id, item_id, now)
            .await?
        {
            return Err(AppError::Validation(format!(
                "User with id {} has no finished booking of item {}",
                author_id, item_id
            )));
        }

        let comment = self
            .repository
            .comments
            .create(item_id, author_id, &data.text, now)
            .await?;
        tracing::info!(
            comment_id = comment.comment.id,
            item_id,
            user_id = author_id,
            "Comment created"
        );
        Ok(comment.into())
    }

    /// Load an item the caller must own
    async fn owned_item(&self, item_id: i64, user_id: i64) -> AppResult<Item> {
        let item = self.repository.items.get_by_id(item_id).await?;
        ensure_user(&self.repository, user_id).await?;

        if item.owner_id != user_id {
            return Err(AppError::Conflict(format!(
                "User with id {} is not the owner of item {}",
                user_id, item_id
            )));
        }
        Ok(item)
    }
}
