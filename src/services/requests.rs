//! Item requests service

use std::collections::HashMap;

use chrono::Utc;

use super::ensure_user;
use crate::{
    error::AppResult,
    models::{
        item::Item,
        request::{CreateItemRequest, ItemRequest, ItemRequestResponse},
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct RequestsService {
    repository: Repository,
}

impl RequestsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn create(
        &self,
        requester_id: i64,
        data: &CreateItemRequest,
    ) -> AppResult<ItemRequestResponse> {
        ensure_user(&self.repository, requester_id).await?;

        let request = self
            .repository
            .requests
            .create(requester_id, &data.description, Utc::now())
            .await?;
        tracing::info!(request_id = request.id, user_id = requester_id, "Item request created");
        Ok(ItemRequestResponse::new(request, Vec::new()))
    }

    pub async fn get(&self, request_id: i64, user_id: i64) -> AppResult<ItemRequestResponse> {
        ensure_user(&self.repository, user_id).await?;
        let request = self.repository.requests.get_by_id(request_id).await?;

        let items = self
            .repository
            .items
            .list_by_request_ids(&[request_id])
            .await?;
        Ok(ItemRequestResponse::new(request, items))
    }

    /// The user's own requests, newest first
    pub async fn list_by_user(&self, user_id: i64) -> AppResult<Vec<ItemRequestResponse>> {
        ensure_user(&self.repository, user_id).await?;
        let requests = self.repository.requests.list_by_requester(user_id).await?;
        self.with_items(requests).await
    }

    /// Everyone else's requests, newest first
    pub async fn list_other_users(&self, user_id: i64) -> AppResult<Vec<ItemRequestResponse>> {
        ensure_user(&self.repository, user_id).await?;
        let requests = self
            .repository
            .requests
            .list_excluding_requester(user_id)
            .await?;
        self.with_items(requests).await
    }

    async fn with_items(&self, requests: Vec<ItemRequest>) -> AppResult<Vec<ItemRequestResponse>> {
        if requests.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<i64> = requests.iter().map(|r| r.id).collect();
        let mut by_request: HashMap<i64, Vec<Item>> = HashMap::new();
        for item in self.repository.items.list_by_request_ids(&ids).await? {
            if let Some(request_id) = item.request_id {
                by_request.entry(request_id).or_default().push(item);
            }
        }

        Ok(requests
            .into_iter()
            .map(|request| {
                let items = by_request.remove(&request.id).unwrap_or_default();
                ItemRequestResponse::new(request, items)
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        error::AppError,
        models::{item::CreateItem, user::CreateUser},
        repository::{
            MockBookingsStore, MockCommentsStore, MockItemsStore, MockRequestsStore,
            MockUsersStore,
        },
        services::Services,
    };

    fn describe(text: &str) -> CreateItemRequest {
        CreateItemRequest {
            description: text.to_string(),
        }
    }

    fn answering(request_id: i64, name: &str) -> CreateItem {
        CreateItem {
            name: name.to_string(),
            description: format!("{} for lending", name),
            available: Some(true),
            request_id: Some(request_id),
        }
    }

    #[tokio::test]
    async fn test_request_aggregates_linked_items() {
        let services = Services::new(Repository::in_memory());
        let requester = services
            .users
            .create(&CreateUser::new("Requester", "requester@example.com"))
            .await
            .unwrap();
        let owner = services
            .users
            .create(&CreateUser::new("Owner", "owner@example.com"))
            .await
            .unwrap();

        let wanted = services
            .requests
            .create(requester.id, &describe("Need a ladder"))
            .await
            .unwrap();
        assert!(wanted.items.is_empty());
        let unanswered = services
            .requests
            .create(requester.id, &describe("Need a tent"))
            .await
            .unwrap();

        let first = services
            .items
            .create(owner.id, &answering(wanted.id, "Ladder"))
            .await
            .unwrap();
        let second = services
            .items
            .create(owner.id, &answering(wanted.id, "Step ladder"))
            .await
            .unwrap();

        let fetched = services.requests.get(wanted.id, owner.id).await.unwrap();
        let ids: Vec<i64> = fetched.items.iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![first.id, second.id]);
        assert!(fetched.items.iter().all(|i| i.owner_id == owner.id));

        let empty = services.requests.get(unanswered.id, owner.id).await.unwrap();
        assert!(empty.items.is_empty());

        let own = services.requests.list_by_user(requester.id).await.unwrap();
        assert_eq!(
            own.iter().map(|r| r.id).collect::<Vec<_>>(),
            vec![unanswered.id, wanted.id]
        );
        assert_eq!(own.iter().find(|r| r.id == wanted.id).map(|r| r.items.len()), Some(2));

        let others = services.requests.list_other_users(owner.id).await.unwrap();
        assert_eq!(
            others.iter().map(|r| r.id).collect::<Vec<_>>(),
            vec![unanswered.id, wanted.id]
        );
        assert!(services
            .requests
            .list_other_users(requester.id)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_unknown_user_or_request() {
        let services = Services::new(Repository::in_memory());
        assert!(matches!(
            services.requests.create(5, &describe("Need a tent")).await,
            Err(AppError::NotFound(_))
        ));

        let user = services
            .users
            .create(&CreateUser::new("Someone", "someone@example.com"))
            .await
            .unwrap();
        assert!(matches!(
            services.requests.get(999, user.id).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            services.requests.list_by_user(999).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_empty_listing_skips_item_lookup() {
        let mut users = MockUsersStore::new();
        users.expect_exists().returning(|_| Ok(true));
        let mut requests = MockRequestsStore::new();
        requests
            .expect_list_by_requester()
            .times(1)
            .returning(|_| Ok(Vec::new()));
        let mut items = MockItemsStore::new();
        items.expect_list_by_request_ids().never();

        let repository = Repository::from_stores(
            Arc::new(users),
            Arc::new(items),
            Arc::new(MockBookingsStore::new()),
            Arc::new(requests),
            Arc::new(MockCommentsStore::new()),
        );

        let result = RequestsService::new(repository).list_by_user(1).await.unwrap();
        assert!(result.is_empty());
    }
}
