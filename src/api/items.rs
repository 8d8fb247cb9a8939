//! Item endpoints

use axum::{extract::State, http::StatusCode, Json};

use crate::{
    error::AppResult,
    models::{
        comment::{CommentResponse, CreateComment},
        item::{CreateItem, ItemResponse, ItemSearchQuery, UpdateItem},
    },
};

use super::{AppPath, AppQuery, SharerUser, ValidatedJson};

/// List the caller's items
#[utoipa::path(
    get,
    path = "/items",
    tag = "items",
    params(("X-Sharer-User-Id" = i64, Header, description = "Acting user ID")),
    responses(
        (status = 200, description = "Owned items with bookings and comments", body = Vec<ItemResponse>)
    )
)]
pub async fn list_items(
    State(state): State<crate::AppState>,
    SharerUser(user_id): SharerUser,
) -> AppResult<Json<Vec<ItemResponse>>> {
    let items = state.services.items.list_by_owner(user_id).await?;
    Ok(Json(items))
}

/// Get item by ID
#[utoipa::path(
    get,
    path = "/items/{id}",
    tag = "items",
    params(
        ("id" = i64, Path, description = "Item ID"),
        ("X-Sharer-User-Id" = i64, Header, description = "Acting user ID")
    ),
    responses(
        (status = 200, description = "Item details", body = ItemResponse),
        (status = 404, description = "Item not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_item(
    State(state): State<crate::AppState>,
    SharerUser(user_id): SharerUser,
    AppPath(id): AppPath<i64>,
) -> AppResult<Json<ItemResponse>> {
    let item = state.services.items.get(id, user_id).await?;
    Ok(Json(item))
}

/// List an item for lending
#[utoipa::path(
    post,
    path = "/items",
    tag = "items",
    params(("X-Sharer-User-Id" = i64, Header, description = "Acting user ID")),
    request_body = CreateItem,
    responses(
        (status = 201, description = "Item created", body = ItemResponse),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse),
        (status = 404, description = "Owner or request not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_item(
    State(state): State<crate::AppState>,
    SharerUser(user_id): SharerUser,
    ValidatedJson(data): ValidatedJson<CreateItem>,
) -> AppResult<(StatusCode, Json<ItemResponse>)> {
    let item = state.services.items.create(user_id, &data).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

/// Update an owned item
#[utoipa::path(
    patch,
    path = "/items/{id}",
    tag = "items",
    params(
        ("id" = i64, Path, description = "Item ID"),
        ("X-Sharer-User-Id" = i64, Header, description = "Acting user ID")
    ),
    request_body = UpdateItem,
    responses(
        (status = 200, description = "Item updated", body = ItemResponse),
        (status = 409, description = "Caller is not the owner", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_item(
    State(state): State<crate::AppState>,
    SharerUser(user_id): SharerUser,
    AppPath(id): AppPath<i64>,
    ValidatedJson(data): ValidatedJson<UpdateItem>,
) -> AppResult<Json<ItemResponse>> {
    let item = state.services.items.update(id, user_id, &data).await?;
    Ok(Json(item))
}

/// Delete an owned item
#[utoipa::path(
    delete,
    path = "/items/{id}",
    tag = "items",
    params(
        ("id" = i64, Path, description = "Item ID"),
        ("X-Sharer-User-Id" = i64, Header, description = "Acting user ID")
    ),
    responses(
        (status = 204, description = "Item deleted"),
        (status = 409, description = "Caller is not the owner", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_item(
    State(state): State<crate::AppState>,
    SharerUser(user_id): SharerUser,
    AppPath(id): AppPath<i64>,
) -> AppResult<StatusCode> {
    state.services.items.delete(id, user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Search available items by text
#[utoipa::path(
    get,
    path = "/items/search",
    tag = "items",
    params(ItemSearchQuery),
    responses(
        (status = 200, description = "Matching items", body = Vec<ItemResponse>)
    )
)]
pub async fn search_items(
    State(state): State<crate::AppState>,
    AppQuery(query): AppQuery<ItemSearchQuery>,
) -> AppResult<Json<Vec<ItemResponse>>> {
    let items = state.services.items.search(query.text.as_deref()).await?;
    Ok(Json(items))
}

/// Comment on an item after a finished booking
#[utoipa::path(
    post,
    path = "/items/{id}/comment",
    tag = "items",
    params(
        ("id" = i64, Path, description = "Item ID"),
        ("X-Sharer-User-Id" = i64, Header, description = "Acting user ID")
    ),
    request_body = CreateComment,
    responses(
        (status = 201, description = "Comment created", body = CommentResponse),
        (status = 400, description = "No finished booking", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_comment(
    State(state): State<crate::AppState>,
    SharerUser(user_id): SharerUser,
    AppPath(id): AppPath<i64>,
    ValidatedJson(data): ValidatedJson<CreateComment>,
) -> AppResult<(StatusCode, Json<CommentResponse>)> {
    let comment = state.services.items.create_comment(id, user_id, &data).await?;
    Ok((StatusCode::CREATED, Json(comment)))
}
