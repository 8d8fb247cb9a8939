//! Item request endpoints

use axum::{extract::State, http::StatusCode, Json};

use crate::{
    error::AppResult,
    models::request::{CreateItemRequest, ItemRequestResponse},
};

use super::{AppPath, SharerUser, ValidatedJson};

/// Ask for an item nobody lists yet
#[utoipa::path(
    post,
    path = "/requests",
    tag = "requests",
    params(("X-Sharer-User-Id" = i64, Header, description = "Requester ID")),
    request_body = CreateItemRequest,
    responses(
        (status = 201, description = "Request created", body = ItemRequestResponse),
        (status = 404, description = "Requester not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_request(
    State(state): State<crate::AppState>,
    SharerUser(user_id): SharerUser,
    ValidatedJson(data): ValidatedJson<CreateItemRequest>,
) -> AppResult<(StatusCode, Json<ItemRequestResponse>)> {
    let request = state.services.requests.create(user_id, &data).await?;
    Ok((StatusCode::CREATED, Json(request)))
}

/// Get a request with the items answering it
#[utoipa::path(
    get,
    path = "/requests/{id}",
    tag = "requests",
    params(
        ("id" = i64, Path, description = "Request ID"),
        ("X-Sharer-User-Id" = i64, Header, description = "Acting user ID")
    ),
    responses(
        (status = 200, description = "Request details", body = ItemRequestResponse),
        (status = 404, description = "Request not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_request(
    State(state): State<crate::AppState>,
    SharerUser(user_id): SharerUser,
    AppPath(id): AppPath<i64>,
) -> AppResult<Json<ItemRequestResponse>> {
    let request = state.services.requests.get(id, user_id).await?;
    Ok(Json(request))
}

/// The caller's own requests
#[utoipa::path(
    get,
    path = "/requests",
    tag = "requests",
    params(("X-Sharer-User-Id" = i64, Header, description = "Requester ID")),
    responses(
        (status = 200, description = "Requests, newest first", body = Vec<ItemRequestResponse>)
    )
)]
pub async fn list_own_requests(
    State(state): State<crate::AppState>,
    SharerUser(user_id): SharerUser,
) -> AppResult<Json<Vec<ItemRequestResponse>>> {
    let requests = state.services.requests.list_by_user(user_id).await?;
    Ok(Json(requests))
}

/// Requests made by other users
#[utoipa::path(
    get,
    path = "/requests/all",
    tag = "requests",
    params(("X-Sharer-User-Id" = i64, Header, description = "Acting user ID")),
    responses(
        (status = 200, description = "Requests, newest first", body = Vec<ItemRequestResponse>)
    )
)]
pub async fn list_other_requests(
    State(state): State<crate::AppState>,
    SharerUser(user_id): SharerUser,
) -> AppResult<Json<Vec<ItemRequestResponse>>> {
    let requests = state.services.requests.list_other_users(user_id).await?;
    Ok(Json(requests))
}
