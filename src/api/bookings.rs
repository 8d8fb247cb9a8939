//! Booking endpoints

use axum::{extract::State, http::StatusCode, Json};

use crate::{
    error::AppResult,
    models::booking::{BookingResponse, CreateBooking, DecisionQuery, StateQuery},
};

use super::{AppPath, AppQuery, SharerUser, ValidatedJson};

/// Request a booking
#[utoipa::path(
    post,
    path = "/bookings",
    tag = "bookings",
    params(("X-Sharer-User-Id" = i64, Header, description = "Booker ID")),
    request_body = CreateBooking,
    responses(
        (status = 201, description = "Booking created (WAITING)", body = BookingResponse),
        (status = 400, description = "Invalid window or item unavailable", body = crate::error::ErrorResponse),
        (status = 404, description = "Booker or item not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_booking(
    State(state): State<crate::AppState>,
    SharerUser(user_id): SharerUser,
    ValidatedJson(data): ValidatedJson<CreateBooking>,
) -> AppResult<(StatusCode, Json<BookingResponse>)> {
    let booking = state.services.bookings.create(user_id, &data).await?;
    Ok((StatusCode::CREATED, Json(booking)))
}

/// Approve or reject a booking
#[utoipa::path(
    patch,
    path = "/bookings/{id}",
    tag = "bookings",
    params(
        ("id" = i64, Path, description = "Booking ID"),
        ("X-Sharer-User-Id" = i64, Header, description = "Item owner ID"),
        DecisionQuery
    ),
    responses(
        (status = 200, description = "Booking decided", body = BookingResponse),
        (status = 400, description = "Caller is not the owner", body = crate::error::ErrorResponse)
    )
)]
pub async fn decide_booking(
    State(state): State<crate::AppState>,
    SharerUser(user_id): SharerUser,
    AppPath(id): AppPath<i64>,
    AppQuery(query): AppQuery<DecisionQuery>,
) -> AppResult<Json<BookingResponse>> {
    let booking = state
        .services
        .bookings
        .decide(id, user_id, query.approved)
        .await?;
    Ok(Json(booking))
}

/// Get a booking as its booker or item owner
#[utoipa::path(
    get,
    path = "/bookings/{id}",
    tag = "bookings",
    params(
        ("id" = i64, Path, description = "Booking ID"),
        ("X-Sharer-User-Id" = i64, Header, description = "Acting user ID")
    ),
    responses(
        (status = 200, description = "Booking details", body = BookingResponse),
        (status = 404, description = "Booking not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_booking(
    State(state): State<crate::AppState>,
    SharerUser(user_id): SharerUser,
    AppPath(id): AppPath<i64>,
) -> AppResult<Json<BookingResponse>> {
    let booking = state.services.bookings.get(id, user_id).await?;
    Ok(Json(booking))
}

/// Bookings made by the caller
#[utoipa::path(
    get,
    path = "/bookings",
    tag = "bookings",
    params(
        ("X-Sharer-User-Id" = i64, Header, description = "Booker ID"),
        StateQuery
    ),
    responses(
        (status = 200, description = "Bookings, newest start first", body = Vec<BookingResponse>),
        (status = 400, description = "Unknown state", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_bookings(
    State(state): State<crate::AppState>,
    SharerUser(user_id): SharerUser,
    AppQuery(query): AppQuery<StateQuery>,
) -> AppResult<Json<Vec<BookingResponse>>> {
    let bookings = state
        .services
        .bookings
        .list_by_booker(user_id, query.state()?)
        .await?;
    Ok(Json(bookings))
}

/// Bookings on items the caller owns
#[utoipa::path(
    get,
    path = "/bookings/owner",
    tag = "bookings",
    params(
        ("X-Sharer-User-Id" = i64, Header, description = "Owner ID"),
        StateQuery
    ),
    responses(
        (status = 200, description = "Bookings, newest start first", body = Vec<BookingResponse>),
        (status = 400, description = "Unknown state", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_owner_bookings(
    State(state): State<crate::AppState>,
    SharerUser(user_id): SharerUser,
    AppQuery(query): AppQuery<StateQuery>,
) -> AppResult<Json<Vec<BookingResponse>>> {
    let bookings = state
        .services
        .bookings
        .list_by_owner(user_id, query.state()?)
        .await?;
    Ok(Json(bookings))
}
