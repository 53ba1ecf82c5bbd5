//! Admin endpoints: calendar management, clients, reports

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::{
    error::AppResult,
    models::{
        booking::{AdminBookingRequest, Booking, CancelBookingRequest, MoveBookingRequest},
        user::PublicUser,
    },
    services::bookings::parse_giorno,
    AppState,
};

use super::{AdminUser, MessageResponse};

#[derive(Serialize, ToSchema)]
pub struct ToggleResponse {
    pub email: String,
    pub enabled: bool,
}

/// One bar of the bookings-per-day report
#[derive(Serialize, ToSchema)]
pub struct DailyCount {
    pub giorno: NaiveDate,
    pub count: i64,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ReportQuery {
    /// "weekly" (7 days, default) or "monthly" (30 days)
    pub period: Option<String>,
}

/// Every booking in the system
#[utoipa::path(
    get,
    path = "/admin/bookings",
    tag = "admin",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All bookings", body = Vec<Booking>),
        (status = 403, description = "Admin access required")
    )
)]
pub async fn list_bookings(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> AppResult<Json<Vec<Booking>>> {
    let bookings = state.services.bookings.all_bookings().await?;
    Ok(Json(bookings))
}

/// Create a booking on a client's behalf.
/// Only the surname and the slot are required; the slot must be free but the
/// day-class and holiday rules are not applied on this path.
#[utoipa::path(
    post,
    path = "/admin/bookings",
    tag = "admin",
    security(("bearer_auth" = [])),
    request_body = AdminBookingRequest,
    responses(
        (status = 201, description = "Booking created", body = Booking),
        (status = 403, description = "Admin access required"),
        (status = 409, description = "Slot taken")
    )
)]
pub async fn create_booking(
    State(state): State<AppState>,
    _admin: AdminUser,
    Json(request): Json<AdminBookingRequest>,
) -> AppResult<(StatusCode, Json<Booking>)> {
    let booking = state.services.bookings.create_admin_booking(&request).await?;
    Ok((StatusCode::CREATED, Json(booking)))
}

/// Cancel any booking by slot, no ownership check
#[utoipa::path(
    delete,
    path = "/admin/bookings",
    tag = "admin",
    security(("bearer_auth" = [])),
    request_body = CancelBookingRequest,
    responses(
        (status = 200, description = "Booking cancelled", body = MessageResponse),
        (status = 404, description = "No booking at that slot")
    )
)]
pub async fn cancel_booking(
    State(state): State<AppState>,
    _admin: AdminUser,
    Json(request): Json<CancelBookingRequest>,
) -> AppResult<Json<MessageResponse>> {
    let giorno = parse_giorno(&request.giorno)?;
    state
        .services
        .bookings
        .admin_cancel_booking(giorno, &request.ora)
        .await?;
    Ok(Json(MessageResponse {
        message: "Booking cancelled".to_string(),
    }))
}

/// Relocate a booking to a free, non-holiday slot
#[utoipa::path(
    put,
    path = "/admin/bookings",
    tag = "admin",
    security(("bearer_auth" = [])),
    request_body = MoveBookingRequest,
    responses(
        (status = 200, description = "Booking moved", body = Booking),
        (status = 404, description = "No booking at the source slot"),
        (status = 409, description = "Destination taken or holiday")
    )
)]
pub async fn move_booking(
    State(state): State<AppState>,
    _admin: AdminUser,
    Json(request): Json<MoveBookingRequest>,
) -> AppResult<Json<Booking>> {
    let old_giorno = parse_giorno(&request.old_giorno)?;
    let new_giorno = parse_giorno(&request.new_giorno)?;
    let booking = state
        .services
        .bookings
        .move_booking(old_giorno, &request.old_ora, new_giorno, &request.new_ora)
        .await?;
    Ok(Json(booking))
}

/// All registered clients
#[utoipa::path(
    get,
    path = "/admin/users",
    tag = "admin",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All clients", body = Vec<PublicUser>),
        (status = 403, description = "Admin access required")
    )
)]
pub async fn list_users(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> AppResult<Json<Vec<PublicUser>>> {
    let users = state.services.users.list().await?;
    Ok(Json(users))
}

/// Toggle a client's VIP (extended hours) privilege
#[utoipa::path(
    put,
    path = "/admin/users/{email}/vip",
    tag = "admin",
    security(("bearer_auth" = [])),
    params(
        ("email" = String, Path, description = "Client email")
    ),
    responses(
        (status = 200, description = "New VIP state", body = ToggleResponse),
        (status = 404, description = "Unknown client")
    )
)]
pub async fn toggle_vip(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(email): Path<String>,
) -> AppResult<Json<ToggleResponse>> {
    let enabled = state.services.users.toggle_vip(&email).await?;
    Ok(Json(ToggleResponse { email, enabled }))
}

/// Toggle a client's banned state
#[utoipa::path(
    put,
    path = "/admin/users/{email}/banned",
    tag = "admin",
    security(("bearer_auth" = [])),
    params(
        ("email" = String, Path, description = "Client email")
    ),
    responses(
        (status = 200, description = "New banned state", body = ToggleResponse),
        (status = 404, description = "Unknown client")
    )
)]
pub async fn toggle_banned(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(email): Path<String>,
) -> AppResult<Json<ToggleResponse>> {
    let enabled = state.services.users.toggle_banned(&email).await?;
    Ok(Json(ToggleResponse { email, enabled }))
}

/// Bookings-per-day report over the trailing week or month
#[utoipa::path(
    get,
    path = "/admin/reports/bookings",
    tag = "admin",
    security(("bearer_auth" = [])),
    params(ReportQuery),
    responses(
        (status = 200, description = "Daily booking counts", body = Vec<DailyCount>)
    )
)]
pub async fn bookings_report(
    State(state): State<AppState>,
    _admin: AdminUser,
    Query(query): Query<ReportQuery>,
) -> AppResult<Json<Vec<DailyCount>>> {
    let days = match query.period.as_deref() {
        Some("monthly") => 30,
        _ => 7,
    };

    let counts = state.services.bookings.daily_counts(days).await?;
    Ok(Json(
        counts
            .into_iter()
            .map(|(giorno, count)| DailyCount { giorno, count })
            .collect(),
    ))
}
