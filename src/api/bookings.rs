//! Booking endpoints: client bookings, guest checkout, token self-service

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::booking::{
        Booking, BookingStats, CancelBookingRequest, CreateBookingRequest, GuestBookingRequest,
        RescheduleRequest,
    },
    services::bookings::parse_giorno,
    AppState,
};

use super::{AuthenticatedUser, MessageResponse};

#[derive(Serialize, ToSchema)]
pub struct BookingResponse {
    pub booking: Booking,
    /// Confirmation email is queued, not awaited
    pub email_sent: String,
}

fn spawn_confirmation_email(state: &AppState, booking: &Booking) {
    let services = state.services.clone();
    let booking = booking.clone();
    tokio::spawn(async move {
        if let Err(e) = services.email.send_booking_confirmation(&booking).await {
            tracing::error!("Failed to send confirmation email: {}", e);
        }
    });
}

/// Create a booking for the authenticated client
#[utoipa::path(
    post,
    path = "/bookings",
    tag = "bookings",
    security(("bearer_auth" = [])),
    request_body = CreateBookingRequest,
    responses(
        (status = 201, description = "Booking created", body = BookingResponse),
        (status = 400, description = "Closed day, invalid slot, or group past end of day"),
        (status = 409, description = "Slot taken or holiday")
    )
)]
pub async fn create_booking(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(request): Json<CreateBookingRequest>,
) -> AppResult<(StatusCode, Json<BookingResponse>)> {
    let giorno = parse_giorno(&request.giorno)?;

    // The caller's own standing decides whether extra slots are reachable
    let privileged = claims.is_admin || state.services.users.is_vip(&claims.sub).await?;

    let booking = state
        .services
        .bookings
        .create_booking(&claims.sub, giorno, &request.ora, request.group_size, privileged)
        .await?;

    spawn_confirmation_email(&state, &booking);

    Ok((
        StatusCode::CREATED,
        Json(BookingResponse {
            booking,
            email_sent: "pending".to_string(),
        }),
    ))
}

/// Bookings of the authenticated client
#[utoipa::path(
    get,
    path = "/bookings",
    tag = "bookings",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "The client's bookings", body = Vec<Booking>)
    )
)]
pub async fn list_my_bookings(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Vec<Booking>>> {
    let bookings = state.services.bookings.user_bookings(&claims.sub).await?;
    Ok(Json(bookings))
}

/// Booking statistics of the authenticated client
#[utoipa::path(
    get,
    path = "/bookings/stats",
    tag = "bookings",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Count and most recent date", body = BookingStats)
    )
)]
pub async fn my_booking_stats(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<BookingStats>> {
    let stats = state.services.bookings.user_stats(&claims.sub).await?;
    Ok(Json(stats))
}

/// Cancel one of the client's own bookings, addressed by slot
#[utoipa::path(
    delete,
    path = "/bookings",
    tag = "bookings",
    security(("bearer_auth" = [])),
    request_body = CancelBookingRequest,
    responses(
        (status = 200, description = "Booking cancelled", body = MessageResponse),
        (status = 403, description = "Booking belongs to another client"),
        (status = 404, description = "No booking at that slot")
    )
)]
pub async fn cancel_booking(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(request): Json<CancelBookingRequest>,
) -> AppResult<Json<MessageResponse>> {
    let giorno = parse_giorno(&request.giorno)?;
    state
        .services
        .bookings
        .cancel_booking(giorno, &request.ora, &claims.sub)
        .await?;

    Ok(Json(MessageResponse {
        message: "Booking cancelled".to_string(),
    }))
}

/// Guest checkout: book without an account.
/// Unknown emails get a silent passwordless guest profile.
#[utoipa::path(
    post,
    path = "/bookings/guest",
    tag = "bookings",
    request_body = GuestBookingRequest,
    responses(
        (status = 201, description = "Booking created", body = BookingResponse),
        (status = 400, description = "Missing profile fields or invalid slot"),
        (status = 409, description = "Slot taken or holiday")
    )
)]
pub async fn guest_booking(
    State(state): State<AppState>,
    Json(request): Json<GuestBookingRequest>,
) -> AppResult<(StatusCode, Json<BookingResponse>)> {
    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;
    let giorno = parse_giorno(&request.giorno)?;

    let user = state
        .services
        .users
        .ensure_guest_profile(&request.nome, &request.cognome, &request.email)
        .await?;

    // Guests never hold VIP standing at creation; existing profiles may
    let privileged = user.vip;
    let booking = state
        .services
        .bookings
        .create_booking(&user.email, giorno, &request.ora, request.group_size, privileged)
        .await?;

    spawn_confirmation_email(&state, &booking);

    Ok((
        StatusCode::CREATED,
        Json(BookingResponse {
            booking,
            email_sent: "pending".to_string(),
        }),
    ))
}

/// Look up a booking by its self-service token
#[utoipa::path(
    get,
    path = "/bookings/manage/{token}",
    tag = "bookings",
    params(
        ("token" = String, Path, description = "Self-service booking token")
    ),
    responses(
        (status = 200, description = "The booking", body = Booking),
        (status = 404, description = "Unknown token")
    )
)]
pub async fn get_booking_by_token(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> AppResult<Json<Booking>> {
    let booking = state.services.bookings.booking_by_token(&token).await?;
    Ok(Json(booking))
}

/// Reschedule via token; refused within 24 hours of the appointment
#[utoipa::path(
    put,
    path = "/bookings/manage/{token}",
    tag = "bookings",
    params(
        ("token" = String, Path, description = "Self-service booking token")
    ),
    request_body = RescheduleRequest,
    responses(
        (status = 200, description = "Booking rescheduled", body = Booking),
        (status = 404, description = "Unknown token"),
        (status = 409, description = "Destination taken or holiday"),
        (status = 422, description = "Inside the 24-hour lock window")
    )
)]
pub async fn update_booking_by_token(
    State(state): State<AppState>,
    Path(token): Path<String>,
    Json(request): Json<RescheduleRequest>,
) -> AppResult<Json<Booking>> {
    let booking = state
        .services
        .bookings
        .update_booking_by_token(
            &token,
            request.new_giorno.as_deref(),
            request.new_ora.as_deref(),
        )
        .await?;
    Ok(Json(booking))
}

/// Cancel via token; refused within 24 hours of the appointment
#[utoipa::path(
    delete,
    path = "/bookings/manage/{token}",
    tag = "bookings",
    params(
        ("token" = String, Path, description = "Self-service booking token")
    ),
    responses(
        (status = 200, description = "Booking cancelled", body = MessageResponse),
        (status = 404, description = "Unknown token"),
        (status = 422, description = "Inside the 24-hour lock window")
    )
)]
pub async fn cancel_booking_by_token(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> AppResult<Json<MessageResponse>> {
    state.services.bookings.cancel_booking_by_token(&token).await?;
    Ok(Json(MessageResponse {
        message: "Booking cancelled".to_string(),
    }))
}
