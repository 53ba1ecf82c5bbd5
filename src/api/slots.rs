//! Slot availability endpoint

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{error::AppResult, models::slot::SlotStatus, services::bookings::parse_giorno, AppState};

use super::MaybeUser;

#[derive(Serialize, ToSchema)]
pub struct SlotsResponse {
    pub slots: Vec<SlotStatus>,
}

/// Availability for one date.
///
/// Anonymous and regular clients see the base slot table; VIP clients and
/// admins also see the pre-opening and extended evening slots. Authentication
/// is optional here, a bad token simply degrades to the base view.
#[utoipa::path(
    get,
    path = "/slots/{date}",
    tag = "slots",
    params(
        ("date" = String, Path, description = "Date (YYYY-MM-DD)")
    ),
    responses(
        (status = 200, description = "Per-slot availability (empty on closed days)", body = SlotsResponse),
        (status = 400, description = "Malformed date")
    )
)]
pub async fn get_slots(
    State(state): State<AppState>,
    MaybeUser(claims): MaybeUser,
    Path(date): Path<String>,
) -> AppResult<(HeaderMap, Json<SlotsResponse>)> {
    let giorno = parse_giorno(&date)?;

    let include_extra = match &claims {
        Some(c) if c.is_admin => true,
        Some(c) => state.services.users.is_vip(&c.sub).await?,
        None => false,
    };

    let slots = state
        .services
        .bookings
        .available_slots(giorno, include_extra)
        .await?;

    // Availability must never be cached: it changes with every booking
    let mut headers = HeaderMap::new();
    headers.insert(
        header::CACHE_CONTROL,
        header::HeaderValue::from_static("no-store, no-cache, must-revalidate, private"),
    );

    Ok((headers, Json(SlotsResponse { slots })))
}
