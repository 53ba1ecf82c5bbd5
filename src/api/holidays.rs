//! Holiday (blackout slot) endpoints

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::{AppError, AppResult},
    models::holiday::{Holiday, HolidaySlot, HolidaySlotsRequest},
    AppState,
};

use super::AdminUser;

#[derive(Serialize, ToSchema)]
pub struct HolidaysResponse {
    pub holidays: Vec<Holiday>,
}

#[derive(Serialize, ToSchema)]
pub struct AddedResponse {
    pub added: Vec<HolidaySlot>,
    pub count: usize,
}

#[derive(Serialize, ToSchema)]
pub struct RemovedResponse {
    pub removed: u64,
}

/// All blackout slots (public: the calendar needs them to render)
#[utoipa::path(
    get,
    path = "/holidays",
    tag = "holidays",
    responses(
        (status = 200, description = "All blackout slots", body = HolidaysResponse)
    )
)]
pub async fn list_holidays(State(state): State<AppState>) -> AppResult<Json<HolidaysResponse>> {
    let holidays = state.services.holidays.list().await?;
    Ok(Json(HolidaysResponse { holidays }))
}

/// Add blackout slots (admin)
#[utoipa::path(
    post,
    path = "/admin/holidays",
    tag = "holidays",
    security(("bearer_auth" = [])),
    request_body = HolidaySlotsRequest,
    responses(
        (status = 201, description = "Slots added (duplicates skipped)", body = AddedResponse),
        (status = 400, description = "Empty or malformed slot list"),
        (status = 403, description = "Admin access required")
    )
)]
pub async fn add_holidays(
    State(state): State<AppState>,
    _admin: AdminUser,
    Json(request): Json<HolidaySlotsRequest>,
) -> AppResult<(StatusCode, Json<AddedResponse>)> {
    if request.slots.is_empty() {
        return Err(AppError::Validation("No holiday slots given".to_string()));
    }

    let added = state.services.holidays.add_slots(&request.slots).await?;
    let count = added.len();
    Ok((StatusCode::CREATED, Json(AddedResponse { added, count })))
}

/// Remove blackout slots (admin)
#[utoipa::path(
    delete,
    path = "/admin/holidays",
    tag = "holidays",
    security(("bearer_auth" = [])),
    request_body = HolidaySlotsRequest,
    responses(
        (status = 200, description = "Slots removed", body = RemovedResponse),
        (status = 400, description = "Empty or malformed slot list"),
        (status = 403, description = "Admin access required")
    )
)]
pub async fn remove_holidays(
    State(state): State<AppState>,
    _admin: AdminUser,
    Json(request): Json<HolidaySlotsRequest>,
) -> AppResult<Json<RemovedResponse>> {
    if request.slots.is_empty() {
        return Err(AppError::Validation("No holiday slots given".to_string()));
    }

    let removed = state.services.holidays.remove_slots(&request.slots).await?;
    Ok(Json(RemovedResponse { removed }))
}
