//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{admin, auth, bookings, health, holidays, slots};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Lev Space API",
        version = "1.0.0",
        description = "Salon appointment booking REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Auth
        auth::register,
        auth::login,
        auth::me,
        auth::forgot_password,
        auth::reset_password,
        // Slots
        slots::get_slots,
        // Bookings
        bookings::create_booking,
        bookings::list_my_bookings,
        bookings::my_booking_stats,
        bookings::cancel_booking,
        bookings::guest_booking,
        bookings::get_booking_by_token,
        bookings::update_booking_by_token,
        bookings::cancel_booking_by_token,
        // Holidays
        holidays::list_holidays,
        holidays::add_holidays,
        holidays::remove_holidays,
        // Admin
        admin::list_bookings,
        admin::create_booking,
        admin::cancel_booking,
        admin::move_booking,
        admin::list_users,
        admin::toggle_vip,
        admin::toggle_banned,
        admin::bookings_report,
    ),
    components(
        schemas(
            // Auth
            crate::models::user::RegisterRequest,
            crate::models::user::LoginRequest,
            crate::models::user::ForgotPasswordRequest,
            crate::models::user::ResetPasswordRequest,
            crate::models::user::PublicUser,
            crate::models::user::User,
            auth::LoginResponse,
            auth::MeResponse,
            super::MessageResponse,
            // Slots
            crate::models::slot::SlotStatus,
            slots::SlotsResponse,
            // Bookings
            crate::models::booking::Booking,
            crate::models::booking::BookingStats,
            crate::models::booking::CreateBookingRequest,
            crate::models::booking::CancelBookingRequest,
            crate::models::booking::GuestBookingRequest,
            crate::models::booking::AdminBookingRequest,
            crate::models::booking::MoveBookingRequest,
            crate::models::booking::RescheduleRequest,
            bookings::BookingResponse,
            // Holidays
            crate::models::holiday::Holiday,
            crate::models::holiday::HolidaySlot,
            crate::models::holiday::HolidaySlotsRequest,
            holidays::HolidaysResponse,
            holidays::AddedResponse,
            holidays::RemovedResponse,
            // Admin
            admin::ToggleResponse,
            admin::DailyCount,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Authentication endpoints"),
        (name = "slots", description = "Slot availability"),
        (name = "bookings", description = "Booking management"),
        (name = "holidays", description = "Holiday (blackout) management"),
        (name = "admin", description = "Admin operations")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
