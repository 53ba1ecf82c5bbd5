//! Lev Space Server - Appointment Booking System
//!
//! REST API server for the Lev Space hair studio.

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use levspace_server::{api, config::AppConfig, repository::Repository, services::Services, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Load configuration
    let config = AppConfig::load().expect("Failed to load configuration");

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("levspace_server={},tower_http=debug", config.logging.level).into()
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Lev Space Server v{}", env!("CARGO_PKG_VERSION"));

    // Create database connection pool
    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .connect(&config.database.url)
        .await
        .expect("Failed to connect to database");

    tracing::info!("Connected to database");

    // Run migrations
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run database migrations");

    tracing::info!("Database migrations completed");

    // Save server address before moving config
    let server_host = config.server.host.clone();
    let server_port = config.server.port;

    // Create repository and services
    let repository = Repository::new(pool.clone());
    let services = Services::new(
        repository,
        config.auth.clone(),
        config.business_hours.clone(),
        config.email.clone(),
        config.studio.clone(),
    );

    // Create application state
    let state = AppState {
        config: Arc::new(config),
        services: Arc::new(services),
        pool,
    };

    // Build router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(
        server_host.parse().expect("Invalid host address"),
        server_port,
    );

    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes
fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // API v1 routes
    let api_v1 = Router::new()
        // Health check
        .route("/health", get(api::health::health_check))
        .route("/ready", get(api::health::readiness_check))
        // Authentication
        .route("/auth/register", post(api::auth::register))
        .route("/auth/login", post(api::auth::login))
        .route("/auth/me", get(api::auth::me))
        .route("/auth/forgot-password", post(api::auth::forgot_password))
        .route("/auth/reset-password", post(api::auth::reset_password))
        // Slot availability
        .route("/slots/:date", get(api::slots::get_slots))
        // Bookings
        .route("/bookings", post(api::bookings::create_booking))
        .route("/bookings", get(api::bookings::list_my_bookings))
        .route("/bookings", delete(api::bookings::cancel_booking))
        .route("/bookings/stats", get(api::bookings::my_booking_stats))
        .route("/bookings/guest", post(api::bookings::guest_booking))
        // Token-based self-service management
        .route(
            "/bookings/manage/:token",
            get(api::bookings::get_booking_by_token),
        )
        .route(
            "/bookings/manage/:token",
            put(api::bookings::update_booking_by_token),
        )
        .route(
            "/bookings/manage/:token",
            delete(api::bookings::cancel_booking_by_token),
        )
        // Holidays
        .route("/holidays", get(api::holidays::list_holidays))
        // Admin
        .route("/admin/bookings", get(api::admin::list_bookings))
        .route("/admin/bookings", post(api::admin::create_booking))
        .route("/admin/bookings", delete(api::admin::cancel_booking))
        .route("/admin/bookings", put(api::admin::move_booking))
        .route("/admin/users", get(api::admin::list_users))
        .route("/admin/users/:email/vip", put(api::admin::toggle_vip))
        .route("/admin/users/:email/banned", put(api::admin::toggle_banned))
        .route("/admin/holidays", post(api::holidays::add_holidays))
        .route("/admin/holidays", delete(api::holidays::remove_holidays))
        .route("/admin/reports/bookings", get(api::admin::bookings_report))
        .with_state(state.clone());

    // OpenAPI documentation
    let openapi = api::openapi::create_openapi_router();

    Router::new()
        .nest("/api/v1", api_v1)
        .merge(openapi)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
