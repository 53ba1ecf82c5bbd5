//! Lev Space Booking Server
//!
//! REST JSON API for the Lev Space hair studio: calendar and slot
//! availability, appointment booking (including group bookings), and
//! token-based self-service management of existing appointments.

use std::sync::Arc;

use sqlx::{Pool, Postgres};

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
    pub pool: Pool<Postgres>,
}
