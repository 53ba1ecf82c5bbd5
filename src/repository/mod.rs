//! Repository layer for database operations

pub mod bookings;
pub mod holidays;
pub mod users;

use sqlx::{Pool, Postgres};

/// Main repository struct holding database connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
    pub users: users::UsersRepository,
    pub bookings: bookings::BookingsRepository,
    pub holidays: holidays::HolidaysRepository,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            users: users::UsersRepository::new(pool.clone()),
            bookings: bookings::BookingsRepository::new(pool.clone()),
            holidays: holidays::HolidaysRepository::new(pool.clone()),
            pool,
        }
    }
}
