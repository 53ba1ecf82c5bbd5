//! Domain models

pub mod booking;
pub mod holiday;
pub mod slot;
pub mod user;
