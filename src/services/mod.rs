//! Business logic services

pub mod bookings;
pub mod calendar;
pub mod email;
pub mod holidays;
pub mod users;

use crate::{
    config::{AuthConfig, BusinessHoursConfig, EmailConfig, StudioConfig},
    repository::Repository,
};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub users: users::UsersService,
    pub bookings: bookings::BookingsService,
    pub holidays: holidays::HolidaysService,
    pub email: email::EmailService,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(
        repository: Repository,
        auth_config: AuthConfig,
        business_hours: BusinessHoursConfig,
        email_config: EmailConfig,
        studio_config: StudioConfig,
    ) -> Self {
        let calendar = calendar::CalendarService::new(business_hours);
        Self {
            users: users::UsersService::new(repository.clone(), auth_config),
            bookings: bookings::BookingsService::new(repository.clone(), calendar),
            holidays: holidays::HolidaysService::new(repository),
            email: email::EmailService::new(email_config, studio_config),
        }
    }
}
