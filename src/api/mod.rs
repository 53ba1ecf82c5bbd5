//! API handlers for the Lev Space REST endpoints

pub mod admin;
pub mod auth;
pub mod bookings;
pub mod health;
pub mod holidays;
pub mod openapi;
pub mod slots;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{error::AppError, models::user::UserClaims, AppState};

/// Plain confirmation body shared by several endpoints
#[derive(Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

fn bearer_claims(parts: &Parts, state: &AppState) -> Result<UserClaims, AppError> {
    let auth_header = parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| AppError::Authentication("Missing authorization header".to_string()))?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| {
            AppError::Authentication("Invalid authorization header format".to_string())
        })?;

    let claims = UserClaims::from_token(token, &state.config.auth.jwt_secret)
        .map_err(|e| AppError::Authentication(e.to_string()))?;

    // Reset tokens authenticate exactly one endpoint, never a session
    if claims.purpose.is_some() {
        return Err(AppError::Authentication("Invalid session token".to_string()));
    }

    Ok(claims)
}

/// Extractor for an authenticated user (client or admin)
pub struct AuthenticatedUser(pub UserClaims);

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        bearer_claims(parts, state).map(AuthenticatedUser)
    }
}

/// Extractor that additionally requires the admin claim
pub struct AdminUser(pub UserClaims);

#[async_trait]
impl FromRequestParts<AppState> for AdminUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let claims = bearer_claims(parts, state)?;
        if !claims.is_admin {
            return Err(AppError::Forbidden("Admin access required".to_string()));
        }
        Ok(AdminUser(claims))
    }
}

/// Optional authentication: anonymous callers get `None`, invalid tokens are
/// treated as anonymous rather than rejected (used by the slot listing, where
/// the token only widens what is shown)
pub struct MaybeUser(pub Option<UserClaims>);

#[async_trait]
impl FromRequestParts<AppState> for MaybeUser {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(MaybeUser(bearer_claims(parts, state).ok()))
    }
}
