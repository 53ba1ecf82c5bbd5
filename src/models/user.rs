//! User model, JWT claims and auth request types

use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// A registered client (or a silent guest profile created at checkout)
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct User {
    pub id: i32,
    pub nome: String,
    pub cognome: String,
    pub email: String,
    pub telefono: String,
    /// Argon2 hash; guests have none until they set a password
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,
    /// VIP clients see and book the extended-hours slots
    pub vip: bool,
    /// Banned accounts cannot log in
    pub banned: bool,
    pub is_guest: bool,
    pub crea_date: Option<DateTime<Utc>>,
}

/// User representation returned to callers (no credentials)
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PublicUser {
    pub nome: String,
    pub cognome: String,
    pub email: String,
    pub telefono: String,
    pub vip: bool,
    pub banned: bool,
    pub is_guest: bool,
}

impl From<User> for PublicUser {
    fn from(u: User) -> Self {
        Self {
            nome: u.nome,
            cognome: u.cognome,
            email: u.email,
            telefono: u.telefono,
            vip: u.vip,
            banned: u.banned,
            is_guest: u.is_guest,
        }
    }
}

/// An admin account (separate table, checked before regular users at login)
#[derive(Debug, Clone, FromRow)]
pub struct Admin {
    pub id: i32,
    pub email: String,
    pub password_hash: String,
}

/// JWT claims for a session token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserClaims {
    /// Account email
    pub sub: String,
    pub is_admin: bool,
    /// Set only on password-reset tokens
    #[serde(skip_serializing_if = "Option::is_none")]
    pub purpose: Option<String>,
    pub exp: i64,
    pub iat: i64,
}

pub const RESET_PURPOSE: &str = "password-reset";

impl UserClaims {
    pub fn session(email: &str, is_admin: bool, expiration_hours: u64) -> Self {
        let now = Utc::now().timestamp();
        Self {
            sub: email.to_string(),
            is_admin,
            purpose: None,
            exp: now + (expiration_hours as i64 * 3600),
            iat: now,
        }
    }

    pub fn password_reset(email: &str, expiration_hours: u64) -> Self {
        let mut claims = Self::session(email, false, expiration_hours);
        claims.purpose = Some(RESET_PURPOSE.to_string());
        claims
    }

    pub fn create_token(&self, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
        encode(
            &Header::default(),
            self,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
    }

    pub fn from_token(token: &str, secret: &str) -> Result<Self, jsonwebtoken::errors::Error> {
        decode::<Self>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )
        .map(|data| data.claims)
    }
}

/// Registration request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    #[validate(length(min = 1, message = "nome is required"))]
    pub nome: String,
    #[validate(length(min = 1, message = "cognome is required"))]
    pub cognome: String,
    #[validate(email(message = "invalid email format"))]
    pub email: String,
    #[validate(length(min = 1, message = "telefono is required"))]
    pub telefono: String,
    #[validate(length(min = 8, message = "password must be at least 8 characters"))]
    pub password: String,
}

/// Login request
#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Forgot-password request
#[derive(Debug, Deserialize, ToSchema)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

/// Reset-password request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ResetPasswordRequest {
    pub token: String,
    #[validate(length(min = 8, message = "password must be at least 8 characters"))]
    pub password: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_token_round_trip() {
        let claims = UserClaims::session("anna@example.com", false, 24);
        let token = claims.create_token("test-secret").unwrap();
        let decoded = UserClaims::from_token(&token, "test-secret").unwrap();
        assert_eq!(decoded.sub, "anna@example.com");
        assert!(!decoded.is_admin);
        assert!(decoded.purpose.is_none());
    }

    #[test]
    fn reset_token_carries_purpose() {
        let claims = UserClaims::password_reset("anna@example.com", 1);
        let token = claims.create_token("test-secret").unwrap();
        let decoded = UserClaims::from_token(&token, "test-secret").unwrap();
        assert_eq!(decoded.purpose.as_deref(), Some(RESET_PURPOSE));
    }

    #[test]
    fn wrong_secret_rejected() {
        let claims = UserClaims::session("anna@example.com", true, 24);
        let token = claims.create_token("test-secret").unwrap();
        assert!(UserClaims::from_token(&token, "other-secret").is_err());
    }
}
