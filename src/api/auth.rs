//! Authentication endpoints

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::user::{
        ForgotPasswordRequest, LoginRequest, PublicUser, RegisterRequest, ResetPasswordRequest,
    },
    AppState,
};

use super::{AuthenticatedUser, MessageResponse};

/// Login response
#[derive(Serialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
    pub token_type: String,
    pub is_admin: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<PublicUser>,
}

/// Current session info
#[derive(Serialize, ToSchema)]
pub struct MeResponse {
    pub email: String,
    pub is_admin: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<PublicUser>,
}

/// Register a new client account
#[utoipa::path(
    post,
    path = "/auth/register",
    tag = "auth",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = PublicUser),
        (status = 400, description = "Invalid input or email already registered")
    )
)]
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<PublicUser>)> {
    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let user = state.services.users.register(&request).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// Log in with email and password
#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Session token", body = LoginResponse),
        (status = 401, description = "Invalid credentials or suspended account")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let outcome = state
        .services
        .users
        .login(&request.email, &request.password)
        .await?;

    Ok(Json(LoginResponse {
        token: outcome.token,
        token_type: "Bearer".to_string(),
        is_admin: outcome.is_admin,
        user: outcome.user,
    }))
}

/// Current authenticated user
#[utoipa::path(
    get,
    path = "/auth/me",
    tag = "auth",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Session info", body = MeResponse),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn me(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<MeResponse>> {
    let user = if claims.is_admin {
        None
    } else {
        state
            .services
            .users
            .get_by_email(&claims.sub)
            .await?
            .map(PublicUser::from)
    };

    Ok(Json(MeResponse {
        email: claims.sub,
        is_admin: claims.is_admin,
        user,
    }))
}

/// Request a password reset link.
/// Always answers the same way, whether or not the email exists.
#[utoipa::path(
    post,
    path = "/auth/forgot-password",
    tag = "auth",
    request_body = ForgotPasswordRequest,
    responses(
        (status = 200, description = "Reset requested", body = MessageResponse)
    )
)]
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(request): Json<ForgotPasswordRequest>,
) -> AppResult<Json<MessageResponse>> {
    if request.email.trim().is_empty() {
        return Err(AppError::Validation("email is required".to_string()));
    }

    if let Some(token) = state
        .services
        .users
        .generate_reset_token(&request.email)
        .await?
    {
        let reset_link = format!(
            "{}/new-password?token={}",
            state.config.studio.base_url, token
        );
        let email = request.email.trim().to_lowercase();
        let services = state.services.clone();
        tokio::spawn(async move {
            if let Err(e) = services.email.send_password_reset(&email, &reset_link).await {
                tracing::error!("Failed to send reset email: {}", e);
            }
        });
    }

    Ok(Json(MessageResponse {
        message: "If the email exists, a reset link is on its way.".to_string(),
    }))
}

/// Set a new password using a reset token
#[utoipa::path(
    post,
    path = "/auth/reset-password",
    tag = "auth",
    request_body = ResetPasswordRequest,
    responses(
        (status = 200, description = "Password updated", body = MessageResponse),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Expired or invalid token")
    )
)]
pub async fn reset_password(
    State(state): State<AppState>,
    Json(request): Json<ResetPasswordRequest>,
) -> AppResult<Json<MessageResponse>> {
    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    state
        .services
        .users
        .reset_password(&request.token, &request.password)
        .await?;

    Ok(Json(MessageResponse {
        message: "Password updated".to_string(),
    }))
}
