//! Authentication and client account service

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
    models::user::{PublicUser, RegisterRequest, User, UserClaims, RESET_PURPOSE},
    repository::{users::NewUser, Repository},
};

/// Result of a successful login
pub struct LoginOutcome {
    pub token: String,
    pub is_admin: bool,
    pub user: Option<PublicUser>,
}

#[derive(Clone)]
pub struct UsersService {
    repository: Repository,
    config: AuthConfig,
}

impl UsersService {
    pub fn new(repository: Repository, config: AuthConfig) -> Self {
        Self { repository, config }
    }

    fn hash_password(&self, password: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|h| h.to_string())
            .map_err(|e| AppError::Internal(format!("Failed to hash password: {e}")))
    }

    fn verify_password(&self, hash: &str, password: &str) -> bool {
        PasswordHash::new(hash)
            .map(|parsed| {
                Argon2::default()
                    .verify_password(password.as_bytes(), &parsed)
                    .is_ok()
            })
            .unwrap_or(false)
    }

    /// Register a new client account
    pub async fn register(&self, request: &RegisterRequest) -> AppResult<PublicUser> {
        let email = request.email.trim().to_lowercase();

        if self.repository.users.get_by_email(&email).await?.is_some() {
            return Err(AppError::Validation("Email already registered".to_string()));
        }

        let password_hash = self.hash_password(&request.password)?;
        let user = self
            .repository
            .users
            .insert(&NewUser {
                nome: request.nome.trim().to_string(),
                cognome: request.cognome.trim().to_string(),
                email,
                telefono: request.telefono.trim().to_string(),
                password_hash: Some(password_hash),
                is_guest: false,
            })
            .await?;

        tracing::info!(email = %user.email, "client registered");
        Ok(user.into())
    }

    /// Authenticate by email and password.
    ///
    /// The admin table is checked first; a match there yields an admin
    /// session without touching the users table. Banned clients are refused.
    /// Both bad-email and bad-password cases answer identically.
    pub async fn login(&self, email: &str, password: &str) -> AppResult<LoginOutcome> {
        if email.is_empty() || password.is_empty() {
            return Err(AppError::Validation(
                "email and password are required".to_string(),
            ));
        }
        let email = email.trim().to_lowercase();

        if let Some(admin) = self.repository.users.get_admin_by_email(&email).await? {
            if self.verify_password(&admin.password_hash, password) {
                let token = UserClaims::session(&email, true, self.config.jwt_expiration_hours)
                    .create_token(&self.config.jwt_secret)
                    .map_err(|e| AppError::Internal(format!("Failed to create token: {e}")))?;
                return Ok(LoginOutcome {
                    token,
                    is_admin: true,
                    user: None,
                });
            }
        }

        let user = self
            .repository
            .users
            .get_by_email(&email)
            .await?
            .ok_or_else(|| AppError::Authentication("Invalid credentials".to_string()))?;

        if user.banned {
            return Err(AppError::Authentication("Account suspended".to_string()));
        }

        let valid = user
            .password_hash
            .as_deref()
            .map(|hash| self.verify_password(hash, password))
            .unwrap_or(false);
        if !valid {
            return Err(AppError::Authentication("Invalid credentials".to_string()));
        }

        let token = UserClaims::session(&user.email, false, self.config.jwt_expiration_hours)
            .create_token(&self.config.jwt_secret)
            .map_err(|e| AppError::Internal(format!("Failed to create token: {e}")))?;

        Ok(LoginOutcome {
            token,
            is_admin: false,
            user: Some(user.into()),
        })
    }

    pub async fn get_by_email(&self, email: &str) -> AppResult<Option<User>> {
        self.repository.users.get_by_email(email).await
    }

    pub async fn is_vip(&self, email: &str) -> AppResult<bool> {
        Ok(self
            .repository
            .users
            .get_by_email(email)
            .await?
            .map(|u| u.vip)
            .unwrap_or(false))
    }

    /// Make sure a profile exists for a guest checkout; unknown emails get a
    /// silent passwordless guest profile, known ones are reused as-is.
    pub async fn ensure_guest_profile(
        &self,
        nome: &str,
        cognome: &str,
        email: &str,
    ) -> AppResult<User> {
        let email = email.trim().to_lowercase();
        if let Some(existing) = self.repository.users.get_by_email(&email).await? {
            tracing::debug!(%email, "guest checkout reusing existing profile");
            return Ok(existing);
        }

        let user = self
            .repository
            .users
            .insert(&NewUser {
                nome: nome.trim().to_string(),
                cognome: cognome.trim().to_string(),
                email: email.clone(),
                telefono: String::new(),
                password_hash: None,
                is_guest: true,
            })
            .await?;
        tracing::info!(%email, "guest profile created");
        Ok(user)
    }

    pub async fn list(&self) -> AppResult<Vec<PublicUser>> {
        let users = self.repository.users.list().await?;
        Ok(users.into_iter().map(PublicUser::from).collect())
    }

    pub async fn toggle_vip(&self, email: &str) -> AppResult<bool> {
        self.repository.users.toggle_vip(email).await
    }

    pub async fn toggle_banned(&self, email: &str) -> AppResult<bool> {
        self.repository.users.toggle_banned(email).await
    }

    /// Issue a password-reset token for an existing account. Returns None
    /// for unknown emails so the HTTP layer can answer identically either
    /// way (anti-enumeration).
    pub async fn generate_reset_token(&self, email: &str) -> AppResult<Option<String>> {
        let email = email.trim().to_lowercase();
        if self.repository.users.get_by_email(&email).await?.is_none() {
            return Ok(None);
        }

        let token = UserClaims::password_reset(&email, self.config.reset_token_expiration_hours)
            .create_token(&self.config.jwt_secret)
            .map_err(|e| AppError::Internal(format!("Failed to create token: {e}")))?;
        Ok(Some(token))
    }

    /// Consume a reset token and set the new password
    pub async fn reset_password(&self, token: &str, new_password: &str) -> AppResult<String> {
        let claims = UserClaims::from_token(token, &self.config.jwt_secret)
            .map_err(|_| AppError::Authentication("Reset link expired or invalid".to_string()))?;

        if claims.purpose.as_deref() != Some(RESET_PURPOSE) {
            return Err(AppError::Authentication("Invalid reset token".to_string()));
        }

        let hash = self.hash_password(new_password)?;
        self.repository.users.set_password(&claims.sub, &hash).await?;
        tracing::info!(email = %claims.sub, "password reset");
        Ok(claims.sub)
    }
}
