//! Users repository for database operations

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::user::{Admin, User},
};

/// Fields inserted for a new user row
#[derive(Debug, Clone)]
pub struct NewUser {
    pub nome: String,
    pub cognome: String,
    pub email: String,
    pub telefono: String,
    pub password_hash: Option<String>,
    pub is_guest: bool,
}

#[derive(Clone)]
pub struct UsersRepository {
    pool: Pool<Postgres>,
}

impl UsersRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Look up a user by email (emails are stored lowercased)
    pub async fn get_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let row = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    /// Look up an admin account by email
    pub async fn get_admin_by_email(&self, email: &str) -> AppResult<Option<Admin>> {
        let row = sqlx::query_as::<_, Admin>("SELECT * FROM admins WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    /// Insert a new user
    pub async fn insert(&self, user: &NewUser) -> AppResult<User> {
        let row = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (nome, cognome, email, telefono, password_hash, is_guest)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(&user.nome)
        .bind(&user.cognome)
        .bind(&user.email)
        .bind(&user.telefono)
        .bind(&user.password_hash)
        .bind(user.is_guest)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                AppError::Validation("Email already registered".to_string())
            }
            _ => AppError::Database(e),
        })?;
        Ok(row)
    }

    /// All registered users
    pub async fn list(&self) -> AppResult<Vec<User>> {
        let rows = sqlx::query_as::<_, User>("SELECT * FROM users ORDER BY cognome, nome")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Flip the VIP flag; returns the new value
    pub async fn toggle_vip(&self, email: &str) -> AppResult<bool> {
        sqlx::query_scalar::<_, bool>(
            "UPDATE users SET vip = NOT vip WHERE email = $1 RETURNING vip",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::UserNotFound(email.to_string()))
    }

    /// Flip the banned flag; returns the new value
    pub async fn toggle_banned(&self, email: &str) -> AppResult<bool> {
        sqlx::query_scalar::<_, bool>(
            "UPDATE users SET banned = NOT banned WHERE email = $1 RETURNING banned",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::UserNotFound(email.to_string()))
    }

    /// Replace a user's password hash
    pub async fn set_password(&self, email: &str, password_hash: &str) -> AppResult<()> {
        let result = sqlx::query("UPDATE users SET password_hash = $2 WHERE email = $1")
            .bind(email)
            .bind(password_hash)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::UserNotFound(email.to_string()));
        }
        Ok(())
    }
}
