//! Bookings repository for database operations
//!
//! The `bookings` table carries a `UNIQUE (giorno, ora)` constraint; it, not
//! the service-level pre-checks, is the real defense against two concurrent
//! writers grabbing the same slot. Inserts translate a unique violation into
//! `AppError::SlotTaken` so the losing writer gets the same answer it would
//! have gotten from the pre-check.

use chrono::NaiveDate;
use sqlx::{Pool, Postgres, Row};

use crate::{
    error::{AppError, AppResult},
    models::booking::{Booking, NewBooking},
};

#[derive(Clone)]
pub struct BookingsRepository {
    pool: Pool<Postgres>,
}

fn map_insert_error(err: sqlx::Error, ora: &str) -> AppError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            AppError::SlotTaken(ora.to_string())
        }
        _ => AppError::Database(err),
    }
}

impl BookingsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// All bookings for a date
    pub async fn for_day(&self, giorno: NaiveDate) -> AppResult<Vec<Booking>> {
        let rows = sqlx::query_as::<_, Booking>(
            "SELECT * FROM bookings WHERE giorno = $1 ORDER BY ora",
        )
        .bind(giorno)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Booking occupying a slot, if any
    pub async fn find_slot(&self, giorno: NaiveDate, ora: &str) -> AppResult<Option<Booking>> {
        let row = sqlx::query_as::<_, Booking>(
            "SELECT * FROM bookings WHERE giorno = $1 AND ora = $2",
        )
        .bind(giorno)
        .bind(ora)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    /// All rows sharing a self-service token, in group order
    pub async fn by_token(&self, token: &str) -> AppResult<Vec<Booking>> {
        let rows = sqlx::query_as::<_, Booking>(
            "SELECT * FROM bookings WHERE token = $1 ORDER BY slot_index",
        )
        .bind(token)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Bookings belonging to a client email
    pub async fn for_user(&self, email: &str) -> AppResult<Vec<Booking>> {
        let rows = sqlx::query_as::<_, Booking>(
            "SELECT * FROM bookings WHERE email = $1 ORDER BY giorno, ora",
        )
        .bind(email)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Every booking in the system (admin calendar)
    pub async fn all(&self) -> AppResult<Vec<Booking>> {
        let rows = sqlx::query_as::<_, Booking>("SELECT * FROM bookings ORDER BY giorno, ora")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Insert a single booking row
    pub async fn insert(&self, booking: &NewBooking) -> AppResult<Booking> {
        sqlx::query_as::<_, Booking>(
            r#"
            INSERT INTO bookings (nome, cognome, email, telefono, giorno, ora,
                                  token, group_size, slot_index)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(&booking.nome)
        .bind(&booking.cognome)
        .bind(&booking.email)
        .bind(&booking.telefono)
        .bind(booking.giorno)
        .bind(&booking.ora)
        .bind(&booking.token)
        .bind(booking.group_size)
        .bind(booking.slot_index)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_insert_error(e, &booking.ora))
    }

    /// Insert all rows of a group booking in one transaction.
    ///
    /// Either every row commits or none does; a unique violation on any slot
    /// rolls the whole group back and surfaces as `SlotTaken` for that slot.
    pub async fn insert_group(&self, rows: &[NewBooking]) -> AppResult<Vec<Booking>> {
        let mut tx = self.pool.begin().await?;
        let mut inserted = Vec::with_capacity(rows.len());

        for booking in rows {
            let row = sqlx::query_as::<_, Booking>(
                r#"
                INSERT INTO bookings (nome, cognome, email, telefono, giorno, ora,
                                      token, group_size, slot_index)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
                RETURNING *
                "#,
            )
            .bind(&booking.nome)
            .bind(&booking.cognome)
            .bind(&booking.email)
            .bind(&booking.telefono)
            .bind(booking.giorno)
            .bind(&booking.ora)
            .bind(&booking.token)
            .bind(booking.group_size)
            .bind(booking.slot_index)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| map_insert_error(e, &booking.ora))?;
            inserted.push(row);
        }

        tx.commit().await?;
        Ok(inserted)
    }

    /// Delete the booking at a slot; true if a row existed
    pub async fn delete_slot(&self, giorno: NaiveDate, ora: &str) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM bookings WHERE giorno = $1 AND ora = $2")
            .bind(giorno)
            .bind(ora)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete every row sharing a token; returns the number removed
    pub async fn delete_by_token(&self, token: &str) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM bookings WHERE token = $1")
            .bind(token)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// Relocate a booking in a single UPDATE.
    ///
    /// Atomic by construction: there is no window where the booking exists at
    /// neither slot, unlike a delete-then-insert pair. A unique violation on
    /// the destination surfaces as `SlotTaken`.
    pub async fn move_slot(
        &self,
        old_giorno: NaiveDate,
        old_ora: &str,
        new_giorno: NaiveDate,
        new_ora: &str,
    ) -> AppResult<Option<Booking>> {
        sqlx::query_as::<_, Booking>(
            r#"
            UPDATE bookings SET giorno = $3, ora = $4
            WHERE giorno = $1 AND ora = $2
            RETURNING *
            "#,
        )
        .bind(old_giorno)
        .bind(old_ora)
        .bind(new_giorno)
        .bind(new_ora)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_insert_error(e, new_ora))
    }

    /// Replace every row of a token with a single row at a new slot, in one
    /// transaction (token-based reschedule collapses a group to one seat).
    pub async fn replace_token_rows(
        &self,
        token: &str,
        replacement: &NewBooking,
    ) -> AppResult<Booking> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM bookings WHERE token = $1")
            .bind(token)
            .execute(&mut *tx)
            .await?;

        let row = sqlx::query_as::<_, Booking>(
            r#"
            INSERT INTO bookings (nome, cognome, email, telefono, giorno, ora,
                                  token, group_size, slot_index)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(&replacement.nome)
        .bind(&replacement.cognome)
        .bind(&replacement.email)
        .bind(&replacement.telefono)
        .bind(replacement.giorno)
        .bind(&replacement.ora)
        .bind(&replacement.token)
        .bind(replacement.group_size)
        .bind(replacement.slot_index)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_insert_error(e, &replacement.ora))?;

        tx.commit().await?;
        Ok(row)
    }

    /// Bookings-per-day counts over a closed date range (admin reports)
    pub async fn counts_by_day(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> AppResult<Vec<(NaiveDate, i64)>> {
        let rows = sqlx::query(
            r#"
            SELECT giorno, COUNT(*) AS n FROM bookings
            WHERE giorno >= $1 AND giorno <= $2
            GROUP BY giorno ORDER BY giorno
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| (r.get::<NaiveDate, _>("giorno"), r.get::<i64, _>("n")))
            .collect())
    }
}
