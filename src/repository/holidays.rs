//! Holidays repository for database operations

use chrono::NaiveDate;
use sqlx::{Pool, Postgres};

use crate::{error::AppResult, models::holiday::Holiday};

#[derive(Clone)]
pub struct HolidaysRepository {
    pool: Pool<Postgres>,
}

impl HolidaysRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Every blackout slot
    pub async fn all(&self) -> AppResult<Vec<Holiday>> {
        let rows = sqlx::query_as::<_, Holiday>("SELECT * FROM holidays ORDER BY giorno, ora")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Blackout slots for one date
    pub async fn for_day(&self, giorno: NaiveDate) -> AppResult<Vec<Holiday>> {
        let rows = sqlx::query_as::<_, Holiday>(
            "SELECT * FROM holidays WHERE giorno = $1 ORDER BY ora",
        )
        .bind(giorno)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Whether a specific slot is blacked out
    pub async fn exists(&self, giorno: NaiveDate, ora: &str) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM holidays WHERE giorno = $1 AND ora = $2)",
        )
        .bind(giorno)
        .bind(ora)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    /// Insert a blackout slot; false if the pair was already present
    pub async fn insert(&self, giorno: NaiveDate, ora: &str) -> AppResult<bool> {
        let result = sqlx::query(
            "INSERT INTO holidays (giorno, ora) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(giorno)
        .bind(ora)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Remove a blackout slot; true if a row existed
    pub async fn delete(&self, giorno: NaiveDate, ora: &str) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM holidays WHERE giorno = $1 AND ora = $2")
            .bind(giorno)
            .bind(ora)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
