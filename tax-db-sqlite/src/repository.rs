use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::Row;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use tax_core::{CeilingRepository, DeductionCeiling, DeductionKind, RepositoryError};
use tracing::debug;

use crate::decimal::get_decimal;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub struct SqliteRepository {
    pool: SqlitePool,
}

impl SqliteRepository {
    /// Connect to a sqlx-style URL (`sqlite:taxes.db`, `sqlite::memory:`).
    /// Database files are created if missing. An in-memory database is held
    /// on a single connection that never expires, otherwise every pooled
    /// connection would see its own empty database.
    pub async fn new(database_url: &str) -> Result<Self, RepositoryError> {
        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(|e| {
                RepositoryError::Configuration(format!(
                    "invalid database url '{}': {}",
                    database_url, e
                ))
            })?
            .create_if_missing(true);

        let pool_options = if database_url.contains(":memory:") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new()
        };

        let pool = pool_options
            .connect_with(options)
            .await
            .map_err(|e| RepositoryError::Connection(e.to_string()))?;
        Ok(Self { pool })
    }

    pub fn new_with_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn run_migrations(&self) -> Result<(), RepositoryError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| RepositoryError::Database(format!("Failed to run migrations: {}", e)))?;
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

fn parse_datetime(s: &str) -> Result<DateTime<Utc>, RepositoryError> {
    // SQLite stores timestamps in various formats, try common ones
    chrono::NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT)
        .or_else(|_| chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S"))
        .or_else(|_| chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f"))
        .map(|naive| naive.and_utc())
        .map_err(|e| RepositoryError::Database(format!("Failed to parse datetime '{}': {}", s, e)))
}

fn now() -> String {
    Utc::now().format(TIMESTAMP_FORMAT).to_string()
}

fn row_to_ceiling(row: &SqliteRow) -> Result<DeductionCeiling, RepositoryError> {
    let type_code: String = row
        .try_get("deduction_type")
        .map_err(|e| RepositoryError::Database(e.to_string()))?;
    let kind = DeductionKind::parse(&type_code).ok_or_else(|| {
        RepositoryError::Database(format!("Invalid deduction type: {}", type_code))
    })?;
    let updated_at: String = row
        .try_get("updated_at")
        .map_err(|e| RepositoryError::Database(e.to_string()))?;

    Ok(DeductionCeiling {
        kind,
        max_amount: get_decimal(row, "max_amount")?,
        updated_at: parse_datetime(&updated_at)?,
    })
}

#[async_trait]
impl CeilingRepository for SqliteRepository {
    async fn get_ceiling(
        &self,
        kind: DeductionKind,
    ) -> Result<DeductionCeiling, RepositoryError> {
        let row = sqlx::query(
            "SELECT deduction_type, max_amount, updated_at
             FROM deduction_ceiling WHERE deduction_type = ?",
        )
        .bind(kind.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepositoryError::Database(e.to_string()))?
        .ok_or(RepositoryError::NotFound)?;

        row_to_ceiling(&row)
    }

    async fn list_ceilings(&self) -> Result<Vec<DeductionCeiling>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT deduction_type, max_amount, updated_at FROM deduction_ceiling ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepositoryError::Database(e.to_string()))?;

        rows.iter().map(row_to_ceiling).collect()
    }

    async fn set_ceiling(
        &self,
        kind: DeductionKind,
        amount: Decimal,
    ) -> Result<DeductionCeiling, RepositoryError> {
        let result = sqlx::query(
            "UPDATE deduction_ceiling SET max_amount = ?, updated_at = ?
             WHERE deduction_type = ?",
        )
        .bind(amount.to_string())
        .bind(now())
        .bind(kind.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        self.get_ceiling(kind).await
    }

    async fn seed_defaults(&self) -> Result<usize, RepositoryError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| RepositoryError::Database(e.to_string()))?;

        let mut inserted = 0;
        for kind in DeductionKind::ALL {
            let result = sqlx::query(
                "INSERT INTO deduction_ceiling (deduction_type, max_amount, updated_at)
                 VALUES (?, ?, ?)
                 ON CONFLICT (deduction_type) DO NOTHING",
            )
            .bind(kind.as_str())
            .bind(kind.default_ceiling().to_string())
            .bind(now())
            .execute(&mut *tx)
            .await
            .map_err(|e| RepositoryError::Database(e.to_string()))?;

            if result.rows_affected() > 0 {
                debug!(kind = %kind, "inserted default ceiling");
                inserted += 1;
            }
        }

        tx.commit()
            .await
            .map_err(|e| RepositoryError::Database(e.to_string()))?;
        Ok(inserted)
    }
}
