use async_trait::async_trait;
use rust_decimal::Decimal;
use thiserror::Error;

use crate::models::{DeductionCeiling, DeductionKind};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("Record not found")]
    NotFound,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Persistent store of deduction ceilings, one row per [`DeductionKind`].
#[async_trait]
pub trait CeilingRepository: Send + Sync {
    async fn get_ceiling(
        &self,
        kind: DeductionKind,
    ) -> Result<DeductionCeiling, RepositoryError>;

    async fn list_ceilings(&self) -> Result<Vec<DeductionCeiling>, RepositoryError>;

    /// Overwrites an existing ceiling and returns the stored record.
    /// Returns [`RepositoryError::NotFound`] if the kind was never seeded.
    async fn set_ceiling(
        &self,
        kind: DeductionKind,
        amount: Decimal,
    ) -> Result<DeductionCeiling, RepositoryError>;

    /// Inserts the default ceiling for every kind that has no row yet.
    /// Existing rows are left untouched. Returns the number inserted.
    async fn seed_defaults(&self) -> Result<usize, RepositoryError>;
}
