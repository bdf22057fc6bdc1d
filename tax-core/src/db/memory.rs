//! Process-local ceiling store.
//!
//! Backs the `"memory"` backend. State lives only as long as the repository.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use tokio::sync::RwLock;

use super::factory::{DbConfig, RepositoryFactory};
use super::repository::{CeilingRepository, RepositoryError};
use crate::models::{DeductionCeiling, DeductionKind};

#[derive(Debug, Default)]
pub struct InMemoryCeilingRepository {
    ceilings: RwLock<HashMap<DeductionKind, DeductionCeiling>>,
}

impl InMemoryCeilingRepository {
    /// An empty store; call [`CeilingRepository::seed_defaults`] to populate it.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CeilingRepository for InMemoryCeilingRepository {
    async fn get_ceiling(
        &self,
        kind: DeductionKind,
    ) -> Result<DeductionCeiling, RepositoryError> {
        self.ceilings
            .read()
            .await
            .get(&kind)
            .cloned()
            .ok_or(RepositoryError::NotFound)
    }

    async fn list_ceilings(&self) -> Result<Vec<DeductionCeiling>, RepositoryError> {
        let ceilings = self.ceilings.read().await;
        Ok(DeductionKind::ALL
            .iter()
            .filter_map(|kind| ceilings.get(kind).cloned())
            .collect())
    }

    async fn set_ceiling(
        &self,
        kind: DeductionKind,
        amount: Decimal,
    ) -> Result<DeductionCeiling, RepositoryError> {
        let mut ceilings = self.ceilings.write().await;
        let ceiling = ceilings.get_mut(&kind).ok_or(RepositoryError::NotFound)?;
        ceiling.max_amount = amount;
        ceiling.updated_at = Utc::now();
        Ok(ceiling.clone())
    }

    async fn seed_defaults(&self) -> Result<usize, RepositoryError> {
        let mut ceilings = self.ceilings.write().await;
        let mut inserted = 0;
        for kind in DeductionKind::ALL {
            ceilings.entry(kind).or_insert_with(|| {
                inserted += 1;
                DeductionCeiling {
                    kind,
                    max_amount: kind.default_ceiling(),
                    updated_at: Utc::now(),
                }
            });
        }
        Ok(inserted)
    }
}

/// [`RepositoryFactory`] for the in-memory backend. The connection string is
/// ignored.
pub struct InMemoryRepositoryFactory;

#[async_trait]
impl RepositoryFactory for InMemoryRepositoryFactory {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn create(
        &self,
        _config: &DbConfig,
    ) -> Result<Box<dyn CeilingRepository>, RepositoryError> {
        Ok(Box::new(InMemoryCeilingRepository::new()))
    }
}
