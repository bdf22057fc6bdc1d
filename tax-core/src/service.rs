//! Glue between the ceiling store and the calculation engine.

use std::sync::Arc;

use rust_decimal::Decimal;
use thiserror::Error;
use tracing::{debug, info};

use crate::calculations::{DeductionCeilings, DeductionError, TaxCalculator};
use crate::db::{CeilingRepository, RepositoryError};
use crate::models::{CalculationRequest, CalculationResult, DeductionCeiling, DeductionKind};
use crate::validation::{ValidationError, validate_ceiling};

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    Deduction(#[from] DeductionError),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Calculates tax using the ceilings currently held by a repository.
///
/// Each call reads a fresh snapshot of the ceilings, so an update made by an
/// administrator applies to every calculation that starts after it commits.
#[derive(Clone)]
pub struct TaxService {
    repository: Arc<dyn CeilingRepository>,
    calculator: TaxCalculator<'static>,
}

impl TaxService {
    pub fn new(repository: Arc<dyn CeilingRepository>) -> Self {
        Self {
            repository,
            calculator: TaxCalculator::default(),
        }
    }

    /// Seeds missing ceilings and returns the full table.
    pub async fn prepare_store(&self) -> Result<Vec<DeductionCeiling>, ServiceError> {
        let inserted = self.repository.seed_defaults().await?;
        if inserted > 0 {
            info!(inserted, "seeded default deduction ceilings");
        }
        Ok(self.repository.list_ceilings().await?)
    }

    /// Reads every ceiling into a snapshot.
    pub async fn ceilings(&self) -> Result<DeductionCeilings, ServiceError> {
        Ok(self.repository.list_ceilings().await?.into_iter().collect())
    }

    pub async fn calculate(
        &self,
        request: &CalculationRequest,
    ) -> Result<CalculationResult, ServiceError> {
        let ceilings = self.ceilings().await?;
        let result = self.calculator.evaluate(request, &ceilings)?;

        debug!(
            total_income = %request.total_income,
            deduction = %result.total_deduction,
            gross_tax = %result.gross_tax,
            net_tax = %result.net_tax,
            refund = %result.refund,
            "calculated tax"
        );
        Ok(result)
    }

    /// Validates the new ceiling against the kind's bounds and stores it.
    pub async fn update_ceiling(
        &self,
        kind: DeductionKind,
        amount: Option<Decimal>,
    ) -> Result<DeductionCeiling, ServiceError> {
        let amount = validate_ceiling(kind, amount)?;
        let ceiling = self.repository.set_ceiling(kind, amount).await?;

        info!(kind = %kind, amount = %ceiling.max_amount, "updated deduction ceiling");
        Ok(ceiling)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::db::InMemoryCeilingRepository;
    use crate::models::DeductionClaim;

    async fn seeded_service() -> TaxService {
        let service = TaxService::new(Arc::new(InMemoryCeilingRepository::new()));
        service.prepare_store().await.unwrap();
        service
    }

    fn request(claims: Vec<DeductionClaim>) -> CalculationRequest {
        CalculationRequest {
            total_income: dec!(500000),
            withholding: dec!(0),
            claims,
        }
    }

    #[tokio::test]
    async fn prepare_store_returns_seeded_ceilings() {
        let service = TaxService::new(Arc::new(InMemoryCeilingRepository::new()));

        let ceilings = service.prepare_store().await.unwrap();

        assert_eq!(ceilings.len(), 3);
    }

    #[tokio::test]
    async fn calculate_uses_stored_ceilings() {
        let service = seeded_service().await;

        let result = service
            .calculate(&request(vec![DeductionClaim::Personal]))
            .await
            .unwrap();

        assert_eq!(result.net_tax, dec!(29000));
    }

    #[tokio::test]
    async fn updated_personal_ceiling_applies_to_next_calculation() {
        let service = seeded_service().await;

        service
            .update_ceiling(DeductionKind::Personal, Some(dec!(70000)))
            .await
            .unwrap();
        let result = service
            .calculate(&request(vec![DeductionClaim::Personal]))
            .await
            .unwrap();

        assert_eq!(result.total_deduction, dec!(70000));
        assert_eq!(result.net_tax, dec!(28000));
    }

    #[tokio::test]
    async fn updated_k_receipt_ceiling_caps_claims() {
        let service = seeded_service().await;

        service
            .update_ceiling(DeductionKind::KReceipt, Some(dec!(20000)))
            .await
            .unwrap();
        let result = service
            .calculate(&request(vec![
                DeductionClaim::Personal,
                DeductionClaim::KReceipt(dec!(50000)),
            ]))
            .await
            .unwrap();

        assert_eq!(result.total_deduction, dec!(80000));
    }

    #[tokio::test]
    async fn out_of_range_update_is_rejected_and_not_stored() {
        let service = seeded_service().await;

        let result = service
            .update_ceiling(DeductionKind::Personal, Some(dec!(5000)))
            .await;

        assert!(matches!(
            result,
            Err(ServiceError::Validation(ValidationError::CeilingOutOfRange { .. }))
        ));
        let ceilings = service.ceilings().await.unwrap();
        assert_eq!(
            crate::calculations::CeilingLookup::ceiling(&ceilings, DeductionKind::Personal),
            Some(dec!(60000))
        );
    }

    #[tokio::test]
    async fn unseeded_store_fails_calculation() {
        let service = TaxService::new(Arc::new(InMemoryCeilingRepository::new()));

        let result = service
            .calculate(&request(vec![DeductionClaim::Personal]))
            .await;

        assert!(matches!(
            result,
            Err(ServiceError::Deduction(DeductionError::MissingCeiling(
                DeductionKind::Personal
            )))
        ));
    }

    #[tokio::test]
    async fn repeated_calculations_are_identical() {
        let service = seeded_service().await;
        let request = request(vec![
            DeductionClaim::Personal,
            DeductionClaim::Donation(dec!(12345.67)),
        ]);

        let first = service.calculate(&request).await.unwrap();
        let second = service.calculate(&request).await.unwrap();

        assert_eq!(first, second);
    }
}
