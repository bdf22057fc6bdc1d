//! Deduction resolution against configured ceilings.
//!
//! Personal allowance is a fixed amount equal to its ceiling. Donation and
//! k-receipt claims are capped at their ceilings. Resolved values are summed
//! with exact decimal addition.

use std::collections::HashMap;

use rust_decimal::Decimal;
use thiserror::Error;

use crate::calculations::common::min;
use crate::models::{DeductionCeiling, DeductionClaim, DeductionKind};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DeductionError {
    #[error("no ceiling configured for deduction type '{0}'")]
    MissingCeiling(DeductionKind),
}

/// Source of the current ceiling for each deduction kind.
pub trait CeilingLookup {
    fn ceiling(
        &self,
        kind: DeductionKind,
    ) -> Option<Decimal>;
}

/// A point-in-time snapshot of the ceiling store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeductionCeilings {
    amounts: HashMap<DeductionKind, Decimal>,
}

impl DeductionCeilings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Jurisdiction defaults for every kind.
    pub fn defaults() -> Self {
        DeductionKind::ALL
            .into_iter()
            .fold(Self::new(), |ceilings, kind| ceilings.with(kind, kind.default_ceiling()))
    }

    pub fn with(
        mut self,
        kind: DeductionKind,
        amount: Decimal,
    ) -> Self {
        self.insert(kind, amount);
        self
    }

    pub fn insert(
        &mut self,
        kind: DeductionKind,
        amount: Decimal,
    ) {
        self.amounts.insert(kind, amount);
    }
}

impl CeilingLookup for DeductionCeilings {
    fn ceiling(
        &self,
        kind: DeductionKind,
    ) -> Option<Decimal> {
        self.amounts.get(&kind).copied()
    }
}

impl FromIterator<DeductionCeiling> for DeductionCeilings {
    fn from_iter<I: IntoIterator<Item = DeductionCeiling>>(iter: I) -> Self {
        let amounts = iter
            .into_iter()
            .map(|ceiling| (ceiling.kind, ceiling.max_amount))
            .collect();
        Self { amounts }
    }
}

/// Resolves a single claim into the amount it deducts.
///
/// # Errors
///
/// [`DeductionError::MissingCeiling`] if the lookup has no ceiling for the
/// claim's kind.
pub fn resolve_claim<L>(
    claim: &DeductionClaim,
    lookup: &L,
) -> Result<Decimal, DeductionError>
where
    L: CeilingLookup + ?Sized,
{
    let kind = claim.kind();
    let ceiling = lookup
        .ceiling(kind)
        .ok_or(DeductionError::MissingCeiling(kind))?;

    Ok(match claim {
        DeductionClaim::Personal => ceiling,
        DeductionClaim::Donation(amount) | DeductionClaim::KReceipt(amount) => {
            min(*amount, ceiling)
        }
    })
}

/// Resolves every claim and returns the total deduction.
pub fn resolve_deductions<L>(
    claims: &[DeductionClaim],
    lookup: &L,
) -> Result<Decimal, DeductionError>
where
    L: CeilingLookup + ?Sized,
{
    claims.iter().try_fold(Decimal::ZERO, |total, claim| {
        Ok(total + resolve_claim(claim, lookup)?)
    })
}
