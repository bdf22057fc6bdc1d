//! Input validation in front of the calculation engine.
//!
//! Everything arriving from outside (JSON bodies, CSV rows, admin updates) is
//! checked here and turned into typed values. The engine itself assumes its
//! inputs already passed these checks.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use thiserror::Error;

use crate::models::{CalculationRequest, DeductionClaim, DeductionKind};

/// Largest income, withholding or allowance amount accepted. Keeps every
/// bracket product well inside `Decimal` range.
pub const MAX_AMOUNT: Decimal = dec!(1000000000000000);

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("{field} must not be negative (got {value})")]
    Negative { field: &'static str, value: Decimal },

    #[error("{field} exceeds the maximum of {max} (got {value})")]
    TooLarge {
        field: &'static str,
        value: Decimal,
        max: Decimal,
    },

    #[error("withholding {withholding} exceeds total income {total_income}")]
    WithholdingExceedsIncome {
        withholding: Decimal,
        total_income: Decimal,
    },

    #[error("unsupported allowance type '{0}'")]
    UnsupportedAllowanceType(String),

    #[error("{kind} ceiling {amount} is outside the permitted range")]
    CeilingOutOfRange { kind: DeductionKind, amount: Decimal },
}

/// Checks that income is non-negative and withholding lies within `[0, income]`.
pub fn validate_income(
    total_income: Option<Decimal>,
    withholding: Option<Decimal>,
) -> Result<(Decimal, Decimal), ValidationError> {
    let total_income = amount_in_range("totalIncome", total_income)?;
    let withholding = amount_in_range("wht", withholding)?;

    if withholding > total_income {
        return Err(ValidationError::WithholdingExceedsIncome {
            withholding,
            total_income,
        });
    }

    Ok((total_income, withholding))
}

/// Builds a [`CalculationRequest`] from loosely typed input.
///
/// Only `donation` and `k-receipt` may be declared; the personal allowance is
/// always appended and cannot be claimed explicitly.
pub fn validate_calculation<'a, I>(
    total_income: Option<Decimal>,
    withholding: Option<Decimal>,
    allowances: I,
) -> Result<CalculationRequest, ValidationError>
where
    I: IntoIterator<Item = (&'a str, Option<Decimal>)>,
{
    let (total_income, withholding) = validate_income(total_income, withholding)?;

    let mut claims = allowances
        .into_iter()
        .map(|(allowance_type, amount)| validate_claim(allowance_type, amount))
        .collect::<Result<Vec<_>, _>>()?;
    claims.push(DeductionClaim::Personal);

    Ok(CalculationRequest {
        total_income,
        withholding,
        claims,
    })
}

fn validate_claim(
    allowance_type: &str,
    amount: Option<Decimal>,
) -> Result<DeductionClaim, ValidationError> {
    match DeductionKind::parse(allowance_type) {
        Some(DeductionKind::Donation) => Ok(DeductionClaim::Donation(amount_in_range("amount", amount)?)),
        Some(DeductionKind::KReceipt) => Ok(DeductionClaim::KReceipt(amount_in_range("amount", amount)?)),
        Some(DeductionKind::Personal) | None => Err(ValidationError::UnsupportedAllowanceType(
            allowance_type.to_string(),
        )),
    }
}

/// Checks an administrator's new ceiling against the kind's bounds.
pub fn validate_ceiling(
    kind: DeductionKind,
    amount: Option<Decimal>,
) -> Result<Decimal, ValidationError> {
    let amount = amount.ok_or(ValidationError::MissingField("amount"))?;

    if !kind.ceiling_bounds().contains(amount) {
        return Err(ValidationError::CeilingOutOfRange { kind, amount });
    }

    Ok(amount)
}

fn amount_in_range(
    field: &'static str,
    value: Option<Decimal>,
) -> Result<Decimal, ValidationError> {
    let value = value.ok_or(ValidationError::MissingField(field))?;
    if value < Decimal::ZERO {
        return Err(ValidationError::Negative { field, value });
    }
    if value > MAX_AMOUNT {
        return Err(ValidationError::TooLarge {
            field,
            value,
            max: MAX_AMOUNT,
        });
    }
    Ok(value)
}
