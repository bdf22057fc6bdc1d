use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{BracketTax, DeductionClaim};

/// A validated request ready for the calculation engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculationRequest {
    pub total_income: Decimal,
    pub withholding: Decimal,
    pub claims: Vec<DeductionClaim>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalculationResult {
    pub total_deduction: Decimal,
    pub taxable_income: Decimal,
    pub gross_tax: Decimal,

    // Exactly one of these is non-zero unless gross tax equals withholding.
    pub net_tax: Decimal,
    pub refund: Decimal,

    /// One entry per bracket, in bracket order.
    pub breakdown: Vec<BracketTax>,
}
