use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::DeductionKind;

/// Persisted maximum for one deduction kind. For [`DeductionKind::Personal`]
/// the amount is the allowance itself rather than a cap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeductionCeiling {
    pub kind: DeductionKind,
    pub max_amount: Decimal,
    pub updated_at: DateTime<Utc>,
}
