use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::DeductionKind;

/// A deduction declared by the taxpayer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeductionClaim {
    /// Fixed allowance; the stored ceiling is used verbatim.
    Personal,
    Donation(Decimal),
    KReceipt(Decimal),
}

impl DeductionClaim {
    pub fn kind(&self) -> DeductionKind {
        match self {
            Self::Personal => DeductionKind::Personal,
            Self::Donation(_) => DeductionKind::Donation,
            Self::KReceipt(_) => DeductionKind::KReceipt,
        }
    }
}
