use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeductionKind {
    Personal,
    Donation,
    KReceipt,
}

impl DeductionKind {
    pub const ALL: [DeductionKind; 3] = [Self::Personal, Self::Donation, Self::KReceipt];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Personal => "personal",
            Self::Donation => "donation",
            Self::KReceipt => "k-receipt",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "personal" => Some(Self::Personal),
            "donation" => Some(Self::Donation),
            "k-receipt" => Some(Self::KReceipt),
            _ => None,
        }
    }

    /// Ceiling seeded into an empty store.
    pub fn default_ceiling(&self) -> Decimal {
        match self {
            Self::Personal => Decimal::from(60_000),
            Self::Donation => Decimal::from(100_000),
            Self::KReceipt => Decimal::from(50_000),
        }
    }

    /// Range an administrator may set this ceiling to.
    pub fn ceiling_bounds(&self) -> CeilingBounds {
        match self {
            Self::Personal => CeilingBounds {
                min: Decimal::from(10_000),
                min_inclusive: true,
                max: Decimal::from(100_000),
            },
            Self::Donation | Self::KReceipt => CeilingBounds {
                min: Decimal::ZERO,
                min_inclusive: false,
                max: Decimal::from(100_000),
            },
        }
    }
}

impl std::fmt::Display for DeductionKind {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Admissible interval for a ceiling update. The upper bound is always inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CeilingBounds {
    pub min: Decimal,
    pub min_inclusive: bool,
    pub max: Decimal,
}

impl CeilingBounds {
    pub fn contains(
        &self,
        amount: Decimal,
    ) -> bool {
        let above_min = if self.min_inclusive {
            amount >= self.min
        } else {
            amount > self.min
        };
        above_min && amount <= self.max
    }
}
