use rust_decimal::Decimal;
use serde::Serialize;

/// One progressive tax band. `None` bounds mean the band is open-ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Bracket {
    pub name: &'static str,
    pub lower_bound: Decimal,
    pub upper_bound: Option<Decimal>,
    pub rate_percent: Decimal,
    /// Tax owed on the full span of this band.
    pub max_tax_in_bracket: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BracketTax {
    pub name: &'static str,
    pub tax: Decimal,
}
