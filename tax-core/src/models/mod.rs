mod calculation;
mod deduction_ceiling;
mod deduction_claim;
mod deduction_kind;
mod tax_bracket;

pub use calculation::{CalculationRequest, CalculationResult};
pub use deduction_ceiling::DeductionCeiling;
pub use deduction_claim::DeductionClaim;
pub use deduction_kind::{CeilingBounds, DeductionKind};
pub use tax_bracket::{Bracket, BracketTax};
