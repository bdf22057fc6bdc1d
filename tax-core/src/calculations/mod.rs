//! Thai personal income tax calculation.
//!
//! The engine is split into three pure pieces: the static bracket table, the
//! deduction resolver that caps claims against configured ceilings, and the
//! calculator that walks the brackets. None of them perform I/O; ceilings are
//! injected through [`CeilingLookup`].

pub mod brackets;
pub mod calculator;
pub mod common;
pub mod deductions;

pub use brackets::{BRACKETS, brackets};
pub use calculator::TaxCalculator;
pub use deductions::{
    CeilingLookup, DeductionCeilings, DeductionError, resolve_claim, resolve_deductions,
};
