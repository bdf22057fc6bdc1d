//! Progressive tax calculation over the bracket table.
//!
//! # Algorithm
//!
//! 1. Taxable income is total income minus total deduction, floored at zero.
//! 2. Brackets are walked in ascending order:
//!    - a bracket whose upper bound is below the taxable income contributes
//!      its full-band tax;
//!    - the first bracket that is not exceeded is the marginal bracket and
//!      contributes `(taxable - lower + 1) * rate / 100`;
//!    - every bracket above the marginal one contributes zero.
//! 3. Gross tax is the sum of the contributions. Withholding is subtracted
//!    and a negative balance becomes a refund.
//!
//! An income exactly on an upper bound stays in that bracket; the `+ 1`
//! accounts for each band starting one unit above the previous band's end.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use tax_core::calculations::TaxCalculator;
//!
//! let calculator = TaxCalculator::default();
//! let result = calculator.calculate(dec!(500000), dec!(0), dec!(60000));
//!
//! assert_eq!(result.taxable_income, dec!(440000));
//! assert_eq!(result.net_tax, dec!(29000));
//! assert_eq!(result.refund, dec!(0));
//! assert_eq!(result.breakdown.len(), 5);
//! ```

use rust_decimal::Decimal;

use crate::calculations::brackets::brackets;
use crate::calculations::common::max;
use crate::calculations::deductions::{CeilingLookup, DeductionError, resolve_deductions};
use crate::models::{Bracket, BracketTax, CalculationRequest, CalculationResult};

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

#[derive(Debug, Clone, Copy)]
pub struct TaxCalculator<'a> {
    brackets: &'a [Bracket],
}

impl Default for TaxCalculator<'static> {
    fn default() -> Self {
        Self::new(brackets())
    }
}

impl<'a> TaxCalculator<'a> {
    /// Brackets must be contiguous and sorted by `lower_bound`.
    pub fn new(brackets: &'a [Bracket]) -> Self {
        Self { brackets }
    }

    /// Resolves the request's claims against `ceilings` and calculates.
    ///
    /// # Errors
    ///
    /// Only fails when a claimed deduction kind has no ceiling.
    pub fn evaluate<L>(
        &self,
        request: &CalculationRequest,
        ceilings: &L,
    ) -> Result<CalculationResult, DeductionError>
    where
        L: CeilingLookup + ?Sized,
    {
        let total_deduction = resolve_deductions(&request.claims, ceilings)?;
        Ok(self.calculate(
            request.total_income,
            request.withholding,
            total_deduction,
        ))
    }

    /// Calculates tax for already-resolved deductions. Never fails.
    pub fn calculate(
        &self,
        total_income: Decimal,
        withholding: Decimal,
        total_deduction: Decimal,
    ) -> CalculationResult {
        let taxable_income = self.taxable_income(total_income, total_deduction);
        let breakdown = self.breakdown(taxable_income);
        let gross_tax = breakdown.iter().map(|b| b.tax).sum::<Decimal>();
        let (net_tax, refund) = self.settle(gross_tax, withholding);

        CalculationResult {
            total_deduction,
            taxable_income,
            gross_tax,
            net_tax,
            refund,
            breakdown,
        }
    }

    /// Income minus deductions, floored at zero.
    fn taxable_income(
        &self,
        total_income: Decimal,
        total_deduction: Decimal,
    ) -> Decimal {
        max(total_income - total_deduction, Decimal::ZERO)
    }

    /// Per-bracket tax, one entry for every bracket.
    fn breakdown(
        &self,
        taxable_income: Decimal,
    ) -> Vec<BracketTax> {
        let mut reached_marginal = false;

        self.brackets
            .iter()
            .map(|bracket| {
                let tax = match bracket.upper_bound {
                    Some(upper) if taxable_income > upper => {
                        bracket.max_tax_in_bracket.unwrap_or(Decimal::ZERO)
                    }
                    _ if !reached_marginal => {
                        reached_marginal = true;
                        self.marginal_tax(bracket, taxable_income)
                    }
                    _ => Decimal::ZERO,
                };
                BracketTax {
                    name: bracket.name,
                    tax,
                }
            })
            .collect()
    }

    fn marginal_tax(
        &self,
        bracket: &Bracket,
        taxable_income: Decimal,
    ) -> Decimal {
        (taxable_income - bracket.lower_bound + Decimal::ONE) * bracket.rate_percent / HUNDRED
    }

    /// Splits `gross - withholding` into (tax payable, refund).
    fn settle(
        &self,
        gross_tax: Decimal,
        withholding: Decimal,
    ) -> (Decimal, Decimal) {
        let net = gross_tax - withholding;
        if net < Decimal::ZERO {
            (Decimal::ZERO, net.abs())
        } else {
            (net, Decimal::ZERO)
        }
    }
}
