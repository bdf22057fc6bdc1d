use std::io::Read;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::Serialize;
use tax_core::calculations::{CeilingLookup, DeductionError, TaxCalculator};
use tax_core::validation::validate_calculation;
use tax_core::{CalculationRequest, CalculationResult, DeductionKind};
use thiserror::Error;

/// Required header row, in order.
pub const HEADER: [&str; 3] = ["totalIncome", "wht", "donation"];

/// Errors that can occur while reading a batch file.
///
/// Row numbers count data rows from 1; the header is not counted.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BatchError {
    #[error("CSV header doesn't match, expected: {}", HEADER.join(", "))]
    Header,

    #[error("row {row}: {reason}")]
    Row { row: usize, reason: String },

    #[error("CSV parse error: {0}")]
    Csv(String),
}

impl From<csv::Error> for BatchError {
    fn from(err: csv::Error) -> Self {
        BatchError::Csv(err.to_string())
    }
}

/// A fully parsed and validated batch file.
///
/// Parsing is all-or-nothing: the first bad row aborts the whole file, so
/// holding a `BatchFile` means every row is a valid calculation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchFile {
    requests: Vec<CalculationRequest>,
}

/// One evaluated row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchOutcome {
    pub total_income: Decimal,
    pub result: CalculationResult,
}

impl BatchFile {
    /// Parse CSV data from any reader, such as a file or a byte slice.
    ///
    /// Cells are trimmed before parsing. Each row must hold exactly three
    /// decimal cells and pass the same checks as a single calculation
    /// request; the row's donation becomes a donation claim and the personal
    /// allowance is added implicitly.
    pub fn parse<R: Read>(reader: R) -> Result<Self, BatchError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = csv_reader.headers()?;
        if !headers.iter().eq(HEADER) {
            return Err(BatchError::Header);
        }

        let mut requests = Vec::new();
        for (index, record) in csv_reader.records().enumerate() {
            let row = index + 1;
            let record = record?;
            requests.push(parse_row(row, &record)?);
        }

        Ok(Self { requests })
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    pub fn requests(&self) -> &[CalculationRequest] {
        &self.requests
    }

    /// Evaluates rows one at a time, in file order, against `ceilings`.
    pub fn results<L>(
        self,
        ceilings: &L,
    ) -> impl Iterator<Item = Result<BatchOutcome, DeductionError>>
    where
        L: CeilingLookup + ?Sized,
    {
        let calculator = TaxCalculator::default();
        self.requests.into_iter().map(move |request| {
            calculator
                .evaluate(&request, ceilings)
                .map(|result| BatchOutcome {
                    total_income: request.total_income,
                    result,
                })
        })
    }
}

fn parse_row(
    row: usize,
    record: &csv::StringRecord,
) -> Result<CalculationRequest, BatchError> {
    if record.len() != HEADER.len() {
        return Err(BatchError::Row {
            row,
            reason: format!("expected {} columns, found {}", HEADER.len(), record.len()),
        });
    }

    let mut cells = [Decimal::ZERO; 3];
    for (cell, (column, value)) in cells.iter_mut().zip(HEADER.iter().zip(record.iter())) {
        *cell = Decimal::from_str(value).map_err(|_| BatchError::Row {
            row,
            reason: format!("cannot convert {} value '{}' to a number", column, value),
        })?;
    }
    let [total_income, withholding, donation] = cells;

    validate_calculation(
        Some(total_income),
        Some(withholding),
        [(DeductionKind::Donation.as_str(), Some(donation))],
    )
    .map_err(|e| BatchError::Row {
        row,
        reason: e.to_string(),
    })
}

/// Serialized form of a batch run: `{"taxes": [...]}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    pub taxes: Vec<BatchEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchEntry {
    #[serde(with = "rust_decimal::serde::float")]
    pub total_income: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub tax: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub tax_refund: Decimal,
}

impl From<BatchOutcome> for BatchEntry {
    fn from(outcome: BatchOutcome) -> Self {
        Self {
            total_income: outcome.total_income,
            tax: outcome.result.net_tax,
            tax_refund: outcome.result.refund,
        }
    }
}

impl FromIterator<BatchOutcome> for BatchReport {
    fn from_iter<I: IntoIterator<Item = BatchOutcome>>(iter: I) -> Self {
        Self {
            taxes: iter.into_iter().map(BatchEntry::from).collect(),
        }
    }
}
