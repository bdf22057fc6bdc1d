//! CSV batch evaluation on top of `tax-core`.

pub mod batch;

pub use batch::{BatchEntry, BatchError, BatchFile, BatchOutcome, BatchReport, HEADER};
