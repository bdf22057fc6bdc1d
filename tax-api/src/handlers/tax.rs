use axum::Json;
use axum::extract::multipart::MultipartRejection;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Multipart, State};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tax_core::validation::validate_calculation;
use tax_core::{CalculationResult, ServiceError};
use tax_data::{BatchFile, BatchReport};
use tracing::info;

use crate::app::AppState;
use crate::error::ApiError;

/// Multipart field that must carry the batch file.
pub const CSV_FIELD: &str = "taxFile";
/// Required file name of the uploaded batch file.
pub const CSV_FILE_NAME: &str = "taxes.csv";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculationBody {
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub total_income: Option<Decimal>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub wht: Option<Decimal>,
    #[serde(default)]
    pub allowances: Vec<AllowanceBody>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllowanceBody {
    pub allowance_type: String,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub amount: Option<Decimal>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculationResponse {
    #[serde(with = "rust_decimal::serde::float")]
    pub tax: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub tax_refund: Decimal,
    pub tax_level: Vec<TaxLevel>,
}

#[derive(Debug, Serialize)]
pub struct TaxLevel {
    pub level: &'static str,
    #[serde(with = "rust_decimal::serde::float")]
    pub tax: Decimal,
}

impl From<CalculationResult> for CalculationResponse {
    fn from(result: CalculationResult) -> Self {
        Self {
            tax: result.net_tax,
            tax_refund: result.refund,
            tax_level: result
                .breakdown
                .into_iter()
                .map(|b| TaxLevel {
                    level: b.name,
                    tax: b.tax,
                })
                .collect(),
        }
    }
}

/// `POST /tax/calculations`
pub async fn calculate(
    State(state): State<AppState>,
    body: Result<Json<CalculationBody>, JsonRejection>,
) -> Result<Json<CalculationResponse>, ApiError> {
    let Json(body) = body?;
    let request = validate_calculation(
        body.total_income,
        body.wht,
        body.allowances
            .iter()
            .map(|a| (a.allowance_type.as_str(), a.amount)),
    )?;

    let result = state.service.calculate(&request).await?;
    Ok(Json(result.into()))
}

/// `POST /tax/calculations/upload-csv`
pub async fn upload_csv(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<BatchReport>, ApiError> {
    let mut multipart = multipart.map_err(|e| ApiError::Upload(e.body_text()))?;

    let mut contents = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::Upload(format!("Error while reading form data: {}", e)))?
    {
        if field.name() != Some(CSV_FIELD) {
            continue;
        }
        if field.file_name() != Some(CSV_FILE_NAME) {
            return Err(ApiError::Upload(format!(
                "File name must be {}",
                CSV_FILE_NAME
            )));
        }
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::Upload(format!("Error while reading CSV file: {}", e)))?;
        contents = Some(bytes);
        break;
    }

    let contents = contents.ok_or_else(|| {
        ApiError::Upload(format!("No file key: {} in form-data", CSV_FIELD))
    })?;

    let batch = BatchFile::parse(contents.as_ref())?;
    let ceilings = state.service.ceilings().await?;
    let rows = batch.len();
    let report = batch
        .results(&ceilings)
        .collect::<Result<BatchReport, _>>()
        .map_err(ServiceError::from)?;

    info!(rows, "evaluated uploaded batch");
    Ok(Json(report))
}
