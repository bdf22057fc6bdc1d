use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tax_core::DeductionKind;

use crate::app::AppState;
use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct CeilingBody {
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub amount: Option<Decimal>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalDeductionResponse {
    #[serde(with = "rust_decimal::serde::float")]
    pub personal_deduction: Decimal,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KReceiptResponse {
    #[serde(with = "rust_decimal::serde::float")]
    pub k_receipt: Decimal,
}

async fn update(
    state: &AppState,
    kind: DeductionKind,
    body: Result<Json<CeilingBody>, JsonRejection>,
) -> Result<Decimal, ApiError> {
    let Json(body) = body?;
    let ceiling = state.service.update_ceiling(kind, body.amount).await?;
    Ok(ceiling.max_amount)
}

/// `POST /admin/deductions/personal`
pub async fn set_personal(
    State(state): State<AppState>,
    body: Result<Json<CeilingBody>, JsonRejection>,
) -> Result<Json<PersonalDeductionResponse>, ApiError> {
    let personal_deduction = update(&state, DeductionKind::Personal, body).await?;
    Ok(Json(PersonalDeductionResponse { personal_deduction }))
}

/// `POST /admin/deductions/k-receipt`
pub async fn set_k_receipt(
    State(state): State<AppState>,
    body: Result<Json<CeilingBody>, JsonRejection>,
) -> Result<Json<KReceiptResponse>, ApiError> {
    let k_receipt = update(&state, DeductionKind::KReceipt, body).await?;
    Ok(Json(KReceiptResponse { k_receipt }))
}
