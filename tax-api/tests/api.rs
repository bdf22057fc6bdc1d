//! End-to-end tests driving the router with in-memory ceiling stores.

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use tax_api::{AppState, Credentials, build_router, open_service};
use tax_core::db::DbConfig;
use tower::ServiceExt;

const BOUNDARY: &str = "X-TAX-API-BOUNDARY";

async fn setup_app(backend: &str) -> Router {
    let service = open_service(&DbConfig {
        backend: backend.to_string(),
        connection_string: ":memory:".to_string(),
    })
    .await
    .expect("Failed to open service");
    build_router(AppState::new(service, Credentials::new("adminTax", "admin!")))
}

async fn send(
    app: &Router,
    request: Request<Body>,
) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn json_post(
    uri: &str,
    body: impl Into<Body>,
) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(body.into())
        .unwrap()
}

fn admin_post(
    uri: &str,
    user_pass: &str,
    body: Value,
) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .header(
            header::AUTHORIZATION,
            format!("Basic {}", STANDARD.encode(user_pass)),
        )
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn upload(
    field: &str,
    file_name: &str,
    contents: &str,
) -> Request<Body> {
    let body = format!(
        "--{BOUNDARY}\r\n\
         Content-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\"\r\n\
         Content-Type: text/csv\r\n\
         \r\n\
         {contents}\r\n\
         --{BOUNDARY}--\r\n"
    );
    Request::post("/tax/calculations/upload-csv")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

fn levels(taxes: [f64; 5]) -> Value {
    let names = [
        "0-150,000",
        "150,001-500,000",
        "500,001-1,000,000",
        "1,000,001-2,000,000",
        "2,000,001 ขึ้นไป",
    ];
    names
        .iter()
        .zip(taxes)
        .map(|(level, tax)| json!({ "level": level, "tax": tax }))
        .collect()
}

#[tokio::test]
async fn health_reports_ok() {
    let app = setup_app("memory").await;

    let request = Request::get("/health").body(Body::empty()).unwrap();
    let (status, body) = send(&app, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ok" }));
}

#[tokio::test]
async fn calculates_with_personal_allowance_only() {
    let app = setup_app("memory").await;

    let request = json_post(
        "/tax/calculations",
        json!({ "totalIncome": 500000.0, "wht": 0.0, "allowances": [] }).to_string(),
    );
    let (status, body) = send(&app, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "tax": 29000.0,
            "taxRefund": 0.0,
            "taxLevel": levels([0.0, 29000.0, 0.0, 0.0, 0.0]),
        })
    );
}

#[tokio::test]
async fn allowances_are_optional() {
    let app = setup_app("memory").await;

    let request = json_post(
        "/tax/calculations",
        json!({ "totalIncome": 500000, "wht": 0 }).to_string(),
    );
    let (status, body) = send(&app, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["tax"], json!(29000.0));
}

#[tokio::test]
async fn withholding_above_tax_becomes_refund() {
    let app = setup_app("memory").await;

    let request = json_post(
        "/tax/calculations",
        json!({
            "totalIncome": 500000.0,
            "wht": 30000.0,
            "allowances": [{ "allowanceType": "donation", "amount": 10000.0 }]
        })
        .to_string(),
    );
    let (status, body) = send(&app, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["tax"], json!(0.0));
    assert_eq!(body["taxRefund"], json!(2000.0));
    assert_eq!(body["taxLevel"], levels([0.0, 28000.0, 0.0, 0.0, 0.0]));
}

#[tokio::test]
async fn donation_is_capped_at_ceiling() {
    let app = setup_app("sqlite").await;

    let request = json_post(
        "/tax/calculations",
        json!({
            "totalIncome": 500000.0,
            "wht": 0.0,
            "allowances": [{ "allowanceType": "donation", "amount": 200000.0 }]
        })
        .to_string(),
    );
    let (status, body) = send(&app, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["tax"], json!(19000.0));
}

#[tokio::test]
async fn first_baht_of_second_band_is_taxed() {
    let app = setup_app("memory").await;

    let request = json_post(
        "/tax/calculations",
        json!({ "totalIncome": 210001, "wht": 0 }).to_string(),
    );
    let (_, body) = send(&app, request).await;

    assert_eq!(body["tax"], json!(0.1));
}

#[tokio::test]
async fn malformed_body_is_a_binding_error() {
    let app = setup_app("memory").await;

    let request = json_post("/tax/calculations", "{\"totalIncome\": ");
    let (status, body) = send(&app, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "message": "Error when binding JSON" }));
}

#[tokio::test]
async fn wrong_json_type_is_a_binding_error() {
    let app = setup_app("memory").await;
    let malformed = [
        json!({ "totalIncome": "lots", "wht": 0 }),
        json!({ "totalIncome": "500000", "wht": "0" }),
        json!({ "totalIncome": 500000, "wht": 0,
                "allowances": [{ "allowanceType": "donation", "amount": "100" }] }),
    ];

    for body in malformed {
        let request = json_post("/tax/calculations", body.to_string());
        let (status, response) = send(&app, request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST, "body: {body}");
        assert_eq!(response["message"], "Error when binding JSON", "body: {body}");
    }
}

#[tokio::test]
async fn string_ceiling_amount_is_a_binding_error() {
    let app = setup_app("memory").await;

    let request = admin_post(
        "/admin/deductions/personal",
        "adminTax:admin!",
        json!({ "amount": "70000" }),
    );
    let (status, body) = send(&app, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "message": "Error when binding JSON" }));
}

#[tokio::test]
async fn huge_income_fails_validation() {
    let app = setup_app("memory").await;

    let request = json_post("/tax/calculations", r#"{"totalIncome": 1e20, "wht": 0}"#);
    let (status, body) = send(&app, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "message": "Validation fields does not pass" }));
}

#[tokio::test]
async fn invalid_fields_fail_validation() {
    let app = setup_app("memory").await;
    let invalid = [
        json!({ "wht": 0 }),
        json!({ "totalIncome": 500000 }),
        json!({ "totalIncome": -1, "wht": 0 }),
        json!({ "totalIncome": 100, "wht": 200 }),
        json!({ "totalIncome": 100, "wht": 0,
                "allowances": [{ "allowanceType": "insurance", "amount": 1 }] }),
        json!({ "totalIncome": 100, "wht": 0,
                "allowances": [{ "allowanceType": "personal", "amount": 1 }] }),
        json!({ "totalIncome": 100, "wht": 0,
                "allowances": [{ "allowanceType": "donation" }] }),
        json!({ "totalIncome": 100, "wht": 0,
                "allowances": [{ "allowanceType": "k-receipt", "amount": -5 }] }),
    ];

    for body in invalid {
        let request = json_post("/tax/calculations", body.to_string());
        let (status, response) = send(&app, request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST, "body: {body}");
        assert_eq!(
            response,
            json!({ "message": "Validation fields does not pass" }),
            "body: {body}"
        );
    }
}

#[tokio::test]
async fn admin_requires_credentials() {
    let app = setup_app("memory").await;

    let request = json_post(
        "/admin/deductions/personal",
        json!({ "amount": 70000 }).to_string(),
    );
    let response = app.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(response.headers().contains_key(header::WWW_AUTHENTICATE));
}

#[tokio::test]
async fn admin_rejects_wrong_password() {
    let app = setup_app("memory").await;

    let request = admin_post(
        "/admin/deductions/k-receipt",
        "adminTax:wrong",
        json!({ "amount": 70000 }),
    );
    let (status, body) = send(&app, request).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({ "message": "Unauthorized" }));
}

#[tokio::test]
async fn personal_allowance_update_applies_to_calculations() {
    let app = setup_app("sqlite").await;

    let request = admin_post(
        "/admin/deductions/personal",
        "adminTax:admin!",
        json!({ "amount": 70000.0 }),
    );
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "personalDeduction": 70000.0 }));

    let request = json_post(
        "/tax/calculations",
        json!({ "totalIncome": 500000, "wht": 0 }).to_string(),
    );
    let (_, body) = send(&app, request).await;
    assert_eq!(body["tax"], json!(28000.0));
}

#[tokio::test]
async fn k_receipt_update_raises_the_cap() {
    let app = setup_app("memory").await;

    let request = admin_post(
        "/admin/deductions/k-receipt",
        "adminTax:admin!",
        json!({ "amount": 100000 }),
    );
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "kReceipt": 100000.0 }));

    let request = json_post(
        "/tax/calculations",
        json!({
            "totalIncome": 500000,
            "wht": 0,
            "allowances": [{ "allowanceType": "k-receipt", "amount": 200000 }]
        })
        .to_string(),
    );
    let (_, body) = send(&app, request).await;
    assert_eq!(body["tax"], json!(19000.0));
}

#[tokio::test]
async fn admin_updates_outside_bounds_fail_validation() {
    let app = setup_app("memory").await;
    let cases = [
        ("/admin/deductions/personal", json!({ "amount": 9999 })),
        ("/admin/deductions/personal", json!({ "amount": 100001 })),
        ("/admin/deductions/personal", json!({})),
        ("/admin/deductions/k-receipt", json!({ "amount": 0 })),
        ("/admin/deductions/k-receipt", json!({ "amount": 100001 })),
    ];

    for (uri, body) in cases {
        let request = admin_post(uri, "adminTax:admin!", body.clone());
        let (status, response) = send(&app, request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri} {body}");
        assert_eq!(response["message"], "Validation fields does not pass");
    }
}

#[tokio::test]
async fn uploads_batch_file() {
    let app = setup_app("memory").await;

    let csv = "totalIncome,wht,donation\n500000,0,0\n600000,40000,20000\n750000,50000,15000";
    let (status, body) = send(&app, upload("taxFile", "taxes.csv", csv)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "taxes": [
                { "totalIncome": 500000.0, "tax": 29000.0, "taxRefund": 0.0 },
                { "totalIncome": 600000.0, "tax": 0.0, "taxRefund": 2000.0 },
                { "totalIncome": 750000.0, "tax": 11250.0, "taxRefund": 0.0 },
            ]
        })
    );
}

#[tokio::test]
async fn upload_requires_expected_file_name() {
    let app = setup_app("memory").await;

    let csv = "totalIncome,wht,donation\n500000,0,0";
    let (status, body) = send(&app, upload("taxFile", "other.csv", csv)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "message": "File name must be taxes.csv" }));
}

#[tokio::test]
async fn upload_requires_expected_field() {
    let app = setup_app("memory").await;

    let csv = "totalIncome,wht,donation\n500000,0,0";
    let (status, body) = send(&app, upload("file", "taxes.csv", csv)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "message": "No file key: taxFile in form-data" }));
}

#[tokio::test]
async fn upload_rejects_bad_header() {
    let app = setup_app("memory").await;

    let csv = "income,wht,donation\n500000,0,0";
    let (status, body) = send(&app, upload("taxFile", "taxes.csv", csv)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({ "message": "CSV header doesn't match, expected: totalIncome, wht, donation" })
    );
}

#[tokio::test]
async fn upload_rejects_bad_row() {
    let app = setup_app("memory").await;

    let csv = "totalIncome,wht,donation\n500000,0,0\n500000,abc,0";
    let (status, body) = send(&app, upload("taxFile", "taxes.csv", csv)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["message"],
        "row 2: cannot convert wht value 'abc' to a number"
    );
}

#[tokio::test]
async fn upload_rejects_huge_income() {
    let app = setup_app("memory").await;

    let csv = "totalIncome,wht,donation\n70000000000000000000000000000,0,0";
    let (status, body) = send(&app, upload("taxFile", "taxes.csv", csv)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(
        body["message"].as_str().unwrap().starts_with("row 1: totalIncome exceeds the maximum"),
        "{body}"
    );
}

#[tokio::test]
async fn upload_without_multipart_is_rejected() {
    let app = setup_app("memory").await;

    let request = json_post("/tax/calculations/upload-csv", "{}");
    let response = app.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
