use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use axum::middleware;
use axum::routing::{get, post};
use tax_core::TaxService;
use tax_core::db::{DbConfig, InMemoryRepositoryFactory, RepositoryRegistry};
use tax_db_sqlite::SqliteRepositoryFactory;
use tracing::info;

use crate::auth::{Credentials, require_basic_auth};
use crate::handlers::{admin, health, tax};

/// Application state shared across requests.
#[derive(Clone)]
pub struct AppState {
    pub service: TaxService,
    pub credentials: Credentials,
}

impl AppState {
    pub fn new(
        service: TaxService,
        credentials: Credentials,
    ) -> Self {
        Self {
            service,
            credentials,
        }
    }
}

/// Registry with every backend this service can run on.
pub fn build_registry() -> RepositoryRegistry {
    let mut registry = RepositoryRegistry::new();
    registry.register(Box::new(SqliteRepositoryFactory));
    registry.register(Box::new(InMemoryRepositoryFactory));
    registry
}

/// Opens the configured ceiling store and seeds missing defaults. Every
/// ceiling is logged once at startup.
pub async fn open_service(config: &DbConfig) -> Result<TaxService> {
    let repo = build_registry()
        .create(config)
        .await
        .with_context(|| {
            format!(
                "Failed to open {} store: {}",
                config.backend, config.connection_string
            )
        })?;
    let service = TaxService::new(Arc::from(repo));
    let ceilings = service
        .prepare_store()
        .await
        .context("Failed to seed deduction ceilings")?;
    for ceiling in &ceilings {
        info!(
            kind = %ceiling.kind,
            max_amount = %ceiling.max_amount,
            updated_at = %ceiling.updated_at,
            "deduction ceiling"
        );
    }
    Ok(service)
}

pub fn build_router(state: AppState) -> Router {
    let admin_routes = Router::new()
        .route("/deductions/personal", post(admin::set_personal))
        .route("/deductions/k-receipt", post(admin::set_k_receipt))
        .route_layer(middleware::from_fn_with_state(
            state.credentials.clone(),
            require_basic_auth,
        ));

    Router::new()
        .route("/health", get(health::health))
        .route("/tax/calculations", post(tax::calculate))
        .route("/tax/calculations/upload-csv", post(tax::upload_csv))
        .nest("/admin", admin_routes)
        .with_state(state)
}
