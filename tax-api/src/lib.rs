//! HTTP service for personal income tax calculation.

pub mod app;
pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod logging;

pub use app::{AppState, build_registry, build_router, open_service};
pub use auth::Credentials;
pub use config::Config;
pub use error::ApiError;
