pub mod calculations;
pub mod db;
pub mod models;
pub mod service;
pub mod validation;

pub use db::repository::{CeilingRepository, RepositoryError};
pub use models::*;
pub use service::{ServiceError, TaxService};
