pub mod factory;
pub mod memory;
pub mod repository;

pub use factory::{DbConfig, RepositoryFactory, RepositoryRegistry};
pub use memory::{InMemoryCeilingRepository, InMemoryRepositoryFactory};
pub use repository::{CeilingRepository, RepositoryError};
