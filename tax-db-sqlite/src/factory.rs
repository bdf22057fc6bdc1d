use async_trait::async_trait;

use tax_core::db::{CeilingRepository, DbConfig, RepositoryError, RepositoryFactory};
use tracing::info;

use crate::repository::SqliteRepository;

/// Map a connection string onto the sqlx URL form.
///
/// * `":memory:"` becomes `"sqlite::memory:"`.
/// * Strings already carrying the `sqlite:` scheme pass through.
/// * Anything else is treated as a file path.
fn database_url(connection_string: &str) -> String {
    match connection_string {
        ":memory:" => "sqlite::memory:".to_string(),
        s if s.starts_with("sqlite:") => s.to_string(),
        path => format!("sqlite:{}", path),
    }
}

/// [`RepositoryFactory`] for SQLite.
///
/// Register this with a [`tax_core::db::RepositoryRegistry`] to make the
/// `"sqlite"` backend available:
///
/// ```rust,no_run
/// use tax_core::db::RepositoryRegistry;
/// use tax_db_sqlite::SqliteRepositoryFactory;
///
/// let mut registry = RepositoryRegistry::new();
/// registry.register(Box::new(SqliteRepositoryFactory));
/// ```
pub struct SqliteRepositoryFactory;

#[async_trait]
impl RepositoryFactory for SqliteRepositoryFactory {
    fn backend_name(&self) -> &'static str {
        "sqlite"
    }

    /// Open the database described by `config.connection_string` and bring
    /// its schema up to date. The file is created if it does not exist.
    async fn create(
        &self,
        config: &DbConfig,
    ) -> Result<Box<dyn CeilingRepository>, RepositoryError> {
        let url = database_url(&config.connection_string);
        let repo = SqliteRepository::new(&url).await?;
        repo.run_migrations().await?;
        info!(url = %url, "sqlite ceiling store ready");
        Ok(Box::new(repo))
    }
}
