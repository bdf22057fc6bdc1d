use std::path::PathBuf;

use clap::Parser;
use tax_core::db::DbConfig;

use crate::auth::Credentials;

/// Personal income tax calculation service.
///
/// Every option can also be supplied through the environment variable
/// shown next to it.
#[derive(Parser, Debug, Clone)]
#[command(name = "tax-api")]
#[command(version, about, long_about = None)]
pub struct Config {
    /// Port to listen on
    #[arg(long, env = "PORT", default_value_t = 8080)]
    pub port: u16,

    /// Address to bind
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Ceiling store backend (sqlite or memory)
    #[arg(long, env = "DB_BACKEND", default_value = "sqlite")]
    pub db_backend: String,

    /// Database path or sqlx URL; ":memory:" for an ephemeral database
    #[arg(long, env = "DATABASE_URL", default_value = "taxes.db")]
    pub database_url: String,

    /// User name for the admin endpoints
    #[arg(long, env = "ADMIN_USERNAME")]
    pub admin_username: String,

    /// Password for the admin endpoints
    #[arg(long, env = "ADMIN_PASSWORD", hide_env_values = true)]
    pub admin_password: String,

    /// Also append log output to this file
    #[arg(long, env = "LOG_FILE")]
    pub log_file: Option<PathBuf>,
}

impl Config {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn db_config(&self) -> DbConfig {
        DbConfig {
            backend: self.db_backend.clone(),
            connection_string: self.database_url.clone(),
        }
    }

    pub fn credentials(&self) -> Credentials {
        Credentials::new(&self.admin_username, &self.admin_password)
    }
}
