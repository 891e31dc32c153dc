//! Lazily opened, process-wide database handle.
//!
//! Bootstrap constructs one [`ConnectionProvider`] and hands the resulting
//! [`Database`] to everything that needs storage. The handle is opened on the
//! first call to [`ConnectionProvider::get_connection`]; concurrent first calls
//! wait on the same initialization and observe the same handle.

use tokio::sync::OnceCell;
use tracing::info;

use super::Database;

/// Environment variable a host process uses to supply the database location.
pub const DATABASE_PATH_ENV: &str = "DATABASE_PATH";

/// Database file used when no location is supplied, relative to the working directory.
pub const DEFAULT_DATABASE_FILE: &str = "colegio.db";

/// Pick the storage location: a host-supplied path wins over the default file.
pub fn resolve_database_path(host_path: Option<&str>) -> String {
    match host_path.map(str::trim) {
        Some(path) if !path.is_empty() => path.to_string(),
        _ => DEFAULT_DATABASE_FILE.to_string(),
    }
}

pub struct ConnectionProvider {
    path: String,
    database: OnceCell<Database>,
}

impl ConnectionProvider {
    /// Create a provider for an explicit path. Nothing is opened yet.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            database: OnceCell::new(),
        }
    }

    /// Create a provider for the host-supplied path, or the default file.
    pub fn resolve(host_path: Option<&str>) -> Self {
        Self::new(resolve_database_path(host_path))
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Return the shared handle, opening the database on first use.
    ///
    /// Open failures are returned to the caller as-is.
    pub async fn get_connection(&self) -> Result<&Database, sqlx::Error> {
        self.database
            .get_or_try_init(|| async {
                let db = Database::open(&self.path).await?;
                info!(path = %self.path, "Database opened");
                Ok::<_, sqlx::Error>(db)
            })
            .await
    }
}
