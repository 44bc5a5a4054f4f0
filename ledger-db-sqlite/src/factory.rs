use std::path::PathBuf;

use async_trait::async_trait;
use ledger_core::db::{DbConfig, RepositoryFactory};
use ledger_core::{LedgerRepository, RepositoryError};
use tracing::info;

use crate::repository::SqliteRepository;

/// Directory holding the seed SQL files.
///
/// `LEDGER_DB_SQLITE_SEEDS_DIR` wins when set; otherwise `./seeds` if it
/// exists, falling back to the crate's own `seeds` directory.
fn seeds_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("LEDGER_DB_SQLITE_SEEDS_DIR") {
        return PathBuf::from(dir);
    }
    let cwd_seeds = PathBuf::from("./seeds");
    if cwd_seeds.is_dir() {
        return cwd_seeds;
    }
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("seeds")
}

/// Turns a connection string into a sqlx SQLite URL.
///
/// `sqlite:` URLs pass through unchanged, `:memory:` becomes the in-memory
/// URL, and anything else is a file path opened with `mode=rwc` so a fresh
/// file is created.
fn connection_url(connection_string: &str) -> String {
    let trimmed = connection_string.trim();
    if trimmed.starts_with("sqlite:") {
        trimmed.to_string()
    } else if trimmed == ":memory:" {
        "sqlite::memory:".to_string()
    } else {
        format!("sqlite:{trimmed}?mode=rwc")
    }
}

/// The `"sqlite"` backend.
///
/// ```rust,no_run
/// use ledger_core::db::RepositoryRegistry;
/// use ledger_db_sqlite::SqliteRepositoryFactory;
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

    /// Connects to `config.connection_string`, migrates and seeds.
    ///
    /// Accepts a sqlx URL such as `sqlite:ledger.db?mode=rwc`, `:memory:`,
    /// or a bare file path like `ledger.db`, which is created if missing.
    async fn create(
        &self,
        config: &DbConfig,
    ) -> Result<Box<dyn LedgerRepository>, RepositoryError> {
        let url = connection_url(&config.connection_string);
        let repo = SqliteRepository::new(&url)
            .await
            .map_err(|e| RepositoryError::Connection(format!("{e:#}")))?;
        repo.run_migrations()
            .await
            .map_err(|e| RepositoryError::Database(format!("{e:#}")))?;

        let seeds = seeds_dir();
        repo.run_seeds(&seeds)
            .await
            .map_err(|e| RepositoryError::Database(format!("{e:#}")))?;

        info!(
            connection = %config.connection_string,
            seeds = %seeds.display(),
            "sqlite ledger opened"
        );
        Ok(Box::new(repo))
    }
}
