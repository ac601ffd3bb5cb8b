use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rusqlite::Connection;
use tokio::sync::Mutex;

use crate::config::DatabaseConfig;
use crate::error::DataAccessError;
use crate::executor::{Connector, SqlExecutor};

use super::executor::SqliteExecutor;

/// Opens a [`SqliteExecutor`] on `config.database`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteConnector;

fn is_in_memory(path: &str) -> bool {
    path == ":memory:" || path.contains("mode=memory") || path.starts_with("file::memory:")
}

/// Open the connection, apply pragmas and run a smoke-test query.
///
/// # Errors
/// Returns `DataAccessError::ConfigError` for an unsupported charset and
/// `DataAccessError::ConnectionError` if SQLite cannot open or use the database.
pub fn open_connection(config: &DatabaseConfig) -> Result<Connection, DataAccessError> {
    let encoding = config.encoding()?;
    let connection_error =
        |e: rusqlite::Error| DataAccessError::ConnectionError(format!("{}: {e}", config.database));

    let conn = Connection::open(&config.database).map_err(connection_error)?;
    conn.busy_timeout(Duration::from_millis(config.busy_timeout_ms))
        .map_err(connection_error)?;
    // only takes effect before the database file has content
    conn.execute_batch(&format!(
        "PRAGMA encoding = '{}'; PRAGMA foreign_keys = ON;",
        encoding.pragma_value()
    ))
    .map_err(connection_error)?;
    if !is_in_memory(&config.database) {
        conn.execute_batch("PRAGMA journal_mode = WAL;")
            .map_err(connection_error)?;
    }
    conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))
        .map_err(connection_error)?;
    Ok(conn)
}

#[async_trait]
impl Connector for SqliteConnector {
    async fn connect(
        &self,
        config: &DatabaseConfig,
    ) -> Result<Arc<dyn SqlExecutor>, DataAccessError> {
        let config = config.clone();
        let conn = tokio::task::spawn_blocking(move || open_connection(&config)).await??;
        Ok(Arc::new(SqliteExecutor::new(Arc::new(Mutex::new(conn)))))
    }
}
