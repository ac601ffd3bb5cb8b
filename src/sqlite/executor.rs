use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use rusqlite::Connection;
use tokio::sync::Mutex;

use crate::error::DataAccessError;
use crate::executor::{PreparedStatement, SqlExecutor};
use crate::results::ResultSet;

use super::query::{bind_all, build_result_set, execution_error, placeholder_names};

pub(crate) type SharedSqliteConnection = Arc<Mutex<Connection>>;

/// One shared `rusqlite` connection; every call runs on the blocking pool.
pub struct SqliteExecutor {
    conn: SharedSqliteConnection,
}

impl SqliteExecutor {
    pub(crate) fn new(conn: SharedSqliteConnection) -> Self {
        Self { conn }
    }

    /// Run `func` against the raw connection on tokio's blocking pool.
    ///
    /// # Errors
    /// Returns whatever `func` returns, or `DataAccessError::ExecutionError` if the task panics.
    pub async fn with_connection<F, R>(&self, func: F) -> Result<R, DataAccessError>
    where
        F: FnOnce(&mut Connection) -> Result<R, DataAccessError> + Send + 'static,
        R: Send + 'static,
    {
        run_blocking(Arc::clone(&self.conn), func).await
    }
}

impl fmt::Debug for SqliteExecutor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqliteExecutor").finish_non_exhaustive()
    }
}

pub(crate) async fn run_blocking<F, R>(
    conn: SharedSqliteConnection,
    func: F,
) -> Result<R, DataAccessError>
where
    F: FnOnce(&mut Connection) -> Result<R, DataAccessError> + Send + 'static,
    R: Send + 'static,
{
    tokio::task::spawn_blocking(move || {
        let mut guard = conn.blocking_lock();
        func(&mut guard)
    })
    .await?
}

fn transaction_error(err: rusqlite::Error) -> DataAccessError {
    DataAccessError::TransactionError(err.to_string())
}

#[async_trait]
impl SqlExecutor for SqliteExecutor {
    async fn prepare(&self, sql: &str) -> Result<PreparedStatement, DataAccessError> {
        let sql: Arc<str> = Arc::from(sql);
        self.with_connection(move |conn| {
            let stmt = conn
                .prepare_cached(&sql)
                .map_err(|e| DataAccessError::SyntaxError(e.to_string()))?;
            let names = placeholder_names(&stmt);
            Ok(PreparedStatement::new(sql, names))
        })
        .await
    }

    async fn execute(&self, stmt: &PreparedStatement) -> Result<usize, DataAccessError> {
        let prepared = stmt.clone();
        self.with_connection(move |conn| {
            let mut stmt = conn
                .prepare_cached(prepared.sql())
                .map_err(|e| DataAccessError::SyntaxError(e.to_string()))?;
            bind_all(&mut stmt, prepared.bindings())?;

            if stmt.column_count() > 0 {
                // statements that return rows are stepped to completion
                let readonly = stmt.readonly();
                let mut rows = stmt.raw_query();
                while rows.next().map_err(execution_error)?.is_some() {}
                drop(rows);
                drop(stmt);
                if readonly {
                    return Ok(0);
                }
                return usize::try_from(conn.changes())
                    .map_err(|e| DataAccessError::ExecutionError(e.to_string()));
            }
            stmt.raw_execute().map_err(execution_error)
        })
        .await
    }

    async fn fetch_all(&self, stmt: &PreparedStatement) -> Result<ResultSet, DataAccessError> {
        let prepared = stmt.clone();
        self.with_connection(move |conn| {
            let mut stmt = conn
                .prepare_cached(prepared.sql())
                .map_err(|e| DataAccessError::SyntaxError(e.to_string()))?;
            bind_all(&mut stmt, prepared.bindings())?;
            build_result_set(&mut stmt)
        })
        .await
    }

    async fn execute_batch(&self, sql: &str) -> Result<(), DataAccessError> {
        let sql = sql.to_owned();
        self.with_connection(move |conn| conn.execute_batch(&sql).map_err(execution_error))
            .await
    }

    async fn last_insert_id(&self) -> Result<i64, DataAccessError> {
        self.with_connection(|conn| Ok(conn.last_insert_rowid()))
            .await
    }

    async fn begin(&self) -> Result<(), DataAccessError> {
        self.with_connection(|conn| {
            if !conn.is_autocommit() {
                return Err(DataAccessError::TransactionError(
                    "a transaction is already active".into(),
                ));
            }
            conn.execute_batch("BEGIN").map_err(transaction_error)
        })
        .await
    }

    async fn commit(&self) -> Result<(), DataAccessError> {
        self.with_connection(|conn| {
            if conn.is_autocommit() {
                return Err(DataAccessError::TransactionError(
                    "commit without an active transaction".into(),
                ));
            }
            conn.execute_batch("COMMIT").map_err(transaction_error)
        })
        .await
    }

    async fn rollback(&self) -> Result<(), DataAccessError> {
        self.with_connection(|conn| {
            if conn.is_autocommit() {
                return Err(DataAccessError::TransactionError(
                    "rollback without an active transaction".into(),
                ));
            }
            conn.execute_batch("ROLLBACK").map_err(transaction_error)
        })
        .await
    }

    async fn in_transaction(&self) -> Result<bool, DataAccessError> {
        self.with_connection(|conn| Ok(!conn.is_autocommit())).await
    }
}
