use std::sync::Arc;

use tracing::debug;

use crate::connection::ConnectionManager;
use crate::error::DataAccessError;
use crate::executor::PreparedStatement;
use crate::results::{CustomDbRow, ResultSet};
use crate::types::{ParamType, RowValues};

mod verbs;

/// A data-access session: one prepared statement in flight at a time, run on
/// the handle of a shared [`ConnectionManager`].
///
/// The statement lifecycle is `query` → `bind`* → `execute` / `result_set` /
/// `single`. Every method that touches the statement takes `&mut self`, so a
/// session cannot interleave two statements; share the manager, not the engine,
/// across tasks.
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use sql_dal::prelude::*;
///
/// # async fn demo() -> Result<(), DataAccessError> {
/// let manager = Arc::new(ConnectionManager::new(DatabaseConfig::builder(":memory:").finish()));
/// let mut db = QueryEngine::new(manager);
/// db.execute_batch("CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT, age INTEGER)").await?;
///
/// db.create("users", &FieldMap::new().with("name", "Ada").with("age", 30)).await?;
/// let rows = db.read("users", &ConditionMap::new().with("name", "Ada")).await?;
/// assert_eq!(rows.len(), 1);
/// # Ok(()) }
/// ```
#[derive(Debug)]
pub struct QueryEngine {
    manager: Arc<ConnectionManager>,
    statement: Option<PreparedStatement>,
    last_row_count: usize,
}

impl QueryEngine {
    #[must_use]
    pub fn new(manager: Arc<ConnectionManager>) -> Self {
        Self {
            manager,
            statement: None,
            last_row_count: 0,
        }
    }

    #[must_use]
    pub fn manager(&self) -> &Arc<ConnectionManager> {
        &self.manager
    }

    /// Prepare `sql`, replacing any statement this session still holds.
    ///
    /// # Errors
    /// `ConnectionError` if no handle can be obtained, `SyntaxError` if the SQL is rejected.
    pub async fn query(&mut self, sql: &str) -> Result<(), DataAccessError> {
        self.statement = None;
        let handle = self.manager.get_instance().await?;
        let stmt = handle.prepare(sql).await?;
        debug!(sql, placeholders = ?stmt.placeholders(), "prepared statement");
        self.statement = Some(stmt);
        Ok(())
    }

    /// Bind a value to a placeholder of the current statement (`name` or `:name`).
    ///
    /// With `ty == None` the type comes from [`ParamType::infer`].
    ///
    /// # Errors
    /// `ExecutionError` if no statement is prepared or it has no such placeholder.
    pub fn bind(
        &mut self,
        name: &str,
        value: impl Into<RowValues>,
        ty: Option<ParamType>,
    ) -> Result<(), DataAccessError> {
        let stmt = self.statement.as_mut().ok_or_else(|| {
            DataAccessError::ExecutionError(format!("bind of :{name} before any query"))
        })?;
        let value = value.into();
        let ty = ParamType::resolve(ty, &value);
        stmt.bind(name, value, ty)
    }

    /// Detach the current statement for execution once every placeholder is bound.
    /// An incompletely bound statement stays in place.
    fn take_statement(&mut self) -> Result<PreparedStatement, DataAccessError> {
        let stmt = self.statement.take().ok_or_else(|| {
            DataAccessError::ExecutionError("execute called before any query".into())
        })?;
        if let Err(err) = stmt.ensure_fully_bound() {
            self.statement = Some(stmt);
            return Err(err);
        }
        Ok(stmt)
    }

    /// Run the current statement.
    ///
    /// # Errors
    /// `ExecutionError` on unbound placeholders, constraint violations, type
    /// mismatches or a lost connection.
    pub async fn execute(&mut self) -> Result<bool, DataAccessError> {
        self.last_row_count = 0;
        let stmt = self.take_statement()?;
        let handle = self.manager.get_instance().await?;
        self.last_row_count = handle.execute(&stmt).await?;
        Ok(true)
    }

    /// Run the current statement and return every row (possibly none).
    ///
    /// # Errors
    /// Same as [`Self::execute`].
    pub async fn result_set(&mut self) -> Result<ResultSet, DataAccessError> {
        self.last_row_count = 0;
        let stmt = self.take_statement()?;
        let handle = self.manager.get_instance().await?;
        let rows = handle.fetch_all(&stmt).await?;
        self.last_row_count = rows.len();
        Ok(rows)
    }

    /// Run the current statement and return its first row; `None` when nothing matched.
    ///
    /// # Errors
    /// Same as [`Self::execute`].
    pub async fn single(&mut self) -> Result<Option<CustomDbRow>, DataAccessError> {
        self.last_row_count = 0;
        let stmt = self.take_statement()?;
        let handle = self.manager.get_instance().await?;
        let row = handle.fetch_one(&stmt).await?;
        self.last_row_count = usize::from(row.is_some());
        Ok(row)
    }

    /// Rows changed by the last INSERT/UPDATE/DELETE run through this session.
    ///
    /// After a read it holds the number of rows returned.
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.last_row_count
    }

    /// # Errors
    /// `ConnectionError` if no handle can be obtained.
    pub async fn last_insert_id(&self) -> Result<i64, DataAccessError> {
        self.manager.get_instance().await?.last_insert_id().await
    }

    /// Run unparameterized SQL (DDL, scripts). Does not touch the current statement.
    ///
    /// # Errors
    /// `ExecutionError` if any statement fails.
    pub async fn execute_batch(&self, sql: &str) -> Result<(), DataAccessError> {
        debug!(sql, "execute batch");
        self.manager.get_instance().await?.execute_batch(sql).await
    }

    /// # Errors
    /// See [`ConnectionManager::begin_transaction`].
    pub async fn begin_transaction(&self) -> Result<(), DataAccessError> {
        self.manager.begin_transaction().await
    }

    /// # Errors
    /// See [`ConnectionManager::commit`].
    pub async fn commit(&self) -> Result<(), DataAccessError> {
        self.manager.commit().await
    }

    /// # Errors
    /// See [`ConnectionManager::roll_back`].
    pub async fn roll_back(&self) -> Result<(), DataAccessError> {
        self.manager.roll_back().await
    }
}
