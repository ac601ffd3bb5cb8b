//! The seam between the query engine and a concrete SQL driver.
//!
//! [`SqlExecutor`] is the whole capability the engine consumes: prepare,
//! execute/fetch a bound statement, last insert id and transaction control.
//! [`Connector`] opens one executor from a [`DatabaseConfig`].

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::config::DatabaseConfig;
use crate::error::DataAccessError;
use crate::results::{CustomDbRow, ResultSet};
use crate::types::{ParamType, RowValues};

/// A parameter attached to a prepared statement.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundParam {
    /// Placeholder name without its `:`/`@`/`$` prefix
    pub name: String,
    pub value: RowValues,
    pub ty: ParamType,
}

/// A statement the executor has accepted, plus the parameters bound to it so far.
///
/// Created by [`SqlExecutor::prepare`], consumed by one execution.
#[derive(Debug, Clone)]
pub struct PreparedStatement {
    sql: Arc<str>,
    placeholders: Vec<String>,
    bindings: Vec<BoundParam>,
}

/// Strip the sigil from a placeholder name: `:name`, `@name`, `$name` → `name`.
#[must_use]
pub fn normalize_placeholder(name: &str) -> &str {
    name.strip_prefix([':', '@', '$']).unwrap_or(name)
}

impl PreparedStatement {
    /// `placeholders` are the statement's parameter names in order; sigils are stripped.
    pub fn new(sql: impl Into<Arc<str>>, placeholders: Vec<String>) -> Self {
        Self {
            sql: sql.into(),
            placeholders: placeholders
                .into_iter()
                .map(|p| normalize_placeholder(&p).to_string())
                .collect(),
            bindings: Vec::new(),
        }
    }

    #[must_use]
    pub fn sql(&self) -> &str {
        &self.sql
    }

    #[must_use]
    pub fn placeholders(&self) -> &[String] {
        &self.placeholders
    }

    #[must_use]
    pub fn bindings(&self) -> &[BoundParam] {
        &self.bindings
    }

    /// Attach a value to a placeholder. Binding the same name again replaces the value.
    ///
    /// # Errors
    /// Returns `DataAccessError::ExecutionError` if the statement has no such placeholder.
    pub fn bind(
        &mut self,
        name: &str,
        value: RowValues,
        ty: ParamType,
    ) -> Result<(), DataAccessError> {
        let name = normalize_placeholder(name);
        if !self.placeholders.iter().any(|p| p == name) {
            return Err(DataAccessError::ExecutionError(format!(
                "parameter :{name} is not defined in statement: {}",
                self.sql
            )));
        }
        let param = BoundParam {
            name: name.to_string(),
            value,
            ty,
        };
        match self.bindings.iter_mut().find(|b| b.name == name) {
            Some(existing) => *existing = param,
            None => self.bindings.push(param),
        }
        Ok(())
    }

    /// Every placeholder must have exactly one bound value before execution.
    ///
    /// # Errors
    /// Returns `DataAccessError::ExecutionError` naming the unbound placeholders.
    pub fn ensure_fully_bound(&self) -> Result<(), DataAccessError> {
        let missing: Vec<&str> = self
            .placeholders
            .iter()
            .filter(|p| !self.bindings.iter().any(|b| &b.name == *p))
            .map(String::as_str)
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(DataAccessError::ExecutionError(format!(
                "unbound parameter(s) {} in statement: {}",
                missing.join(", "),
                self.sql
            )))
        }
    }
}

/// A live session with a SQL engine.
///
/// Implementations must surface driver failures as the matching
/// [`DataAccessError`] kind: prepare failures as `SyntaxError`, runtime
/// failures as `ExecutionError`, transaction misuse as `TransactionError`.
#[async_trait]
pub trait SqlExecutor: Send + Sync + fmt::Debug {
    /// Compile `sql` and report its placeholders.
    async fn prepare(&self, sql: &str) -> Result<PreparedStatement, DataAccessError>;

    /// Run a bound statement; returns the number of rows it changed.
    async fn execute(&self, stmt: &PreparedStatement) -> Result<usize, DataAccessError>;

    /// Run a bound statement and collect every row.
    async fn fetch_all(&self, stmt: &PreparedStatement) -> Result<ResultSet, DataAccessError>;

    /// Run a bound statement and keep the first row, if any.
    async fn fetch_one(
        &self,
        stmt: &PreparedStatement,
    ) -> Result<Option<CustomDbRow>, DataAccessError> {
        Ok(self.fetch_all(stmt).await?.into_first())
    }

    /// Run one or more unparameterized statements.
    async fn execute_batch(&self, sql: &str) -> Result<(), DataAccessError>;

    /// Identifier generated by the most recent INSERT on this session.
    async fn last_insert_id(&self) -> Result<i64, DataAccessError>;

    async fn begin(&self) -> Result<(), DataAccessError>;

    async fn commit(&self) -> Result<(), DataAccessError>;

    async fn rollback(&self) -> Result<(), DataAccessError>;

    async fn in_transaction(&self) -> Result<bool, DataAccessError>;
}

/// Opens an executor from configuration. One call per connection attempt.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(
        &self,
        config: &DatabaseConfig,
    ) -> Result<Arc<dyn SqlExecutor>, DataAccessError>;
}
