//! Lazily-opened, shared connection handle and transaction boundaries.
//!
//! A [`ConnectionManager`] owns at most one executor. The first
//! [`ConnectionManager::get_instance`] call opens it; later calls return the
//! same handle. A failed open is recorded and returned as `ConnectionError`
//! from every later call: there is exactly one attempt per manager.
//!
//! Managers are normally injected into each [`crate::QueryEngine`]. For code
//! that wants one process-wide instance, [`install_global`] / [`global`] hold
//! a single manager behind a `OnceLock`.

use std::fmt;
use std::sync::{Arc, OnceLock};

use tokio::sync::Mutex;
use tracing::{info, trace, warn};

use crate::config::DatabaseConfig;
use crate::error::DataAccessError;
use crate::executor::{Connector, SqlExecutor};
use crate::helpers;
use crate::sqlite::SqliteConnector;

enum HandleState {
    Unopened,
    Open(Arc<dyn SqlExecutor>),
    Failed(String),
    Closed,
}

/// Observable lifecycle of a manager's handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionState {
    Unopened,
    Open,
    /// The single open attempt failed; carries the recorded message
    Failed(String),
    Closed,
}

pub struct ConnectionManager {
    config: DatabaseConfig,
    connector: Box<dyn Connector>,
    state: Mutex<HandleState>,
}

impl fmt::Debug for ConnectionManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionManager")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl ConnectionManager {
    /// Manager backed by SQLite. Nothing is opened until first use.
    #[must_use]
    pub fn new(config: DatabaseConfig) -> Self {
        Self::with_connector(config, SqliteConnector)
    }

    /// Manager with a caller-supplied connector.
    #[must_use]
    pub fn with_connector(config: DatabaseConfig, connector: impl Connector + 'static) -> Self {
        Self {
            config,
            connector: Box::new(connector),
            state: Mutex::new(HandleState::Unopened),
        }
    }

    #[must_use]
    pub fn config(&self) -> &DatabaseConfig {
        &self.config
    }

    /// [`helpers::hash_password_with_cost`] at the configured `password_cost`.
    ///
    /// # Errors
    /// Returns `DataAccessError::PasswordHash` if the configured cost is zero or hashing fails.
    pub fn hash_password(&self, plain: &str) -> Result<String, DataAccessError> {
        helpers::hash_password_with_cost(plain, self.config.password_cost)
    }

    /// The shared handle, opening it on first call.
    ///
    /// # Errors
    /// Returns `DataAccessError::ConnectionError` if the open attempt fails (now or
    /// on an earlier call), or if the manager has been closed.
    pub async fn get_instance(&self) -> Result<Arc<dyn SqlExecutor>, DataAccessError> {
        let mut state = self.state.lock().await;
        match &*state {
            HandleState::Open(handle) => return Ok(Arc::clone(handle)),
            HandleState::Failed(message) => {
                return Err(DataAccessError::ConnectionError(message.clone()));
            }
            HandleState::Closed => {
                return Err(DataAccessError::ConnectionError(
                    "connection manager is closed".into(),
                ));
            }
            HandleState::Unopened => {}
        }

        match self.connector.connect(&self.config).await {
            Ok(handle) => {
                info!(dsn = %self.config.redacted_dsn(), "database connection opened");
                *state = HandleState::Open(Arc::clone(&handle));
                Ok(handle)
            }
            Err(err) => {
                let message = match err {
                    DataAccessError::ConnectionError(message) => message,
                    other => other.to_string(),
                };
                warn!(
                    dsn = %self.config.redacted_dsn(),
                    error = %message,
                    "database connection failed"
                );
                *state = HandleState::Failed(message.clone());
                Err(DataAccessError::ConnectionError(message))
            }
        }
    }

    /// Open the handle now instead of on first use.
    ///
    /// # Errors
    /// Same as [`Self::get_instance`].
    pub async fn open(&self) -> Result<(), DataAccessError> {
        self.get_instance().await.map(|_| ())
    }

    /// Release the handle. Later calls fail with `ConnectionError`.
    ///
    /// Statements or sessions still holding the handle keep it alive until they drop it.
    pub async fn close(&self) {
        let mut state = self.state.lock().await;
        if matches!(*state, HandleState::Open(_)) {
            info!(dsn = %self.config.redacted_dsn(), "database connection closed");
        }
        *state = HandleState::Closed;
    }

    pub async fn state(&self) -> ConnectionState {
        match &*self.state.lock().await {
            HandleState::Unopened => ConnectionState::Unopened,
            HandleState::Open(_) => ConnectionState::Open,
            HandleState::Failed(message) => ConnectionState::Failed(message.clone()),
            HandleState::Closed => ConnectionState::Closed,
        }
    }

    /// # Errors
    /// `TransactionError` if a transaction is already active, `ConnectionError` if no handle.
    pub async fn begin_transaction(&self) -> Result<(), DataAccessError> {
        trace!("begin transaction");
        self.get_instance().await?.begin().await
    }

    /// # Errors
    /// `TransactionError` if no transaction is active, `ConnectionError` if no handle.
    pub async fn commit(&self) -> Result<(), DataAccessError> {
        trace!("commit transaction");
        self.get_instance().await?.commit().await
    }

    /// # Errors
    /// `TransactionError` if no transaction is active, `ConnectionError` if no handle.
    pub async fn roll_back(&self) -> Result<(), DataAccessError> {
        trace!("roll back transaction");
        self.get_instance().await?.rollback().await
    }

    /// # Errors
    /// `ConnectionError` if no handle.
    pub async fn in_transaction(&self) -> Result<bool, DataAccessError> {
        self.get_instance().await?.in_transaction().await
    }
}

static GLOBAL: OnceLock<Arc<ConnectionManager>> = OnceLock::new();

/// Install the process-wide manager. Only the first installation wins.
///
/// # Errors
/// Returns `DataAccessError::ConfigError` if a manager is already installed.
pub fn install_global(
    manager: ConnectionManager,
) -> Result<Arc<ConnectionManager>, DataAccessError> {
    let manager = Arc::new(manager);
    GLOBAL.set(Arc::clone(&manager)).map_err(|_| {
        DataAccessError::ConfigError("global connection manager already installed".into())
    })?;
    Ok(manager)
}

/// The process-wide manager.
///
/// # Errors
/// Returns `DataAccessError::ConnectionError` if [`install_global`] has not run.
pub fn global() -> Result<Arc<ConnectionManager>, DataAccessError> {
    GLOBAL.get().cloned().ok_or_else(|| {
        DataAccessError::ConnectionError("no global connection manager installed".into())
    })
}
