use thiserror::Error;

/// Taxonomy kind of a [`DataAccessError`], for callers that only care about the category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Connection,
    Syntax,
    Execution,
    InvalidInput,
    Transaction,
    Config,
    PasswordHash,
    Io,
}

#[derive(Debug, Error)]
pub enum DataAccessError {
    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("SQL syntax error: {0}")]
    SyntaxError(String),

    #[error("SQL execution error: {0}")]
    ExecutionError(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Transaction error: {0}")]
    TransactionError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Password hash error: {0}")]
    PasswordHash(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl DataAccessError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ConnectionError(_) => ErrorKind::Connection,
            Self::SyntaxError(_) => ErrorKind::Syntax,
            Self::ExecutionError(_) => ErrorKind::Execution,
            Self::InvalidInput(_) => ErrorKind::InvalidInput,
            Self::TransactionError(_) => ErrorKind::Transaction,
            Self::ConfigError(_) => ErrorKind::Config,
            Self::PasswordHash(_) => ErrorKind::PasswordHash,
            Self::Io(_) => ErrorKind::Io,
        }
    }
}

impl From<toml::de::Error> for DataAccessError {
    fn from(err: toml::de::Error) -> Self {
        DataAccessError::ConfigError(format!("invalid TOML configuration: {err}"))
    }
}

impl From<pbkdf2::password_hash::Error> for DataAccessError {
    fn from(err: pbkdf2::password_hash::Error) -> Self {
        DataAccessError::PasswordHash(err.to_string())
    }
}

impl From<tokio::task::JoinError> for DataAccessError {
    fn from(err: tokio::task::JoinError) -> Self {
        DataAccessError::ExecutionError(format!("sqlite spawn_blocking join error: {err}"))
    }
}
