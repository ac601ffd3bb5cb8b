use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use serde::Deserialize;

use crate::error::DataAccessError;

/// Connection settings, loaded once before the first connection is opened.
///
/// For the SQLite backend `database` is a file path (or `:memory:`); `host`,
/// `username` and `password` are only carried for diagnostics.
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub host: String,
    pub database: String,
    pub username: String,
    pub password: String,
    pub charset: String,
    pub busy_timeout_ms: u64,
    /// PBKDF2 rounds used by [`crate::ConnectionManager::hash_password`]
    pub password_cost: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            database: ":memory:".to_string(),
            username: String::new(),
            password: String::new(),
            charset: "utf8mb4".to_string(),
            busy_timeout_ms: 5_000,
            password_cost: crate::helpers::DEFAULT_PASSWORD_COST,
        }
    }
}

impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("host", &self.host)
            .field("database", &self.database)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("charset", &self.charset)
            .field("busy_timeout_ms", &self.busy_timeout_ms)
            .field("password_cost", &self.password_cost)
            .finish()
    }
}

/// Text encoding requested through `charset`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Utf8,
    Utf16le,
    Utf16be,
    Utf16,
}

impl Encoding {
    /// Value for SQLite's `PRAGMA encoding`.
    #[must_use]
    pub fn pragma_value(self) -> &'static str {
        match self {
            Encoding::Utf8 => "UTF-8",
            Encoding::Utf16le => "UTF-16le",
            Encoding::Utf16be => "UTF-16be",
            Encoding::Utf16 => "UTF-16",
        }
    }
}

impl DatabaseConfig {
    #[must_use]
    pub fn builder(database: impl Into<String>) -> DatabaseConfigBuilder {
        DatabaseConfigBuilder::new(database)
    }

    /// Build from a plain key/value mapping (`host`, `database`/`dbname`,
    /// `username`/`user`, `password`, `charset`, `busy_timeout_ms`, `password_cost`).
    /// Missing keys keep their defaults.
    ///
    /// # Errors
    /// Returns `DataAccessError::ConfigError` if a numeric key does not parse.
    pub fn from_map(map: &HashMap<String, String>) -> Result<Self, DataAccessError> {
        let mut cfg = Self::default();
        let lookup = |keys: &[&str]| keys.iter().find_map(|k| map.get(*k)).cloned();

        if let Some(host) = lookup(&["host"]) {
            cfg.host = host;
        }
        if let Some(database) = lookup(&["database", "dbname"]) {
            cfg.database = database;
        }
        if let Some(username) = lookup(&["username", "user"]) {
            cfg.username = username;
        }
        if let Some(password) = lookup(&["password"]) {
            cfg.password = password;
        }
        if let Some(charset) = lookup(&["charset"]) {
            cfg.charset = charset;
        }
        if let Some(raw) = lookup(&["busy_timeout_ms"]) {
            cfg.busy_timeout_ms = raw.parse().map_err(|e| {
                DataAccessError::ConfigError(format!("busy_timeout_ms {raw:?}: {e}"))
            })?;
        }
        if let Some(raw) = lookup(&["password_cost"]) {
            cfg.password_cost = raw.parse().map_err(|e| {
                DataAccessError::ConfigError(format!("password_cost {raw:?}: {e}"))
            })?;
        }
        Ok(cfg)
    }

    /// Parse a TOML document. Keys may sit at the top level or under `[database]`.
    ///
    /// # Errors
    /// Returns `DataAccessError::ConfigError` if the document is not valid TOML
    /// or has fields of the wrong type.
    pub fn from_toml_str(source: &str) -> Result<Self, DataAccessError> {
        #[derive(Deserialize)]
        struct Wrapped {
            database: DatabaseConfig,
        }

        let value: toml::Table = toml::from_str(source)?;
        if value.get("database").is_some_and(toml::Value::is_table) {
            let wrapped: Wrapped = toml::from_str(source)?;
            Ok(wrapped.database)
        } else {
            Ok(toml::from_str(source)?)
        }
    }

    /// Read and parse a TOML config file.
    ///
    /// # Errors
    /// Returns `DataAccessError::Io` if the file cannot be read, or
    /// `DataAccessError::ConfigError` if it does not parse.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, DataAccessError> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }

    /// Map `charset` onto a text encoding.
    ///
    /// # Errors
    /// Returns `DataAccessError::ConfigError` for an unknown character set.
    pub fn encoding(&self) -> Result<Encoding, DataAccessError> {
        match self.charset.to_ascii_lowercase().as_str() {
            "utf8" | "utf8mb4" | "utf-8" => Ok(Encoding::Utf8),
            "utf-16" | "utf16" => Ok(Encoding::Utf16),
            "utf-16le" | "utf16le" => Ok(Encoding::Utf16le),
            "utf-16be" | "utf16be" => Ok(Encoding::Utf16be),
            other => Err(DataAccessError::ConfigError(format!(
                "unsupported charset {other:?}"
            ))),
        }
    }

    /// `sqlite://user@host/database;charset=...` with the password left out.
    #[must_use]
    pub fn redacted_dsn(&self) -> String {
        let user = if self.username.is_empty() {
            String::new()
        } else {
            format!("{}@", self.username)
        };
        format!(
            "sqlite://{user}{}/{};charset={}",
            self.host, self.database, self.charset
        )
    }
}

/// Fluent builder for [`DatabaseConfig`].
#[derive(Debug, Clone)]
pub struct DatabaseConfigBuilder {
    cfg: DatabaseConfig,
}

impl DatabaseConfigBuilder {
    #[must_use]
    pub fn new(database: impl Into<String>) -> Self {
        Self {
            cfg: DatabaseConfig {
                database: database.into(),
                ..DatabaseConfig::default()
            },
        }
    }

    #[must_use]
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.cfg.host = host.into();
        self
    }

    #[must_use]
    pub fn credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.cfg.username = username.into();
        self.cfg.password = password.into();
        self
    }

    #[must_use]
    pub fn charset(mut self, charset: impl Into<String>) -> Self {
        self.cfg.charset = charset.into();
        self
    }

    #[must_use]
    pub fn busy_timeout_ms(mut self, busy_timeout_ms: u64) -> Self {
        self.cfg.busy_timeout_ms = busy_timeout_ms;
        self
    }

    #[must_use]
    pub fn password_cost(mut self, rounds: u32) -> Self {
        self.cfg.password_cost = rounds;
        self
    }

    #[must_use]
    pub fn finish(self) -> DatabaseConfig {
        self.cfg
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_map_reads_aliases() {
        let map: HashMap<String, String> = [
            ("dbname", "app.db"),
            ("user", "svc"),
            ("password", "hunter2"),
            ("charset", "utf8"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        let cfg = DatabaseConfig::from_map(&map).unwrap();
        assert_eq!(cfg.database, "app.db");
        assert_eq!(cfg.username, "svc");
        assert_eq!(cfg.host, "localhost");
        assert_eq!(cfg.encoding().unwrap(), Encoding::Utf8);
    }

    #[test]
    fn from_map_rejects_bad_numbers() {
        let map: HashMap<String, String> =
            [("busy_timeout_ms".to_string(), "soon".to_string())].into();
        let err = DatabaseConfig::from_map(&map).unwrap_err();
        assert!(matches!(err, DataAccessError::ConfigError(_)));
    }

    #[test]
    fn toml_top_level_and_table() {
        let flat = DatabaseConfig::from_toml_str("database = \"a.db\"\ncharset = \"utf-16le\"")
            .unwrap();
        assert_eq!(flat.database, "a.db");
        assert_eq!(flat.encoding().unwrap(), Encoding::Utf16le);

        let nested = DatabaseConfig::from_toml_str(
            "[database]\ndatabase = \"b.db\"\nhost = \"db.internal\"\nbusy_timeout_ms = 250",
        )
        .unwrap();
        assert_eq!(nested.database, "b.db");
        assert_eq!(nested.host, "db.internal");
        assert_eq!(nested.busy_timeout_ms, 250);
    }

    #[test]
    fn unknown_charset_is_config_error() {
        let cfg = DatabaseConfig::builder(":memory:").charset("latin1").finish();
        assert!(matches!(cfg.encoding(), Err(DataAccessError::ConfigError(_))));
    }

    #[test]
    fn debug_and_dsn_hide_password() {
        let cfg = DatabaseConfig::builder("app.db")
            .credentials("svc", "hunter2")
            .finish();
        assert!(!format!("{cfg:?}").contains("hunter2"));
        assert_eq!(cfg.redacted_dsn(), "sqlite://svc@localhost/app.db;charset=utf8mb4");
    }
}
