//! A small data-access layer: one lazily-opened connection shared through a
//! [`ConnectionManager`], and a [`QueryEngine`] session that builds CRUD and
//! pagination SQL from column maps, binds every value as a named parameter with
//! an inferred (or explicit) type, and runs it.
//!
//! The connection is opened on first use and the single attempt is remembered:
//! if it fails, every later call reports the same `ConnectionError`.

pub mod column_map;
pub mod config;
pub mod connection;
pub mod engine;
pub mod error;
pub mod executor;
pub mod helpers;
pub mod identifiers;
pub mod prelude;
pub mod query_builder;
pub mod results;
pub mod sqlite;
pub mod types;

pub use column_map::{ColumnMap, ConditionMap, FieldMap};
pub use config::{DatabaseConfig, DatabaseConfigBuilder};
pub use connection::{ConnectionManager, ConnectionState};
pub use engine::QueryEngine;
pub use error::{DataAccessError, ErrorKind};
pub use helpers::{hash_password, hash_password_with_cost, sanitize, verify_password};
pub use results::{CustomDbRow, ResultSet};
pub use types::{ParamType, RowValues};
