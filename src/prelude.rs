//! Convenient imports for common functionality.

pub use crate::column_map::{ColumnMap, ConditionMap, FieldMap};
pub use crate::config::DatabaseConfig;
pub use crate::connection::{ConnectionManager, ConnectionState};
pub use crate::engine::QueryEngine;
pub use crate::error::{DataAccessError, ErrorKind};
pub use crate::executor::{Connector, PreparedStatement, SqlExecutor};
pub use crate::helpers::{hash_password, sanitize, verify_password};
pub use crate::results::{CustomDbRow, ResultSet};
pub use crate::types::{ParamType, RowValues};
