// SQLite backend for the `SqlExecutor` seam.
//
// - config: opening a connection from `DatabaseConfig`
// - params: bind-type coercion into rusqlite values
// - query: result extraction
// - executor: the `SqlExecutor` implementation

pub mod config;
pub mod executor;
pub mod params;
pub mod query;

pub use config::SqliteConnector;
pub use executor::SqliteExecutor;
pub use params::to_sqlite_value;
pub use query::build_result_set;
