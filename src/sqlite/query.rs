use std::sync::Arc;

use rusqlite::Statement;
use rusqlite::types::Value;

use crate::error::DataAccessError;
use crate::executor::{BoundParam, normalize_placeholder};
use crate::results::ResultSet;
use crate::types::RowValues;

use super::params::to_sqlite_value;

/// Extract a `RowValues` from a `SQLite` row.
///
/// # Errors
///
/// Returns `DataAccessError::ExecutionError` if the value cannot be read.
pub fn sqlite_extract_value_sync(
    row: &rusqlite::Row,
    idx: usize,
) -> Result<RowValues, DataAccessError> {
    let value: Value = row.get(idx).map_err(execution_error)?;
    match value {
        Value::Null => Ok(RowValues::Null),
        Value::Integer(i) => Ok(RowValues::Int(i)),
        Value::Real(f) => Ok(RowValues::Float(f)),
        Value::Text(s) => Ok(RowValues::Text(s)),
        Value::Blob(b) => Ok(RowValues::Blob(b)),
    }
}

pub(crate) fn execution_error(err: rusqlite::Error) -> DataAccessError {
    DataAccessError::ExecutionError(err.to_string())
}

/// Placeholder names of a compiled statement, in index order.
///
/// Anonymous `?` parameters are named by their 1-based index.
pub(crate) fn placeholder_names(stmt: &Statement) -> Vec<String> {
    (1..=stmt.parameter_count())
        .map(|idx| match stmt.parameter_name(idx) {
            Some(name) => normalize_placeholder(name).to_string(),
            None => idx.to_string(),
        })
        .collect()
}

/// Bind every parameter of `stmt` from `bindings`, matched by name.
///
/// # Errors
///
/// Returns `DataAccessError::ExecutionError` if a placeholder has no binding,
/// a value cannot take its bind type, or SQLite rejects the bind.
pub(crate) fn bind_all(
    stmt: &mut Statement,
    bindings: &[BoundParam],
) -> Result<(), DataAccessError> {
    for (offset, name) in placeholder_names(stmt).into_iter().enumerate() {
        let param = bindings.iter().find(|b| b.name == name).ok_or_else(|| {
            DataAccessError::ExecutionError(format!("parameter :{name} is not bound"))
        })?;
        let value = to_sqlite_value(param)?;
        stmt.raw_bind_parameter(offset + 1, value)
            .map_err(execution_error)?;
    }
    Ok(())
}

/// Run an already bound statement and collect its rows.
///
/// # Errors
///
/// Returns `DataAccessError::ExecutionError` if stepping or value extraction fails.
pub fn build_result_set(stmt: &mut Statement) -> Result<ResultSet, DataAccessError> {
    let column_names: Vec<String> = stmt
        .column_names()
        .iter()
        .map(std::string::ToString::to_string)
        .collect();
    let col_count = column_names.len();

    let mut result_set = ResultSet::with_capacity(10);
    result_set.set_column_names(Arc::new(column_names));

    let mut rows_iter = stmt.raw_query();
    while let Some(row) = rows_iter.next().map_err(execution_error)? {
        let mut row_values = Vec::with_capacity(col_count);
        for i in 0..col_count {
            row_values.push(sqlite_extract_value_sync(row, i)?);
        }
        result_set.add_row_values(row_values);
    }

    Ok(result_set)
}
