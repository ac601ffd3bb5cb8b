use crate::column_map::{ConditionMap, FieldMap};
use crate::error::DataAccessError;
use crate::identifiers;

use super::{BuiltQuery, CONDITION_PREFIX, NamedParam, checked_columns, where_clause};

/// `INSERT INTO <table> (k1, k2) VALUES (:k1, :k2)` in field-map order.
///
/// # Errors
/// Returns `DataAccessError::InvalidInput` if `fields` is empty or an identifier is invalid.
pub fn insert(table: &str, fields: &FieldMap) -> Result<BuiltQuery, DataAccessError> {
    let table = identifiers::table(table)?;
    if fields.is_empty() {
        return Err(DataAccessError::InvalidInput(format!(
            "create on {table}: field map is empty"
        )));
    }
    let columns = checked_columns(fields, "field")?;

    let placeholders: Vec<String> = columns.iter().map(|col| format!(":{col}")).collect();
    let sql = format!(
        "INSERT INTO {table} ({}) VALUES ({})",
        columns.join(", "),
        placeholders.join(", ")
    );
    let params = fields
        .iter()
        .map(|(col, value)| NamedParam::inferred(col, value.clone()))
        .collect();

    Ok(BuiltQuery { sql, params })
}

/// `UPDATE <table> SET k1 = :k1 WHERE c1 = :condition_c1`.
///
/// WHERE-side placeholders carry [`CONDITION_PREFIX`], so a column that is both
/// updated and filtered on gets two distinct parameters. A SET column that is
/// itself named `condition_<c>` pushes the WHERE placeholder to `condition_<c>_1`.
///
/// # Errors
/// Returns `DataAccessError::InvalidInput` if either map is empty or an identifier is invalid.
pub fn update(
    table: &str,
    fields: &FieldMap,
    conditions: &ConditionMap,
) -> Result<BuiltQuery, DataAccessError> {
    let table = identifiers::table(table)?;
    if fields.is_empty() {
        return Err(DataAccessError::InvalidInput(format!(
            "update on {table}: field map is empty"
        )));
    }
    if conditions.is_empty() {
        return Err(DataAccessError::InvalidInput(format!(
            "update on {table}: condition map is empty (unconditional UPDATE is not allowed)"
        )));
    }
    let columns = checked_columns(fields, "field")?;

    let assignments: Vec<String> = columns
        .iter()
        .map(|col| format!("{col} = :{col}"))
        .collect();
    let mut params: Vec<NamedParam> = fields
        .iter()
        .map(|(col, value)| NamedParam::inferred(col, value.clone()))
        .collect();
    let filter = where_clause(conditions, CONDITION_PREFIX, &mut params)?;

    let sql = format!("UPDATE {table} SET {}{filter}", assignments.join(", "));
    Ok(BuiltQuery { sql, params })
}

/// `DELETE FROM <table> WHERE c1 = :c1 AND ...`.
///
/// # Errors
/// Returns `DataAccessError::InvalidInput` if `conditions` is empty or an identifier is invalid.
pub fn delete(table: &str, conditions: &ConditionMap) -> Result<BuiltQuery, DataAccessError> {
    let table = identifiers::table(table)?;
    if conditions.is_empty() {
        return Err(DataAccessError::InvalidInput(format!(
            "delete on {table}: condition map is empty (unconditional DELETE is not allowed)"
        )));
    }

    let mut params = Vec::with_capacity(conditions.len());
    let filter = where_clause(conditions, "", &mut params)?;
    Ok(BuiltQuery {
        sql: format!("DELETE FROM {table}{filter}"),
        params,
    })
}
