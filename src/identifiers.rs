//! Validation for the identifiers that are interpolated into generated SQL.
//!
//! Values always travel as bound parameters. Table names, column names and the
//! `fields` projection cannot be bound, so they are checked against a strict
//! pattern here instead of being quoted.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::DataAccessError;

static COLUMN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("column pattern is valid")
});

static TABLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*(\.[A-Za-z_][A-Za-z0-9_]*)?$")
        .expect("table pattern is valid")
});

// `col`, `t.col`, optionally followed by `AS alias`
static PROJECTION_ITEM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^[A-Za-z_][A-Za-z0-9_]*(\.[A-Za-z_][A-Za-z0-9_]*)?(\s+AS\s+[A-Za-z_][A-Za-z0-9_]*)?$",
    )
    .expect("projection pattern is valid")
});

/// Check a (possibly schema-qualified) table name.
///
/// # Errors
/// Returns `DataAccessError::InvalidInput` if the name is not a plain identifier.
pub fn table(name: &str) -> Result<&str, DataAccessError> {
    if TABLE.is_match(name) {
        Ok(name)
    } else {
        Err(DataAccessError::InvalidInput(format!(
            "invalid table name: {name:?}"
        )))
    }
}

/// Check a column name. Column names double as placeholder names, so no
/// qualification is allowed.
///
/// # Errors
/// Returns `DataAccessError::InvalidInput` if the name is not a plain identifier.
pub fn column(name: &str) -> Result<&str, DataAccessError> {
    if COLUMN.is_match(name) {
        Ok(name)
    } else {
        Err(DataAccessError::InvalidInput(format!(
            "invalid column name: {name:?}"
        )))
    }
}

/// Check and normalize a `SELECT` projection: `*` or a comma separated column list.
///
/// # Errors
/// Returns `DataAccessError::InvalidInput` if any item is not a column reference.
pub fn projection(fields: &str) -> Result<String, DataAccessError> {
    let trimmed = fields.trim();
    if trimmed == "*" {
        return Ok("*".to_string());
    }

    let mut items = Vec::new();
    for item in trimmed.split(',') {
        let item = item.trim();
        if !PROJECTION_ITEM.is_match(item) {
            return Err(DataAccessError::InvalidInput(format!(
                "invalid field in projection: {item:?}"
            )));
        }
        items.push(item);
    }
    Ok(items.join(", "))
}
