//! Pure SQL + named-parameter assembly for the CRUD verbs.
//!
//! Nothing here touches a connection: every function returns a [`BuiltQuery`]
//! (or an `InvalidInput` error) that the engine then prepares, binds and runs.
//! A rejected input therefore never reaches the executor.

use std::collections::HashSet;

use crate::column_map::ColumnMap;
use crate::error::DataAccessError;
use crate::identifiers;
use crate::types::{ParamType, RowValues};

mod dml;
mod select;

pub use dml::{delete, insert, update};
pub use select::{LIMIT_PARAM, OFFSET_PARAM, count, page_offset, paginate, select};

/// Placeholder prefix for WHERE-side parameters of `UPDATE`, keeping them
/// apart from SET-side parameters of the same column.
pub const CONDITION_PREFIX: &str = "condition_";

/// One named parameter of a generated statement.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedParam {
    /// Placeholder name without the leading `:`
    pub name: String,
    pub value: RowValues,
    /// `None` means the type is inferred at bind time
    pub ty: Option<ParamType>,
}

impl NamedParam {
    pub fn inferred(name: impl Into<String>, value: RowValues) -> Self {
        Self {
            name: name.into(),
            value,
            ty: None,
        }
    }

    pub fn typed(name: impl Into<String>, value: RowValues, ty: ParamType) -> Self {
        Self {
            name: name.into(),
            value,
            ty: Some(ty),
        }
    }
}

/// A SQL string and its named parameters, in placeholder order.
#[derive(Debug, Clone, PartialEq)]
pub struct BuiltQuery {
    pub sql: String,
    pub params: Vec<NamedParam>,
}

impl BuiltQuery {
    /// Placeholder names in the order they were generated.
    pub fn param_names(&self) -> impl Iterator<Item = &str> {
        self.params.iter().map(|p| p.name.as_str())
    }
}

/// Validate every column of a map and reject duplicates.
fn checked_columns<'m>(map: &'m ColumnMap, role: &str) -> Result<Vec<&'m str>, DataAccessError> {
    let mut seen = HashSet::with_capacity(map.len());
    let mut columns = Vec::with_capacity(map.len());
    for name in map.keys() {
        identifiers::column(name)?;
        if !seen.insert(name) {
            return Err(DataAccessError::InvalidInput(format!(
                "column {name:?} appears twice in the {role} map"
            )));
        }
        columns.push(name);
    }
    Ok(columns)
}

/// `base`, or the first of `base_1`, `base_2`, ... that no earlier parameter uses.
///
/// Column names and generated names share one namespace: a SET column may be
/// called `condition_x` and a WHERE column `offset`.
fn unique_name(base: &str, params: &[NamedParam]) -> String {
    let mut name = base.to_string();
    let mut suffix = 0u32;
    while params.iter().any(|p| p.name == name) {
        suffix += 1;
        name = format!("{base}_{suffix}");
    }
    name
}

/// ` WHERE c1 = :<prefix>c1 AND c2 = :<prefix>c2`, or empty for an empty map.
fn where_clause(
    conditions: &ColumnMap,
    prefix: &str,
    params: &mut Vec<NamedParam>,
) -> Result<String, DataAccessError> {
    checked_columns(conditions, "condition")?;
    if conditions.is_empty() {
        return Ok(String::new());
    }

    let mut predicates = Vec::with_capacity(conditions.len());
    for (col, value) in conditions.iter() {
        let name = unique_name(&format!("{prefix}{col}"), params);
        predicates.push(format!("{col} = :{name}"));
        params.push(NamedParam::inferred(name, value.clone()));
    }
    Ok(format!(" WHERE {}", predicates.join(" AND ")))
}
