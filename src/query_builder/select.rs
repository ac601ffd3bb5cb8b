use crate::column_map::ConditionMap;
use crate::error::DataAccessError;
use crate::identifiers;
use crate::types::{ParamType, RowValues};

use super::{BuiltQuery, NamedParam, unique_name, where_clause};

/// Placeholder names used by `paginate`. A condition column with the same
/// name pushes these to `limit_1` / `offset_1`.
pub const LIMIT_PARAM: &str = "limit";
pub const OFFSET_PARAM: &str = "offset";

/// `SELECT <fields> FROM <table> [WHERE ...]`. An empty condition map matches every row.
///
/// # Errors
/// Returns `DataAccessError::InvalidInput` if an identifier or the projection is invalid.
pub fn select(
    table: &str,
    conditions: &ConditionMap,
    fields: &str,
) -> Result<BuiltQuery, DataAccessError> {
    let table = identifiers::table(table)?;
    let projection = identifiers::projection(fields)?;

    let mut params = Vec::with_capacity(conditions.len());
    let filter = where_clause(conditions, "", &mut params)?;
    Ok(BuiltQuery {
        sql: format!("SELECT {projection} FROM {table}{filter}"),
        params,
    })
}

/// Offset of a 1-based page. `page <= 0` gives a negative offset; callers own that contract.
#[must_use]
pub fn page_offset(page: i64, per_page: i64) -> i64 {
    page.saturating_sub(1).saturating_mul(per_page)
}

/// `SELECT ... [WHERE ...] LIMIT :limit OFFSET :offset`.
///
/// `limit` and `offset` are always bound as integers, never inferred.
///
/// # Errors
/// Returns `DataAccessError::InvalidInput` if an identifier or the projection is invalid.
pub fn paginate(
    table: &str,
    page: i64,
    per_page: i64,
    conditions: &ConditionMap,
    fields: &str,
) -> Result<BuiltQuery, DataAccessError> {
    let mut query = select(table, conditions, fields)?;
    let limit = unique_name(LIMIT_PARAM, &query.params);
    query.params.push(NamedParam::typed(
        limit.as_str(),
        RowValues::Int(per_page),
        ParamType::Integer,
    ));
    let offset = unique_name(OFFSET_PARAM, &query.params);
    query.params.push(NamedParam::typed(
        offset.as_str(),
        RowValues::Int(page_offset(page, per_page)),
        ParamType::Integer,
    ));
    query
        .sql
        .push_str(&format!(" LIMIT :{limit} OFFSET :{offset}"));
    Ok(query)
}

/// `SELECT COUNT(*) AS total FROM <table> [WHERE ...]`.
///
/// # Errors
/// Returns `DataAccessError::InvalidInput` if an identifier is invalid.
pub fn count(table: &str, conditions: &ConditionMap) -> Result<BuiltQuery, DataAccessError> {
    let table = identifiers::table(table)?;
    let mut params = Vec::with_capacity(conditions.len());
    let filter = where_clause(conditions, "", &mut params)?;
    Ok(BuiltQuery {
        sql: format!("SELECT COUNT(*) AS total FROM {table}{filter}"),
        params,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn select_without_conditions_has_no_where() {
        let q = select("users", &ConditionMap::new(), "*").unwrap();
        assert_eq!(q.sql, "SELECT * FROM users");
        assert!(q.params.is_empty());
    }

    #[test]
    fn select_with_fields_and_conditions() {
        let conditions = ConditionMap::new().with("name", "Ada");
        let q = select("users", &conditions, "id,name").unwrap();
        assert_eq!(q.sql, "SELECT id, name FROM users WHERE name = :name");
    }

    #[test]
    fn paginate_binds_explicit_integers() {
        let q = paginate("users", 3, 10, &ConditionMap::new(), "*").unwrap();
        assert_eq!(q.sql, "SELECT * FROM users LIMIT :limit OFFSET :offset");
        assert_eq!(
            q.params,
            vec![
                NamedParam::typed("limit", RowValues::Int(10), ParamType::Integer),
                NamedParam::typed("offset", RowValues::Int(20), ParamType::Integer),
            ]
        );
    }

    #[test]
    fn paginate_places_limit_after_where() {
        let conditions = ConditionMap::new().with("active", true);
        let q = paginate("users", 1, 5, &conditions, "*").unwrap();
        assert_eq!(
            q.sql,
            "SELECT * FROM users WHERE active = :active LIMIT :limit OFFSET :offset"
        );
        assert_eq!(q.params[0].ty, None);
    }

    #[test]
    fn paging_placeholders_step_around_condition_columns() {
        let conditions = ConditionMap::new().with("offset", 7).with("limit", 3);
        let q = paginate("ledger", 2, 10, &conditions, "*").unwrap();
        assert_eq!(
            q.sql,
            "SELECT * FROM ledger WHERE offset = :offset AND limit = :limit \
             LIMIT :limit_1 OFFSET :offset_1"
        );
        assert_eq!(
            q.param_names().collect::<Vec<_>>(),
            vec!["offset", "limit", "limit_1", "offset_1"]
        );
        assert_eq!(q.params[0].value, RowValues::Int(7));
        assert_eq!(q.params[3].value, RowValues::Int(10));
    }

    #[test]
    fn consecutive_pages_differ_by_per_page() {
        assert_eq!(page_offset(1, 10), 0);
        assert_eq!(page_offset(2, 10) - page_offset(1, 10), 10);
        assert_eq!(page_offset(0, 10), -10);
    }

    #[test]
    fn count_uses_total_alias() {
        let conditions = ConditionMap::new().with("role", "admin");
        let q = count("users", &conditions).unwrap();
        assert_eq!(
            q.sql,
            "SELECT COUNT(*) AS total FROM users WHERE role = :role"
        );
    }
}
