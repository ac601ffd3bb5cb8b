use crate::types::RowValues;

/// Insertion-ordered column → value list.
///
/// Used as the field map of `create`/`update` and as the equality condition
/// map of `read`/`update`/`delete`/`paginate`/`row_count_total`. Column order
/// is kept so the generated SQL is deterministic.
///
/// ```rust
/// use sql_dal::prelude::*;
///
/// let fields = FieldMap::new().with("name", "Ada").with("age", 30);
/// assert_eq!(fields.keys().collect::<Vec<_>>(), vec!["name", "age"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnMap {
    entries: Vec<(String, RowValues)>,
}

/// Column → value pairs written by `create` and the SET side of `update`.
pub type FieldMap = ColumnMap;
/// Column → value pairs matched with `=` and joined with `AND`.
pub type ConditionMap = ColumnMap;

impl ColumnMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, column: impl Into<String>, value: impl Into<RowValues>) -> Self {
        self.insert(column, value);
        self
    }

    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<RowValues>) {
        self.entries.push((column.into(), value.into()));
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn get(&self, column: &str) -> Option<&RowValues> {
        self.entries
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &RowValues)> {
        self.entries.iter().map(|(name, value)| (name.as_str(), value))
    }
}

impl<K, V> FromIterator<(K, V)> for ColumnMap
where
    K: Into<String>,
    V: Into<RowValues>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl<K, V> From<Vec<(K, V)>> for ColumnMap
where
    K: Into<String>,
    V: Into<RowValues>,
{
    fn from(entries: Vec<(K, V)>) -> Self {
        entries.into_iter().collect()
    }
}
