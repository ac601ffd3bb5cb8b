use crate::column_map::{ConditionMap, FieldMap};
use crate::error::DataAccessError;
use crate::query_builder::{self, BuiltQuery};
use crate::results::{CustomDbRow, ResultSet};

use super::QueryEngine;

impl QueryEngine {
    /// Prepare a built query and bind all of its parameters.
    async fn load(&mut self, built: BuiltQuery) -> Result<(), DataAccessError> {
        self.query(&built.sql).await?;
        for param in built.params {
            self.bind(&param.name, param.value, param.ty)?;
        }
        Ok(())
    }

    /// `INSERT` one row. [`Self::row_count`] and [`Self::last_insert_id`]
    /// describe it afterwards.
    ///
    /// # Errors
    /// `InvalidInput` for an empty field map or bad identifiers (nothing is sent
    /// to the database), otherwise the errors of [`Self::execute`].
    pub async fn create(
        &mut self,
        table: &str,
        fields: &FieldMap,
    ) -> Result<bool, DataAccessError> {
        let built = query_builder::insert(table, fields)?;
        self.load(built).await?;
        self.execute().await
    }

    /// `SELECT *` rows matching every condition; an empty map returns the whole table.
    ///
    /// # Errors
    /// `InvalidInput` for bad identifiers, otherwise the errors of [`Self::result_set`].
    pub async fn read(
        &mut self,
        table: &str,
        conditions: &ConditionMap,
    ) -> Result<ResultSet, DataAccessError> {
        self.read_fields(table, conditions, "*").await
    }

    /// Like [`Self::read`] with an explicit projection (`"id, name"`).
    ///
    /// # Errors
    /// `InvalidInput` for bad identifiers or projection, otherwise the errors
    /// of [`Self::result_set`].
    pub async fn read_fields(
        &mut self,
        table: &str,
        conditions: &ConditionMap,
        fields: &str,
    ) -> Result<ResultSet, DataAccessError> {
        let built = query_builder::select(table, conditions, fields)?;
        self.load(built).await?;
        self.result_set().await
    }

    /// First row matching every condition, or `None`.
    ///
    /// # Errors
    /// `InvalidInput` for bad identifiers, otherwise the errors of [`Self::single`].
    pub async fn read_one(
        &mut self,
        table: &str,
        conditions: &ConditionMap,
    ) -> Result<Option<CustomDbRow>, DataAccessError> {
        let built = query_builder::select(table, conditions, "*")?;
        self.load(built).await?;
        self.single().await
    }

    /// `UPDATE` rows matching every condition. WHERE-side placeholders are
    /// prefixed so a column may appear in both maps.
    ///
    /// # Errors
    /// `InvalidInput` for an empty field or condition map (nothing is sent to
    /// the database), otherwise the errors of [`Self::execute`].
    pub async fn update(
        &mut self,
        table: &str,
        fields: &FieldMap,
        conditions: &ConditionMap,
    ) -> Result<bool, DataAccessError> {
        let built = query_builder::update(table, fields, conditions)?;
        self.load(built).await?;
        self.execute().await
    }

    /// `DELETE` rows matching every condition.
    ///
    /// # Errors
    /// `InvalidInput` for an empty condition map (nothing is sent to the
    /// database), otherwise the errors of [`Self::execute`].
    pub async fn delete(
        &mut self,
        table: &str,
        conditions: &ConditionMap,
    ) -> Result<bool, DataAccessError> {
        let built = query_builder::delete(table, conditions)?;
        self.load(built).await?;
        self.execute().await
    }

    /// One 1-based page of `SELECT *`. `page <= 0` is not validated.
    ///
    /// # Errors
    /// `InvalidInput` for bad identifiers, otherwise the errors of [`Self::result_set`].
    pub async fn paginate(
        &mut self,
        table: &str,
        page: i64,
        per_page: i64,
        conditions: &ConditionMap,
    ) -> Result<ResultSet, DataAccessError> {
        self.paginate_fields(table, page, per_page, conditions, "*")
            .await
    }

    /// Like [`Self::paginate`] with an explicit projection.
    ///
    /// # Errors
    /// `InvalidInput` for bad identifiers or projection, otherwise the errors
    /// of [`Self::result_set`].
    pub async fn paginate_fields(
        &mut self,
        table: &str,
        page: i64,
        per_page: i64,
        conditions: &ConditionMap,
        fields: &str,
    ) -> Result<ResultSet, DataAccessError> {
        let built = query_builder::paginate(table, page, per_page, conditions, fields)?;
        self.load(built).await?;
        self.result_set().await
    }

    /// `COUNT(*)` of rows matching every condition.
    ///
    /// # Errors
    /// `InvalidInput` for bad identifiers, otherwise the errors of [`Self::single`].
    pub async fn row_count_total(
        &mut self,
        table: &str,
        conditions: &ConditionMap,
    ) -> Result<i64, DataAccessError> {
        let built = query_builder::count(table, conditions)?;
        self.load(built).await?;
        let row = self.single().await?;
        row.as_ref()
            .and_then(|r| r.get("total"))
            .and_then(|v| v.as_int().copied())
            .ok_or_else(|| {
                DataAccessError::ExecutionError(format!("COUNT(*) on {table} returned no total"))
            })
    }
}
