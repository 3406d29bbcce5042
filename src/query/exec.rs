use std::collections::HashMap;

use crate::error::SqlChainError;
use crate::record::{FromRecord, Record};
use crate::value::SqlValue;

use super::{Query, Statement, render};

impl Query {
    /// Count the rows the current filter matches (executes SQL).
    ///
    /// A parallel `SELECT COUNT(<pk>)` statement is rendered from the
    /// current join/where/group/having state with order and limit dropped,
    /// so the builder itself stays untouched and reusable for a data fetch.
    /// In raw mode the raw text runs with its first `ORDER BY ` occurrence
    /// removed, preserving that documented special case separately.
    ///
    /// # Errors
    ///
    /// Returns `SqlChainError` if execution fails or the scalar cannot be
    /// scanned.
    pub async fn count(&mut self) -> Result<i64, SqlChainError> {
        let sql = match &self.statement {
            Statement::Structured(c) => {
                let mut parallel = c.clone();
                parallel.select = format!(
                    "SELECT COUNT({}) FROM {}",
                    self.pk_quoted(),
                    self.table_quoted()
                );
                // Order must be blank on count
                parallel.order.clear();
                parallel.limit.clear();
                render::statement_sql(&Statement::Structured(parallel), &self.db, &self.table)
            }
            Statement::Raw(raw) => raw.replacen("ORDER BY ", "", 1),
        };

        let rows = match self.db.query(&sql, &self.args).await {
            Ok(rows) => rows,
            Err(err) => return Err(self.execution_context(err, &sql)),
        };
        let Some(first) = rows.first() else {
            return Ok(0);
        };
        first
            .get_by_index(0)
            .and_then(SqlValue::as_int)
            .copied()
            .ok_or_else(|| {
                SqlChainError::ScanError(format!("count did not return an integer: {sql}"))
            })
    }

    /// Execute the rendered SELECT and return every row as a generic
    /// field-map (executes SQL).
    ///
    /// # Errors
    ///
    /// Returns `SqlChainError` if execution or row decoding fails.
    pub async fn results(&mut self) -> Result<Vec<Record>, SqlChainError> {
        let sql = self.render_sql().to_owned();
        match self.db.query(&sql, &self.args).await {
            Ok(rows) => Ok(rows),
            Err(err) => Err(self.execution_context(err, &sql)),
        }
    }

    /// Apply `LIMIT 1` and return the first row (executes SQL).
    ///
    /// # Errors
    ///
    /// Returns `SqlChainError::NotFound` when the filter matches no rows.
    pub async fn first_result(&mut self) -> Result<Record, SqlChainError> {
        if let Statement::Structured(c) = &mut self.statement {
            c.limit = "LIMIT 1".to_string();
            self.invalidate();
        }
        let sql = self.render_sql().to_owned();
        let results = self.results().await?;
        results
            .into_iter()
            .next()
            .ok_or(SqlChainError::NotFound(sql))
    }

    /// Execute the rendered SELECT and decode every row through the
    /// caller's [`FromRecord`] implementation (executes SQL).
    ///
    /// # Errors
    ///
    /// Returns `SqlChainError` if execution fails or a row fails to decode.
    pub async fn fetch<T: FromRecord>(&mut self) -> Result<Vec<T>, SqlChainError> {
        let records = self.results().await?;
        records.iter().map(T::from_record).collect()
    }

    /// Collect the `id` column of the result set, skipping rows without one
    /// (executes SQL).
    ///
    /// # Errors
    ///
    /// Returns `SqlChainError` if execution fails.
    pub async fn result_ids(&mut self) -> Result<Vec<i64>, SqlChainError> {
        let results = self.results().await?;
        Ok(results
            .iter()
            .filter_map(|r| r.get("id").and_then(SqlValue::as_int).copied())
            .collect())
    }

    /// Insert one row from a field map and return the generated primary key
    /// (executes SQL).
    ///
    /// Field names are sorted before rendering; the column list and the
    /// value list derive from the same sorted order, so map iteration order
    /// never leaks into bindings.
    ///
    /// # Errors
    ///
    /// Returns `SqlChainError` if execution fails or no id comes back.
    pub async fn insert(
        &mut self,
        fields: &HashMap<String, SqlValue>,
    ) -> Result<i64, SqlChainError> {
        let mut cols = Vec::with_capacity(fields.len());
        let mut placeholders = Vec::with_capacity(fields.len());
        for (i, key) in sorted_field_names(fields).into_iter().enumerate() {
            cols.push(self.db.quote_identifier(key));
            placeholders.push(self.db.placeholder(i + 1));
        }

        let statement = format!(
            "INSERT INTO {} ({}) VALUES({}) {}",
            self.table_quoted(),
            cols.join(","),
            placeholders.join(","),
            self.db.insert_trailer(&self.primary_key)
        );
        let sql = format!("{};", statement.trim_end());

        let values = values_from_fields(fields);
        self.db.insert(&sql, &values).await
    }

    /// Update the row this query identifies. The column names must already
    /// be validated by the caller; this is an alias of [`Query::update_all`]
    /// because a bare LIMIT is not portable on UPDATE.
    ///
    /// # Errors
    ///
    /// Returns `SqlChainError` if execution fails.
    pub async fn update(
        &mut self,
        fields: &HashMap<String, SqlValue>,
    ) -> Result<u64, SqlChainError> {
        self.update_all(fields).await
    }

    /// Update all rows matching the current filter (executes SQL).
    ///
    /// SET assignments render from sorted field names and their values are
    /// prepended to the bound argument sequence — the SET placeholders come
    /// before the where-clause placeholders in render order.
    ///
    /// # Errors
    ///
    /// Returns `SqlChainError` if execution fails.
    pub async fn update_all(
        &mut self,
        fields: &HashMap<String, SqlValue>,
    ) -> Result<u64, SqlChainError> {
        let assignments = sorted_field_names(fields)
            .into_iter()
            .map(|k| format!("{}=?", self.db.quote_identifier(k)))
            .collect::<Vec<_>>()
            .join(",");
        let sql = self.dml_sql(format!(
            "UPDATE {} SET {}",
            self.table_quoted(),
            assignments
        ));

        let mut exec_args = values_from_fields(fields);
        exec_args.extend(self.args.iter().cloned());
        self.db.execute(&sql, &exec_args).await
    }

    /// Delete the row this query identifies; an alias of
    /// [`Query::delete_all`], so callers should have narrowed the filter.
    ///
    /// # Errors
    ///
    /// Returns `SqlChainError` if execution fails.
    pub async fn delete(&mut self) -> Result<u64, SqlChainError> {
        self.delete_all().await
    }

    /// Delete all rows matching the current filter (executes SQL).
    ///
    /// # Errors
    ///
    /// Returns `SqlChainError` if execution fails.
    pub async fn delete_all(&mut self) -> Result<u64, SqlChainError> {
        let sql = self.dml_sql(format!("DELETE FROM {}", self.table_quoted()));
        self.db.execute(&sql, &self.args).await
    }

    // Attach the statement and bound arguments to a query-path failure so
    // the caller can diagnose it without re-rendering.
    fn execution_context(&self, err: SqlChainError, sql: &str) -> SqlChainError {
        SqlChainError::ExecutionError(format!(
            "{err}; statement: {sql}; args: {:?}",
            self.args
        ))
    }

    // Render a DML statement that reuses the current join/where/group state
    // by swapping the projection for the DML head. Rendering works on a
    // snapshot so the builder stays reusable afterwards. Raw mode composes
    // from empty clauses: the raw text is a complete statement of its own
    // and is never merged with DML heads.
    fn dml_sql(&self, head: String) -> String {
        let mut parallel = match &self.statement {
            Statement::Structured(c) => c.clone(),
            Statement::Raw(_) => super::Clauses::default(),
        };
        parallel.select = head;
        render::statement_sql(&Statement::Structured(parallel), &self.db, &self.table)
    }
}

/// Field names in sorted order. Map iteration order is arbitrary, but
/// columns and values must derive from one defined order to keep bindings
/// aligned.
pub(super) fn sorted_field_names(fields: &HashMap<String, SqlValue>) -> Vec<&String> {
    let mut keys: Vec<&String> = fields.keys().collect();
    keys.sort();
    keys
}

/// Field values in the same sorted-name order as the rendered columns.
pub(super) fn values_from_fields(fields: &HashMap<String, SqlValue>) -> Vec<SqlValue> {
    sorted_field_names(fields)
        .into_iter()
        .map(|key| fields[key].clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_names_sort_regardless_of_insertion_order() {
        let mut fields = HashMap::new();
        fields.insert("title".to_string(), SqlValue::Text("a".to_string()));
        fields.insert("text".to_string(), SqlValue::Text("b".to_string()));

        let names: Vec<&str> = sorted_field_names(&fields)
            .into_iter()
            .map(String::as_str)
            .collect();
        assert_eq!(names, vec!["text", "title"]);

        let values = values_from_fields(&fields);
        assert_eq!(
            values,
            vec![
                SqlValue::Text("b".to_string()),
                SqlValue::Text("a".to_string())
            ]
        );
    }
}
