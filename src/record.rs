use std::collections::HashMap;
use std::sync::Arc;

use crate::error::SqlChainError;
use crate::value::SqlValue;

/// A decoded result row: the generic field-map every backend produces.
///
/// Column names are shared across all records of one result set. A NULL
/// column reads as absent: [`Record::get`] returns `None` both for columns
/// the query never selected and for columns that were NULL in this row, and
/// [`Record::iter`] skips NULL slots. Consumers must not assume a key is
/// present unless they checked — absence implies null.
#[derive(Debug, Clone)]
pub struct Record {
    columns: Arc<Vec<String>>,
    values: Vec<SqlValue>,
    column_index: Arc<HashMap<String, usize>>,
}

impl Record {
    /// Get a non-null value by column name.
    ///
    /// Returns `None` when the column is missing from the projection or was
    /// NULL in this row.
    #[must_use]
    pub fn get(&self, column_name: &str) -> Option<&SqlValue> {
        let idx = self.column_index(column_name)?;
        match self.values.get(idx) {
            Some(SqlValue::Null) | None => None,
            Some(value) => Some(value),
        }
    }

    /// Whether the column is present with a non-null value.
    #[must_use]
    pub fn contains(&self, column_name: &str) -> bool {
        self.get(column_name).is_some()
    }

    /// Get the raw slot at a column index, NULL included.
    #[must_use]
    pub fn get_by_index(&self, index: usize) -> Option<&SqlValue> {
        self.values.get(index)
    }

    /// Get the index of a column by name
    #[must_use]
    pub fn column_index(&self, column_name: &str) -> Option<usize> {
        if let Some(&idx) = self.column_index.get(column_name) {
            return Some(idx);
        }
        self.columns.iter().position(|col| col == column_name)
    }

    /// Column names selected by the query, in projection order.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Iterate over the non-null columns of this row.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &SqlValue)> {
        self.columns
            .iter()
            .zip(self.values.iter())
            .filter(|(_, v)| !v.is_null())
            .map(|(c, v)| (c.as_str(), v))
    }
}

/// Builds records for one result set, sharing the column-name allocation
/// and name-to-index cache across every row.
#[derive(Debug, Clone)]
pub(crate) struct RecordBuilder {
    columns: Arc<Vec<String>>,
    column_index: Arc<HashMap<String, usize>>,
}

impl RecordBuilder {
    pub(crate) fn new(columns: Vec<String>) -> Self {
        let column_index = Arc::new(
            columns
                .iter()
                .enumerate()
                .map(|(i, name)| (name.clone(), i))
                .collect::<HashMap<_, _>>(),
        );
        Self {
            columns: Arc::new(columns),
            column_index,
        }
    }

    pub(crate) fn record(&self, values: Vec<SqlValue>) -> Record {
        Record {
            columns: self.columns.clone(),
            values,
            column_index: self.column_index.clone(),
        }
    }
}

/// Explicit typed decoder for [`Record`]s.
///
/// Implementations decode one row into a caller type and must tolerate
/// missing keys (a missing key means the column was NULL or never selected):
/// ```rust
/// use sql_chain::{FromRecord, Record, SqlChainError, SqlValue};
///
/// struct Page {
///     id: i64,
///     title: String,
/// }
///
/// impl FromRecord for Page {
///     fn from_record(record: &Record) -> Result<Self, SqlChainError> {
///         Ok(Page {
///             id: record.get("id").and_then(SqlValue::as_int).copied().unwrap_or_default(),
///             title: record
///                 .get("title")
///                 .and_then(SqlValue::as_text)
///                 .unwrap_or_default()
///                 .to_string(),
///         })
///     }
/// }
/// ```
pub trait FromRecord: Sized {
    /// Decode one row.
    ///
    /// # Errors
    ///
    /// Returns `SqlChainError` (typically [`SqlChainError::ScanError`]) when
    /// a required column cannot be decoded.
    fn from_record(record: &Record) -> Result<Self, SqlChainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Record {
        let builder = RecordBuilder::new(vec![
            "id".to_string(),
            "title".to_string(),
            "text".to_string(),
        ]);
        builder.record(vec![
            SqlValue::Int(7),
            SqlValue::Text("Test".to_string()),
            SqlValue::Null,
        ])
    }

    #[test]
    fn null_columns_read_as_absent() {
        let rec = sample();
        assert!(rec.get("text").is_none());
        assert!(!rec.contains("text"));
        // the raw slot is still addressable
        assert_eq!(rec.get_by_index(2), Some(&SqlValue::Null));
    }

    #[test]
    fn non_null_columns_are_present() {
        let rec = sample();
        assert_eq!(rec.get("id").and_then(SqlValue::as_int), Some(&7));
        assert_eq!(rec.get("title").and_then(SqlValue::as_text), Some("Test"));
        assert!(rec.get("missing").is_none());
    }

    #[test]
    fn iteration_skips_nulls() {
        let rec = sample();
        let cols: Vec<&str> = rec.iter().map(|(c, _)| c).collect();
        assert_eq!(cols, vec!["id", "title"]);
    }
}
