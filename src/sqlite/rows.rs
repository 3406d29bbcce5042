use deadpool_sqlite::rusqlite::{self, types::Value};

use crate::error::SqlChainError;
use crate::record::{Record, RecordBuilder};
use crate::value::SqlValue;

/// Extract one column from a `SQLite` row.
///
/// `SQLite` only distinguishes integer, real, text, blob, and null storage
/// classes, so the normalization here is direct.
///
/// # Errors
///
/// Returns `SqlChainError` if the value cannot be read.
pub(crate) fn extract_value(row: &rusqlite::Row, idx: usize) -> Result<SqlValue, SqlChainError> {
    let value: Value = row.get(idx).map_err(SqlChainError::SqliteError)?;
    match value {
        Value::Null => Ok(SqlValue::Null),
        Value::Integer(i) => Ok(SqlValue::Int(i)),
        Value::Real(f) => Ok(SqlValue::Float(f)),
        Value::Text(s) => Ok(SqlValue::Text(s)),
        Value::Blob(b) => Ok(SqlValue::Blob(b)),
    }
}

/// Run a prepared SELECT and materialize every row as a [`Record`].
pub(crate) fn read_rows(
    stmt: &mut rusqlite::Statement,
    values: Vec<Value>,
) -> Result<Vec<Record>, SqlChainError> {
    let columns: Vec<String> = stmt
        .column_names()
        .iter()
        .map(std::string::ToString::to_string)
        .collect();
    let col_count = columns.len();
    let builder = RecordBuilder::new(columns);

    let mut rows = stmt.query(rusqlite::params_from_iter(values))?;
    let mut records = Vec::new();
    while let Some(row) = rows.next()? {
        let mut decoded = Vec::with_capacity(col_count);
        for idx in 0..col_count {
            decoded.push(extract_value(row, idx)?);
        }
        records.push(builder.record(decoded));
    }

    Ok(records)
}
