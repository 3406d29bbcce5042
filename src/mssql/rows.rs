use chrono::NaiveDateTime;
use futures_util::TryStreamExt;
use tiberius::QueryStream;

use crate::error::SqlChainError;
use crate::record::{Record, RecordBuilder};
use crate::value::SqlValue;

/// Materialize every row of a query stream as a [`Record`].
pub(crate) async fn from_stream(
    mut stream: QueryStream<'_>,
) -> Result<Vec<Record>, SqlChainError> {
    let columns_opt = stream.columns().await.map_err(|e| {
        SqlChainError::ExecutionError(format!("SQL Server column fetch error: {e}"))
    })?;

    let Some(columns) = columns_opt else {
        // Statement produced no row sets at all.
        return Ok(Vec::new());
    };

    let column_names: Vec<String> = columns.iter().map(|col| col.name().to_string()).collect();
    let col_count = column_names.len();
    let builder = RecordBuilder::new(column_names);

    let mut records = Vec::new();
    let mut rows = stream.into_row_stream();
    while let Some(row) = rows.try_next().await.map_err(|e| {
        SqlChainError::ExecutionError(format!("SQL Server row fetch error: {e}"))
    })? {
        let mut decoded = Vec::with_capacity(col_count);
        for idx in 0..col_count {
            decoded.push(extract_value(&row, idx));
        }
        records.push(builder.record(decoded));
    }

    Ok(records)
}

/// Extract one column from a tiberius row.
///
/// The row API exposes typed getters rather than a tagged value, so this
/// probes the representations we map, widening narrow integers to 64-bit.
/// Anything unreadable decodes as NULL.
pub(crate) fn extract_value(row: &tiberius::Row, idx: usize) -> SqlValue {
    if let Ok(Some(val)) = row.try_get::<i32, _>(idx) {
        return SqlValue::Int(i64::from(val));
    }
    if let Ok(Some(val)) = row.try_get::<i64, _>(idx) {
        return SqlValue::Int(val);
    }
    if let Ok(Some(val)) = row.try_get::<f32, _>(idx) {
        return SqlValue::Float(f64::from(val));
    }
    if let Ok(Some(val)) = row.try_get::<f64, _>(idx) {
        return SqlValue::Float(val);
    }
    if let Ok(Some(val)) = row.try_get::<bool, _>(idx) {
        return SqlValue::Bool(val);
    }
    if let Ok(Some(val)) = row.try_get::<NaiveDateTime, _>(idx) {
        return SqlValue::Timestamp(val);
    }
    if let Ok(Some(val)) = row.try_get::<&str, _>(idx) {
        // Datetime columns that arrive as text still normalize to timestamps.
        if val.contains('-') && (val.contains(':') || val.contains(' ')) {
            if let Ok(dt) = NaiveDateTime::parse_from_str(val, "%Y-%m-%d %H:%M:%S%.f") {
                return SqlValue::Timestamp(dt);
            }
            if let Ok(dt) = NaiveDateTime::parse_from_str(val, "%Y-%m-%d %H:%M:%S") {
                return SqlValue::Timestamp(dt);
            }
        }
        return SqlValue::Text(val.to_string());
    }
    if let Ok(Some(val)) = row.try_get::<&[u8], _>(idx) {
        return SqlValue::Blob(val.to_vec());
    }

    SqlValue::Null
}
