use chrono::NaiveDateTime;
use serde_json::Value as JsonValue;

use crate::error::SqlChainError;
use crate::record::{Record, RecordBuilder};
use crate::value::SqlValue;

/// Extract one column from a `tokio_postgres` row, normalizing narrow
/// integers to 64-bit.
///
/// # Errors
///
/// Returns `SqlChainError` if the column cannot be decoded.
pub(crate) fn extract_value(
    row: &tokio_postgres::Row,
    idx: usize,
) -> Result<SqlValue, SqlChainError> {
    let type_name = row.columns()[idx].type_().name();

    match type_name {
        "int2" => {
            let val: Option<i16> = row.try_get(idx)?;
            Ok(val.map_or(SqlValue::Null, |v| SqlValue::Int(i64::from(v))))
        }
        "int4" => {
            let val: Option<i32> = row.try_get(idx)?;
            Ok(val.map_or(SqlValue::Null, |v| SqlValue::Int(i64::from(v))))
        }
        "int8" => {
            let val: Option<i64> = row.try_get(idx)?;
            Ok(val.map_or(SqlValue::Null, SqlValue::Int))
        }
        "float4" | "float8" => {
            let val: Option<f64> = row.try_get(idx)?;
            Ok(val.map_or(SqlValue::Null, SqlValue::Float))
        }
        "bool" => {
            let val: Option<bool> = row.try_get(idx)?;
            Ok(val.map_or(SqlValue::Null, SqlValue::Bool))
        }
        "timestamp" | "timestamptz" => {
            let val: Option<NaiveDateTime> = row.try_get(idx)?;
            Ok(val.map_or(SqlValue::Null, SqlValue::Timestamp))
        }
        "json" | "jsonb" => {
            let val: Option<JsonValue> = row.try_get(idx)?;
            Ok(val.map_or(SqlValue::Null, SqlValue::Json))
        }
        "bytea" => {
            let val: Option<Vec<u8>> = row.try_get(idx)?;
            Ok(val.map_or(SqlValue::Null, SqlValue::Blob))
        }
        // text, varchar, char, name, and anything else that decodes as text
        _ => {
            let val: Option<String> = row.try_get(idx)?;
            Ok(val.map_or(SqlValue::Null, SqlValue::Text))
        }
    }
}

/// Build records from raw rows, sharing one column-name allocation.
pub(crate) fn from_rows(rows: &[tokio_postgres::Row]) -> Result<Vec<Record>, SqlChainError> {
    let Some(first) = rows.first() else {
        return Ok(Vec::new());
    };

    let columns: Vec<String> = first.columns().iter().map(|c| c.name().to_string()).collect();
    let col_count = columns.len();
    let builder = RecordBuilder::new(columns);

    let mut records = Vec::with_capacity(rows.len());
    for row in rows {
        let mut decoded = Vec::with_capacity(col_count);
        for idx in 0..col_count {
            decoded.push(extract_value(row, idx)?);
        }
        records.push(builder.record(decoded));
    }

    Ok(records)
}
