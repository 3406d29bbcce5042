use deadpool_sqlite::rusqlite;

use crate::value::SqlValue;

/// Convert a single `SqlValue` to a rusqlite value.
///
/// Booleans become 0/1 integers, timestamps and JSON become text; the
/// reverse normalization happens in [`super::rows`].
#[must_use]
pub fn to_value(value: &SqlValue) -> rusqlite::types::Value {
    match value {
        SqlValue::Int(i) => rusqlite::types::Value::Integer(*i),
        SqlValue::Float(f) => rusqlite::types::Value::Real(*f),
        SqlValue::Text(s) => rusqlite::types::Value::Text(s.clone()),
        SqlValue::Bool(b) => rusqlite::types::Value::Integer(i64::from(*b)),
        SqlValue::Timestamp(dt) => {
            rusqlite::types::Value::Text(dt.format("%F %T%.f").to_string())
        }
        SqlValue::Null => rusqlite::types::Value::Null,
        SqlValue::Json(jval) => rusqlite::types::Value::Text(jval.to_string()),
        SqlValue::Blob(bytes) => rusqlite::types::Value::Blob(bytes.clone()),
    }
}

/// Convert a parameter slice into owned rusqlite values.
#[must_use]
pub fn to_values(args: &[SqlValue]) -> Vec<rusqlite::types::Value> {
    args.iter().map(to_value).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bools_bind_as_integers() {
        assert_eq!(
            to_value(&SqlValue::Bool(true)),
            rusqlite::types::Value::Integer(1)
        );
        assert_eq!(
            to_value(&SqlValue::Bool(false)),
            rusqlite::types::Value::Integer(0)
        );
    }

    #[test]
    fn nulls_bind_as_null() {
        assert_eq!(to_value(&SqlValue::Null), rusqlite::types::Value::Null);
    }
}
