use tiberius::Query;

use crate::value::SqlValue;

/// Bind a parameter slice onto a tiberius query.
///
/// The query owns its bound data, so values are cloned in; timestamps and
/// JSON travel as ISO-8601 / serialized text.
#[must_use]
pub fn bind_query<'a>(sql: &'a str, args: &[SqlValue]) -> Query<'a> {
    let mut query = Query::new(sql);

    for arg in args {
        match arg {
            SqlValue::Int(i) => query.bind(*i),
            SqlValue::Float(f) => query.bind(*f),
            SqlValue::Text(s) => query.bind(s.clone()),
            SqlValue::Bool(b) => query.bind(*b),
            SqlValue::Timestamp(dt) => {
                query.bind(dt.format("%Y-%m-%dT%H:%M:%S%.f").to_string());
            }
            SqlValue::Null => query.bind(Option::<String>::None),
            SqlValue::Json(jsval) => query.bind(jsval.to_string()),
            SqlValue::Blob(bytes) => query.bind(bytes.clone()),
        }
    }

    query
}
