use chrono::NaiveDateTime;
use serde_json::Value as JsonValue;

/// A scalar that can be bound as a query parameter or decoded from a result
/// row.
///
/// One enum shared across backends, so builder and record code never branch
/// on driver types:
/// ```rust
/// use sql_chain::SqlValue;
///
/// let args = vec![
///     SqlValue::Int(1),
///     SqlValue::Text("alice".into()),
///     SqlValue::Bool(true),
/// ];
/// # let _ = args;
/// ```
///
/// Backends normalize on extraction: narrow integers widen to `Int`,
/// booleans stay `Bool`, text stays `Text`, binary columns stay `Blob`.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    /// Integer value (64-bit)
    Int(i64),
    /// Floating point value (64-bit)
    Float(f64),
    /// Text/string value
    Text(String),
    /// Boolean value
    Bool(bool),
    /// Timestamp value
    Timestamp(NaiveDateTime),
    /// NULL value
    Null,
    /// JSON value
    Json(JsonValue),
    /// Binary data
    Blob(Vec<u8>),
}

impl SqlValue {
    /// Check if this value is NULL
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[must_use]
    pub fn as_int(&self) -> Option<&i64> {
        if let SqlValue::Int(value) = self {
            Some(value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        if let SqlValue::Text(value) = self {
            Some(value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<&bool> {
        if let SqlValue::Bool(value) = self {
            return Some(value);
        } else if let Some(i) = self.as_int() {
            // backends without a native boolean store 0/1 integers
            if *i == 1 {
                return Some(&true);
            } else if *i == 0 {
                return Some(&false);
            }
        }
        None
    }

    #[must_use]
    pub fn as_timestamp(&self) -> Option<NaiveDateTime> {
        if let SqlValue::Timestamp(value) = self {
            return Some(*value);
        } else if let Some(s) = self.as_text() {
            // Try "YYYY-MM-DD HH:MM:SS"
            if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
                return Some(dt);
            }
            // Try "YYYY-MM-DD HH:MM:SS.SSS"
            if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S.%3f") {
                return Some(dt);
            }
        }
        None
    }

    #[must_use]
    pub fn as_float(&self) -> Option<f64> {
        if let SqlValue::Float(value) = self {
            Some(*value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_json(&self) -> Option<&JsonValue> {
        if let SqlValue::Json(value) = self {
            Some(value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_blob(&self) -> Option<&[u8]> {
        if let SqlValue::Blob(bytes) = self {
            Some(bytes)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accessors_match_their_variant_only() {
        assert_eq!(SqlValue::Int(9).as_int(), Some(&9));
        assert_eq!(SqlValue::Text("a".to_string()).as_int(), None);
        assert_eq!(SqlValue::Text("a".to_string()).as_text(), Some("a"));
        assert_eq!(SqlValue::Float(1.5).as_float(), Some(1.5));
        assert_eq!(SqlValue::Blob(vec![1, 2]).as_blob(), Some(&[1u8, 2][..]));
        assert!(SqlValue::Null.is_null());
        assert!(!SqlValue::Int(0).is_null());
    }

    #[test]
    fn bools_also_read_from_zero_one_integers() {
        assert_eq!(SqlValue::Bool(true).as_bool(), Some(&true));
        assert_eq!(SqlValue::Int(1).as_bool(), Some(&true));
        assert_eq!(SqlValue::Int(0).as_bool(), Some(&false));
        assert_eq!(SqlValue::Int(2).as_bool(), None);
    }

    #[test]
    fn timestamps_also_parse_from_text() {
        let direct = SqlValue::Text("2024-03-01 10:30:00".to_string());
        let parsed = direct.as_timestamp().expect("parses");
        assert_eq!(
            parsed,
            NaiveDateTime::parse_from_str("2024-03-01 10:30:00", "%Y-%m-%d %H:%M:%S").unwrap()
        );
        assert!(SqlValue::Text("not a time".to_string()).as_timestamp().is_none());
    }
}
