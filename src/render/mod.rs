use std::borrow::Cow;

mod scanner;

use scanner::{
    State, is_block_comment_end, is_block_comment_start, is_line_comment_start, matches_tag,
    try_start_dollar_quote,
};

/// Positional placeholder syntax of a backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceholderStyle {
    /// PostgreSQL-style placeholders like `$1`.
    Postgres,
    /// SQLite-style placeholders like `?1`.
    Sqlite,
    /// SQL Server-style placeholders like `@P1`.
    Mssql,
}

impl PlaceholderStyle {
    /// The bind-parameter token for a 1-based position.
    #[must_use]
    pub fn token(self, index: usize) -> String {
        match self {
            PlaceholderStyle::Postgres => format!("${index}"),
            PlaceholderStyle::Sqlite => format!("?{index}"),
            PlaceholderStyle::Mssql => format!("@P{index}"),
        }
    }
}

/// Number each bare `?` token left-to-right into the target style.
///
/// The argument sequence bound to a statement is positional, so the Nth `?`
/// becomes the Nth placeholder token. A lightweight state machine skips
/// string literals, quoted identifiers, line and block comments, and
/// dollar-quoted blocks; a `?` already followed by digits is treated as
/// pre-numbered and left untouched. Returns a borrowed `Cow` when the
/// statement contains nothing to substitute.
#[must_use]
pub fn number_placeholders(sql: &str, style: PlaceholderStyle) -> Cow<'_, str> {
    let bytes = sql.as_bytes();
    let mut out: Option<Vec<u8>> = None;
    let mut state = State::Normal;
    let mut idx = 0;
    let mut position = 1usize;

    while idx < bytes.len() {
        let b = bytes[idx];
        let mut replaced = false;
        match state {
            State::Normal => match b {
                b'\'' => state = State::SingleQuoted,
                b'"' => state = State::DoubleQuoted,
                _ if is_line_comment_start(bytes, idx) => state = State::LineComment,
                _ if is_block_comment_start(bytes, idx) => state = State::BlockComment(1),
                b'$' => {
                    if let Some((tag, advance)) = try_start_dollar_quote(bytes, idx) {
                        if let Some(buf) = out.as_mut() {
                            buf.extend_from_slice(&bytes[idx..=advance]);
                        }
                        state = State::DollarQuoted(tag);
                        idx = advance + 1;
                        continue;
                    }
                }
                b'?' => {
                    if !bytes.get(idx + 1).is_some_and(u8::is_ascii_digit) {
                        let buf = out.get_or_insert_with(|| bytes[..idx].to_vec());
                        buf.extend_from_slice(style.token(position).as_bytes());
                        position += 1;
                        replaced = true;
                    }
                }
                _ => {}
            },
            State::SingleQuoted => {
                if b == b'\'' {
                    if bytes.get(idx + 1) == Some(&b'\'') {
                        if let Some(buf) = out.as_mut() {
                            buf.push(b);
                        }
                        idx += 1; // skip escaped quote
                    } else {
                        state = State::Normal;
                    }
                }
            }
            State::DoubleQuoted => {
                if b == b'"' {
                    if bytes.get(idx + 1) == Some(&b'"') {
                        if let Some(buf) = out.as_mut() {
                            buf.push(b);
                        }
                        idx += 1; // skip escaped quote
                    } else {
                        state = State::Normal;
                    }
                }
            }
            State::LineComment => {
                if b == b'\n' {
                    state = State::Normal;
                }
            }
            State::BlockComment(depth) => {
                if is_block_comment_start(bytes, idx) {
                    state = State::BlockComment(depth + 1);
                } else if is_block_comment_end(bytes, idx) {
                    if depth == 1 {
                        state = State::Normal;
                    } else {
                        state = State::BlockComment(depth - 1);
                    }
                }
            }
            State::DollarQuoted(ref tag) => {
                if b == b'$' && matches_tag(bytes, idx, tag) {
                    let consumed = tag.len() + 2;
                    if let Some(buf) = out.as_mut() {
                        buf.extend_from_slice(&bytes[idx..idx + consumed]);
                    }
                    state = State::Normal;
                    idx += consumed;
                    continue;
                }
            }
        }

        if let Some(buf) = out.as_mut()
            && !replaced
        {
            buf.push(b);
        }

        idx += 1;
    }

    match out {
        Some(buf) => Cow::Owned(String::from_utf8_lossy(&buf).into_owned()),
        None => Cow::Borrowed(sql),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_postgres_placeholders_left_to_right() {
        let sql = "SELECT * FROM t WHERE a = ? AND b = ?";
        let res = number_placeholders(sql, PlaceholderStyle::Postgres);
        assert_eq!(res, "SELECT * FROM t WHERE a = $1 AND b = $2");
    }

    #[test]
    fn numbers_sqlite_and_mssql_placeholders() {
        let sql = "INSERT INTO t VALUES(?,?)";
        assert_eq!(
            number_placeholders(sql, PlaceholderStyle::Sqlite),
            "INSERT INTO t VALUES(?1,?2)"
        );
        assert_eq!(
            number_placeholders(sql, PlaceholderStyle::Mssql),
            "INSERT INTO t VALUES(@P1,@P2)"
        );
    }

    #[test]
    fn skips_inside_literals_and_comments() {
        let sql = "select '?', x -- ?\n/* ? */ from t where a = ?";
        let res = number_placeholders(sql, PlaceholderStyle::Postgres);
        assert_eq!(res, "select '?', x -- ?\n/* ? */ from t where a = $1");
    }

    #[test]
    fn skips_quoted_identifiers_and_dollar_quotes() {
        let sql = r#"select "a?b", $q$ ? $q$ from t where a = ?"#;
        let res = number_placeholders(sql, PlaceholderStyle::Postgres);
        assert_eq!(res, r#"select "a?b", $q$ ? $q$ from t where a = $1"#);
    }

    #[test]
    fn leaves_pre_numbered_tokens_alone() {
        let sql = "select * from t where a = ?2 and b = ?";
        let res = number_placeholders(sql, PlaceholderStyle::Sqlite);
        assert_eq!(res, "select * from t where a = ?2 and b = ?1");
    }

    #[test]
    fn borrows_when_nothing_to_substitute() {
        let sql = "select 1 from t";
        let res = number_placeholders(sql, PlaceholderStyle::Postgres);
        assert!(matches!(res, Cow::Borrowed(_)));
        assert_eq!(res, sql);
    }

    #[test]
    fn escaped_quotes_stay_inside_literal() {
        let sql = "select 'it''s ?' from t where a = ?";
        let res = number_placeholders(sql, PlaceholderStyle::Postgres);
        assert_eq!(res, "select 'it''s ?' from t where a = $1");
    }
}
