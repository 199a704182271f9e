//! Safe SQL identifier handling.
//!
//! Every identifier that reaches generated SQL goes through this module:
//!
//! - [`quote_identifier`] quotes a single name (`users` → `"users"`), doubling embedded `"`
//! - [`quote_column`] accepts `*`, `NAME(args) [[AS] alias]` and `[[schema.]table.]column [[AS] alias]`
//! - [`quote_table`] accepts `[schema.]table [[AS] alias]`
//!
//! Unquoted segments must match `[A-Za-z_][A-Za-z0-9_$]*`. Already quoted segments
//! (`"CamelCase"`) are accepted as-is, which makes quoting idempotent.
//!
//! # Example
//! ```ignore
//! use birdql::ident::{quote_column, quote_table};
//!
//! assert_eq!(quote_column("users.id AS uid")?, r#""users"."id" AS "uid""#);
//! assert_eq!(quote_column("count(*) n")?, r#"COUNT(*) AS "n""#);
//! assert_eq!(quote_table("public.users u")?, r#""public"."users" AS "u""#);
//! # Ok::<(), birdql::QbError>(())
//! ```

use crate::error::{QbError, QbResult};
use regex::Regex;
use std::sync::OnceLock;

/// One identifier segment, unquoted or already double-quoted.
const SEGMENT: &str = r#"(?:[A-Za-z_][A-Za-z0-9_$]*|"(?:[^"]|"")+")"#;

fn column_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        let pattern = format!(
            r"(?i)^\s*({SEGMENT})(?:\.({SEGMENT}))?(?:\.({SEGMENT}))?(?:\s+(?:AS\s+)?({SEGMENT}))?\s*$"
        );
        Regex::new(&pattern).expect("invalid built-in column regex")
    })
}

fn table_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        let pattern =
            format!(r"(?i)^\s*({SEGMENT})(?:\.({SEGMENT}))?(?:\s+(?:AS\s+)?({SEGMENT}))?\s*$");
        Regex::new(&pattern).expect("invalid built-in table regex")
    })
}

fn function_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        let pattern = format!(
            r"(?is)^\s*([A-Z_][A-Z0-9_]*)\s*\(\s*(.*?)\s*\)(?:\s+(?:AS\s+)?({SEGMENT}))?\s*$"
        );
        Regex::new(&pattern).expect("invalid built-in function regex")
    })
}

fn quoted_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"^"(?:[^"]|"")+"$"#).expect("invalid built-in quoted regex"))
}

fn literal_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(?:-?[0-9]+(?:\.[0-9]+)?|'(?:[^']|'')*')$")
            .expect("invalid built-in literal regex")
    })
}

fn denylist() -> &'static [Regex] {
    static RES: OnceLock<Vec<Regex>> = OnceLock::new();
    RES.get_or_init(|| {
        [
            r";\s*$",
            r"(?i)\bUNION\b",
            r"(?i)\bDROP\b",
            r"(?i)\bDELETE\b",
            r"(?i)\bUPDATE\b",
            r"(?i)\bINSERT\b",
            r"(?i)\bALTER\b",
            r"(?i)\bEXEC\b",
        ]
        .iter()
        .map(|p| Regex::new(p).expect("invalid built-in denylist regex"))
        .collect()
    })
}

fn is_quoted(name: &str) -> bool {
    quoted_re().is_match(name)
}

/// Reject names matching the denylist, looking inside quoted names as well.
fn check_denylist(name: &str) -> QbResult<()> {
    let inner = unquote(name);
    for candidate in [name, inner.as_str()] {
        if let Some(re) = denylist().iter().find(|re| re.is_match(candidate)) {
            return Err(QbError::InvalidIdentifier(format!(
                "\"{name}\" matches dangerous pattern `{}`",
                re.as_str()
            )));
        }
    }
    Ok(())
}

/// Strip surrounding quotes and collapse `""` escapes.
fn unquote(segment: &str) -> String {
    if is_quoted(segment) {
        segment[1..segment.len() - 1].replace("\"\"", "\"")
    } else {
        segment.to_string()
    }
}

fn write_quoted(out: &mut String, name: &str) {
    out.push('"');
    for ch in name.chars() {
        if ch == '"' {
            out.push('"');
            out.push('"');
        } else {
            out.push(ch);
        }
    }
    out.push('"');
}

/// Quote a single identifier.
///
/// Fails with [`QbError::InvalidIdentifier`] if the name ends with `;` or contains one of
/// `UNION`, `DROP`, `DELETE`, `UPDATE`, `INSERT`, `ALTER`, `EXEC` as a whole word.
/// A name that is already a well-formed quoted identifier is returned unchanged.
pub fn quote_identifier(name: &str) -> QbResult<String> {
    check_denylist(name)?;
    if is_quoted(name) {
        return Ok(name.to_string());
    }
    let mut out = String::with_capacity(name.len() + 2);
    write_quoted(&mut out, name);
    Ok(out)
}

/// A parsed, validated, dotted identifier with an optional alias.
///
/// Parts hold the raw (unescaped) names; [`Ident::to_sql`] re-quotes them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ident {
    pub parts: Vec<String>,
    pub alias: Option<String>,
}

impl Ident {
    /// Parse `[[schema.]table.]column [[AS] alias]`.
    pub fn parse_column(expr: &str) -> QbResult<Self> {
        if expr.trim().is_empty() {
            return Err(QbError::MissingColumn(format!("\"{expr}\"")));
        }
        let caps = column_re()
            .captures(expr)
            .ok_or_else(|| QbError::InvalidColumnExpression(expr.to_string()))?;
        let segments: Vec<&str> = (1..=3)
            .filter_map(|i| caps.get(i).map(|m| m.as_str()))
            .collect();
        Self::from_segments(&segments, caps.get(4).map(|m| m.as_str()))
    }

    /// Parse `[schema.]table [[AS] alias]`.
    pub fn parse_table(expr: &str) -> QbResult<Self> {
        if expr.trim().is_empty() {
            return Err(QbError::MissingTable(format!("\"{expr}\"")));
        }
        let caps = table_re()
            .captures(expr)
            .ok_or_else(|| QbError::InvalidTableExpression(expr.to_string()))?;
        let segments: Vec<&str> = (1..=2)
            .filter_map(|i| caps.get(i).map(|m| m.as_str()))
            .collect();
        Self::from_segments(&segments, caps.get(3).map(|m| m.as_str()))
    }

    fn from_segments(segments: &[&str], alias: Option<&str>) -> QbResult<Self> {
        let mut parts = Vec::with_capacity(segments.len());
        for segment in segments {
            check_denylist(segment)?;
            parts.push(unquote(segment));
        }
        let alias = alias
            .map(|a| check_denylist(a).map(|_| unquote(a)))
            .transpose()?;
        Ok(Self { parts, alias })
    }

    /// Render the identifier as quoted SQL.
    pub fn to_sql(&self) -> String {
        let mut out = String::new();
        self.write_sql(&mut out);
        out
    }

    pub(crate) fn write_sql(&self, out: &mut String) {
        for (i, part) in self.parts.iter().enumerate() {
            if i > 0 {
                out.push('.');
            }
            write_quoted(out, part);
        }
        if let Some(alias) = &self.alias {
            out.push_str(" AS ");
            write_quoted(out, alias);
        }
    }
}

/// Quote a column expression.
///
/// Accepts a bare `*`, a function call `NAME(args) [[AS] alias]` whose arguments are
/// quoted recursively, or a dotted column `[[schema.]table.]column [[AS] alias]`.
pub fn quote_column(expr: &str) -> QbResult<String> {
    if expr.trim() == "*" {
        return Ok("*".to_string());
    }

    if let Some(caps) = function_re().captures(expr) {
        let name = &caps[1];
        check_denylist(name)?;

        let mut args = Vec::new();
        for arg in split_arguments(&caps[2]) {
            if arg == "*" || literal_re().is_match(&arg) {
                args.push(arg);
            } else {
                args.push(quote_column(&arg)?);
            }
        }

        let mut out = format!("{}({})", name.to_uppercase(), args.join(", "));
        if let Some(alias) = caps.get(3) {
            out.push_str(" AS ");
            out.push_str(&quote_identifier(&unquote(alias.as_str()))?);
        }
        return Ok(out);
    }

    Ident::parse_column(expr).map(|ident| ident.to_sql())
}

/// Quote every column expression, failing on the first invalid one.
pub fn quote_columns<S: AsRef<str>>(exprs: &[S]) -> QbResult<Vec<String>> {
    exprs.iter().map(|e| quote_column(e.as_ref())).collect()
}

/// Quote a table expression `[schema.]table [[AS] alias]`.
pub fn quote_table(expr: &str) -> QbResult<String> {
    Ident::parse_table(expr).map(|ident| ident.to_sql())
}

/// Split a function argument list on top-level commas.
///
/// Commas nested inside parentheses or inside single/double-quoted text (with
/// doubled-quote escapes) do not split. Each argument is trimmed; blank input
/// yields no arguments.
pub fn split_arguments(args: &str) -> Vec<String> {
    let mut result = Vec::new();
    if args.trim().is_empty() {
        return result;
    }

    let mut current = String::new();
    let mut depth: i32 = 0;
    let mut quote: Option<char> = None;
    let mut chars = args.chars().peekable();

    while let Some(ch) = chars.next() {
        match quote {
            Some(q) if ch == q => {
                current.push(ch);
                if chars.peek() == Some(&q) {
                    // Escaped quote: '' or ""
                    current.push(q);
                    chars.next();
                } else {
                    quote = None;
                }
            }
            Some(_) => current.push(ch),
            None => match ch {
                '"' | '\'' => {
                    quote = Some(ch);
                    current.push(ch);
                }
                '(' => {
                    depth += 1;
                    current.push(ch);
                }
                ')' => {
                    depth -= 1;
                    current.push(ch);
                }
                ',' if depth == 0 => {
                    result.push(current.trim().to_string());
                    current.clear();
                }
                _ => current.push(ch),
            },
        }
    }

    if !current.trim().is_empty() {
        result.push(current.trim().to_string());
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifier_simple() {
        assert_eq!(quote_identifier("users").unwrap(), r#""users""#);
    }

    #[test]
    fn identifier_escapes_embedded_quote() {
        assert_eq!(quote_identifier(r#"has"quote"#).unwrap(), r#""has""quote""#);
    }

    #[test]
    fn identifier_already_quoted_is_unchanged() {
        assert_eq!(quote_identifier(r#""CamelCase""#).unwrap(), r#""CamelCase""#);
    }

    #[test]
    fn identifier_half_quoted_is_escaped() {
        assert_eq!(
            quote_identifier(r#""a" OR "b""#).unwrap(),
            r#""""a"" OR ""b""""#
        );
    }

    #[test]
    fn identifier_rejects_trailing_semicolon() {
        let err = quote_identifier("users; ").unwrap_err();
        assert!(matches!(err, QbError::InvalidIdentifier(_)));
    }

    #[test]
    fn identifier_rejects_keyword_tokens() {
        for name in ["drop", "x UNION y", "Delete", "exec"] {
            assert!(
                matches!(quote_identifier(name), Err(QbError::InvalidIdentifier(_))),
                "{name} should be rejected"
            );
        }
    }

    #[test]
    fn identifier_allows_keyword_substrings() {
        assert_eq!(quote_identifier("updated_at").unwrap(), r#""updated_at""#);
        assert_eq!(quote_identifier("dropped").unwrap(), r#""dropped""#);
        assert_eq!(quote_identifier("is_deleted").unwrap(), r#""is_deleted""#);
    }

    #[test]
    fn column_star() {
        assert_eq!(quote_column("*").unwrap(), "*");
    }

    #[test]
    fn column_simple_and_dotted() {
        assert_eq!(quote_column("id").unwrap(), r#""id""#);
        assert_eq!(quote_column("users.id").unwrap(), r#""users"."id""#);
        assert_eq!(
            quote_column("public.users.id").unwrap(),
            r#""public"."users"."id""#
        );
    }

    #[test]
    fn column_with_alias() {
        assert_eq!(quote_column("users.id AS uid").unwrap(), r#""users"."id" AS "uid""#);
        assert_eq!(quote_column("users.id uid").unwrap(), r#""users"."id" AS "uid""#);
        assert_eq!(quote_column("id as uid").unwrap(), r#""id" AS "uid""#);
    }

    #[test]
    fn column_quoting_is_idempotent() {
        for expr in ["users.id", "public.users.id AS uid", "COUNT(users.id) AS n", "MAX(*)"] {
            let once = quote_column(expr).unwrap();
            assert_eq!(quote_column(&once).unwrap(), once, "{expr}");
        }
    }

    #[test]
    fn column_function_call() {
        assert_eq!(quote_column("COUNT(*)").unwrap(), "COUNT(*)");
        assert_eq!(quote_column("max(id)").unwrap(), r#"MAX("id")"#);
        assert_eq!(
            quote_column("count(users.id) AS total").unwrap(),
            r#"COUNT("users"."id") AS "total""#
        );
    }

    #[test]
    fn column_nested_function_with_literals() {
        assert_eq!(
            quote_column("COALESCE(MAX(score), 0) best").unwrap(),
            r#"COALESCE(MAX("score"), 0) AS "best""#
        );
        assert_eq!(
            quote_column("CONCAT(first_name, ', ', last_name)").unwrap(),
            r#"CONCAT("first_name", ', ', "last_name")"#
        );
    }

    #[test]
    fn column_zero_arg_function() {
        assert_eq!(quote_column("now()").unwrap(), "NOW()");
    }

    #[test]
    fn column_rejects_malformed() {
        for expr in ["1abc", "a..b", "a.b.c.d", "id; --", "a b c"] {
            assert!(
                matches!(quote_column(expr), Err(QbError::InvalidColumnExpression(_))),
                "{expr} should be rejected"
            );
        }
    }

    #[test]
    fn column_rejects_blank() {
        assert!(matches!(quote_column("  "), Err(QbError::MissingColumn(_))));
    }

    #[test]
    fn column_rejects_dangerous_segment() {
        assert!(matches!(
            quote_column("users.drop"),
            Err(QbError::InvalidIdentifier(_))
        ));
        assert!(matches!(
            quote_column(r#""x;""#),
            Err(QbError::InvalidIdentifier(_))
        ));
    }

    #[test]
    fn columns_fail_on_first_invalid() {
        assert_eq!(
            quote_columns(&["id", "name"]).unwrap(),
            vec![r#""id""#.to_string(), r#""name""#.to_string()]
        );
        assert!(quote_columns(&["id", "1x"]).is_err());
    }

    #[test]
    fn table_forms() {
        assert_eq!(quote_table("users").unwrap(), r#""users""#);
        assert_eq!(quote_table("public.users").unwrap(), r#""public"."users""#);
        assert_eq!(quote_table("users AS u").unwrap(), r#""users" AS "u""#);
        assert_eq!(quote_table("public.users u").unwrap(), r#""public"."users" AS "u""#);
    }

    #[test]
    fn table_quoting_is_idempotent() {
        let once = quote_table("public.users u").unwrap();
        assert_eq!(quote_table(&once).unwrap(), once);
    }

    #[test]
    fn table_rejects_malformed_and_blank() {
        assert!(matches!(
            quote_table("a.b.c"),
            Err(QbError::InvalidTableExpression(_))
        ));
        assert!(matches!(quote_table(""), Err(QbError::MissingTable(_))));
    }

    #[test]
    fn split_respects_nesting_and_quotes() {
        assert_eq!(split_arguments("a, b"), vec!["a", "b"]);
        assert_eq!(split_arguments("f(a, b), c"), vec!["f(a, b)", "c"]);
        assert_eq!(split_arguments("'x, y', z"), vec!["'x, y'", "z"]);
        assert_eq!(split_arguments(r#""a,""b", c"#), vec![r#""a,""b""#, "c"]);
        assert_eq!(split_arguments("'it''s, ok', 1"), vec!["'it''s, ok'", "1"]);
        assert!(split_arguments("   ").is_empty());
    }
}
