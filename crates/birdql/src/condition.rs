//! Condition model for WHERE clauses.
//!
//! Callers describe filters with [`ConditionInput`]: tuples such as
//! `("name", "=", "Deven")`, logical groups built with [`and`] / [`or`], and raw
//! fragments. [`Condition::classify`] turns an input into a validated
//! [`Condition`] tree, and [`Condition::build`] serializes that tree against a
//! shared [`ParamContext`].
//!
//! # Example
//! ```ignore
//! use birdql::condition::{Condition, ConditionInput, col_ref, or};
//! use birdql::qb::ParamContext;
//!
//! let cond = Condition::classify(or([
//!     ConditionInput::from(("age", ">", 18)),
//!     ("name", "=", col_ref("data.name")).into(),
//! ]))?;
//!
//! let mut ctx = ParamContext::new();
//! assert_eq!(cond.build(&mut ctx)?, r#"("age" > $0 OR "name" = "data"."name")"#);
//! # Ok::<(), birdql::QbError>(())
//! ```

use crate::config::LikeValues;
use crate::error::{QbError, QbResult};
use crate::ident::quote_column;
use crate::qb::{ParamContext, SelectQb, SqlQb};
use crate::value::Value;
use std::fmt;

// ==================== Operators ====================

/// Recognized condition operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Eq,
    /// `!=`
    Ne,
    /// `<>`
    NotEqual,
    Gt,
    Lt,
    Gte,
    Lte,
    In,
    NotIn,
    Like,
    NotLike,
    Ilike,
    NotIlike,
    IsNull,
    IsNotNull,
    Between,
    NotBetween,
}

impl Operator {
    /// Parse operator text, ignoring case and runs of whitespace.
    ///
    /// Returns `None` for anything outside the recognized set.
    pub fn parse(text: &str) -> Option<Self> {
        let normalized = text
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_ascii_uppercase();

        let op = match normalized.as_str() {
            "=" => Operator::Eq,
            "!=" => Operator::Ne,
            "<>" => Operator::NotEqual,
            ">" => Operator::Gt,
            "<" => Operator::Lt,
            ">=" => Operator::Gte,
            "<=" => Operator::Lte,
            "IN" => Operator::In,
            "NOT IN" => Operator::NotIn,
            "LIKE" => Operator::Like,
            "NOT LIKE" => Operator::NotLike,
            "ILIKE" => Operator::Ilike,
            "NOT ILIKE" => Operator::NotIlike,
            "IS NULL" => Operator::IsNull,
            "IS NOT NULL" => Operator::IsNotNull,
            "BETWEEN" => Operator::Between,
            "NOT BETWEEN" => Operator::NotBetween,
            _ => return None,
        };
        Some(op)
    }

    /// SQL text of the operator.
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Eq => "=",
            Operator::Ne => "!=",
            Operator::NotEqual => "<>",
            Operator::Gt => ">",
            Operator::Lt => "<",
            Operator::Gte => ">=",
            Operator::Lte => "<=",
            Operator::In => "IN",
            Operator::NotIn => "NOT IN",
            Operator::Like => "LIKE",
            Operator::NotLike => "NOT LIKE",
            Operator::Ilike => "ILIKE",
            Operator::NotIlike => "NOT ILIKE",
            Operator::IsNull => "IS NULL",
            Operator::IsNotNull => "IS NOT NULL",
            Operator::Between => "BETWEEN",
            Operator::NotBetween => "NOT BETWEEN",
        }
    }

    /// `= != <> > < >= <=`
    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            Operator::Eq
                | Operator::Ne
                | Operator::NotEqual
                | Operator::Gt
                | Operator::Lt
                | Operator::Gte
                | Operator::Lte
        )
    }

    pub fn is_null_check(&self) -> bool {
        matches!(self, Operator::IsNull | Operator::IsNotNull)
    }

    pub fn is_list(&self) -> bool {
        matches!(self, Operator::In | Operator::NotIn)
    }

    pub fn is_pattern(&self) -> bool {
        matches!(
            self,
            Operator::Like | Operator::NotLike | Operator::Ilike | Operator::NotIlike
        )
    }

    pub fn is_range(&self) -> bool {
        matches!(self, Operator::Between | Operator::NotBetween)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Boolean combinator of a logical group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Combinator {
    And,
    Or,
}

impl Combinator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Combinator::And => "AND",
            Combinator::Or => "OR",
        }
    }
}

// ==================== Input grammar ====================

/// Marker for "compare against another column" instead of a bound value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnRef {
    pub column: String,
}

/// Reference another column: `("name", "=", col_ref("data.name"))`.
pub fn col_ref(column: impl Into<String>) -> ColumnRef {
    ColumnRef {
        column: column.into(),
    }
}

/// One element of a condition tuple.
#[derive(Debug, Clone, PartialEq)]
pub enum Term {
    Value(Value),
    List(Vec<Value>),
    Ref(ColumnRef),
    Select(Box<SelectQb>),
}

impl Term {
    fn describe(&self) -> &'static str {
        match self {
            Term::Value(v) => v.type_name(),
            Term::List(_) => "list",
            Term::Ref(_) => "column reference",
            Term::Select(_) => "subquery",
        }
    }
}

macro_rules! impl_term_from_scalar {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Term {
                fn from(v: $ty) -> Self {
                    Term::Value(Value::from(v))
                }
            }
        )*
    };
}

impl_term_from_scalar!(
    bool,
    i8,
    i16,
    i32,
    i64,
    u8,
    u16,
    u32,
    f32,
    f64,
    &str,
    String,
    &String,
    uuid::Uuid,
    chrono::NaiveDate,
    chrono::NaiveDateTime,
);

impl From<Value> for Term {
    fn from(v: Value) -> Self {
        Term::Value(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Term {
    fn from(v: Option<T>) -> Self {
        Term::Value(Value::from(v))
    }
}

impl<T: Into<Value>> From<Vec<T>> for Term {
    fn from(values: Vec<T>) -> Self {
        Term::List(values.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>, const N: usize> From<[T; N]> for Term {
    fn from(values: [T; N]) -> Self {
        Term::List(values.into_iter().map(Into::into).collect())
    }
}

impl From<ColumnRef> for Term {
    fn from(r: ColumnRef) -> Self {
        Term::Ref(r)
    }
}

impl From<SelectQb> for Term {
    fn from(q: SelectQb) -> Self {
        Term::Select(Box::new(q))
    }
}

/// Unclassified condition, as written by the caller.
#[derive(Debug, Clone, PartialEq)]
pub enum ConditionInput {
    /// `subject op [value]`; `value` is `None` for the two-element form.
    Tuple {
        subject: Term,
        op: String,
        value: Option<Term>,
    },
    /// Nested conditions joined by one combinator.
    Group {
        combinator: Combinator,
        conditions: Vec<ConditionInput>,
    },
    /// SQL inserted verbatim. The caller is responsible for its safety.
    Raw(String),
}

impl<S, O> From<(S, O)> for ConditionInput
where
    S: Into<Term>,
    O: Into<String>,
{
    fn from((subject, op): (S, O)) -> Self {
        ConditionInput::Tuple {
            subject: subject.into(),
            op: op.into(),
            value: None,
        }
    }
}

impl<S, O, V> From<(S, O, V)> for ConditionInput
where
    S: Into<Term>,
    O: Into<String>,
    V: Into<Term>,
{
    fn from((subject, op, value): (S, O, V)) -> Self {
        ConditionInput::Tuple {
            subject: subject.into(),
            op: op.into(),
            value: Some(value.into()),
        }
    }
}

impl From<&str> for ConditionInput {
    fn from(sql: &str) -> Self {
        ConditionInput::Raw(sql.to_string())
    }
}

impl From<String> for ConditionInput {
    fn from(sql: String) -> Self {
        ConditionInput::Raw(sql)
    }
}

/// Group conditions with AND.
pub fn and<I, C>(conditions: I) -> ConditionInput
where
    I: IntoIterator<Item = C>,
    C: Into<ConditionInput>,
{
    ConditionInput::Group {
        combinator: Combinator::And,
        conditions: conditions.into_iter().map(Into::into).collect(),
    }
}

/// Group conditions with OR.
pub fn or<I, C>(conditions: I) -> ConditionInput
where
    I: IntoIterator<Item = C>,
    C: Into<ConditionInput>,
{
    ConditionInput::Group {
        combinator: Combinator::Or,
        conditions: conditions.into_iter().map(Into::into).collect(),
    }
}

/// Raw SQL fragment, emitted unchanged.
pub fn raw(sql: impl Into<String>) -> ConditionInput {
    ConditionInput::Raw(sql.into())
}

/// Column-to-column comparison: `where_ref("name", "=", "data.name")`.
pub fn where_ref(
    field: impl Into<String>,
    op: impl Into<String>,
    column: impl Into<String>,
) -> ConditionInput {
    ConditionInput::Tuple {
        subject: Term::Value(Value::Text(field.into())),
        op: op.into(),
        value: Some(Term::Ref(col_ref(column))),
    }
}

// ==================== Classified conditions ====================

/// A validated condition. Column fields hold already-quoted SQL.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// `field op $n`
    Compare {
        field: String,
        op: Operator,
        value: Value,
    },
    /// `field IS [NOT] NULL`
    NullCheck { field: String, op: Operator },
    /// `field [NOT] IN ($a, $b, ...)`
    InList {
        field: String,
        op: Operator,
        values: Vec<Value>,
    },
    /// `field [NOT] BETWEEN $a AND $b`
    Between {
        field: String,
        op: Operator,
        low: Value,
        high: Value,
    },
    /// `field [NOT] [I]LIKE pattern`
    Pattern {
        field: String,
        op: Operator,
        pattern: String,
    },
    /// `field op other_column`
    ColumnRef {
        field: String,
        op: Operator,
        column: String,
    },
    /// `(SELECT ...) op $n`
    Subquery {
        query: Box<SelectQb>,
        op: Operator,
        value: Value,
    },
    Group {
        combinator: Combinator,
        conditions: Vec<Condition>,
    },
    Raw(String),
}

impl Condition {
    /// Classify and validate a caller-supplied condition.
    ///
    /// Shapes are tried in a fixed order: logical group, raw fragment,
    /// subquery comparison, column reference, then simple conditions
    /// sub-classified by operator and arity.
    pub fn classify(input: impl Into<ConditionInput>) -> QbResult<Self> {
        match input.into() {
            ConditionInput::Group {
                combinator,
                conditions,
            } => {
                let conditions = conditions
                    .into_iter()
                    .map(Condition::classify)
                    .collect::<QbResult<Vec<_>>>()?;
                Ok(Condition::Group {
                    combinator,
                    conditions,
                })
            }
            ConditionInput::Raw(sql) => Ok(Condition::Raw(sql)),
            ConditionInput::Tuple {
                subject: Term::Select(query),
                op,
                value: Some(value),
            } => classify_subquery(query, &op, value),
            ConditionInput::Tuple {
                subject,
                op,
                value: Some(Term::Ref(column)),
            } => classify_reference(subject, &op, column),
            ConditionInput::Tuple { subject, op, value } => classify_simple(subject, &op, value),
        }
    }

    /// Check if this condition renders to nothing (an empty group).
    pub fn is_empty(&self) -> bool {
        match self {
            Condition::Group { conditions, .. } => conditions.iter().all(Condition::is_empty),
            _ => false,
        }
    }

    /// Serialize the condition, allocating placeholders from `ctx`.
    ///
    /// A subquery comparison binds its compared value before the subquery
    /// renders, so the outer value takes the lower placeholder.
    pub fn build(&self, ctx: &mut ParamContext) -> QbResult<String> {
        match self {
            Condition::Compare { field, op, value } => {
                let ph = ctx.add_parameter(value.clone());
                Ok(format!("{field} {op} {ph}"))
            }
            Condition::NullCheck { field, op } => Ok(format!("{field} {op}")),
            Condition::InList { field, op, values } => {
                let placeholders: Vec<String> = values
                    .iter()
                    .map(|v| ctx.add_parameter(v.clone()))
                    .collect();
                Ok(format!("{field} {op} ({})", placeholders.join(", ")))
            }
            Condition::Between {
                field,
                op,
                low,
                high,
            } => {
                let low = ctx.add_parameter(low.clone());
                let high = ctx.add_parameter(high.clone());
                Ok(format!("{field} {op} {low} AND {high}"))
            }
            Condition::Pattern { field, op, pattern } => {
                let rhs = match ctx.options().like_values {
                    LikeValues::Inline => format!("'{}'", pattern.replace('\'', "''")),
                    LikeValues::Bind => ctx.add_parameter(pattern.as_str()),
                };
                Ok(format!("{field} {op} {rhs}"))
            }
            Condition::ColumnRef { field, op, column } => Ok(format!("{field} {op} {column}")),
            Condition::Subquery { query, op, value } => {
                let ph = ctx.add_parameter(value.clone());
                let inner = query.build_with(ctx)?;
                Ok(format!("({inner}) {op} {ph}"))
            }
            Condition::Group {
                combinator,
                conditions,
            } => {
                let mut parts = Vec::with_capacity(conditions.len());
                for cond in conditions {
                    let sql = cond.build(ctx)?;
                    if !sql.is_empty() {
                        parts.push(sql);
                    }
                }
                if parts.is_empty() {
                    return Ok(String::new());
                }
                let sep = format!(" {} ", combinator.as_str());
                Ok(format!("({})", parts.join(&sep)))
            }
            Condition::Raw(sql) => Ok(sql.clone()),
        }
    }
}

fn parse_operator(op: &str) -> QbResult<Operator> {
    Operator::parse(op).ok_or_else(|| QbError::unsupported_operator(format!("\"{op}\"")))
}

/// Validate the field of a condition and return its quoted form.
fn quoted_field(subject: Term) -> QbResult<String> {
    match subject {
        Term::Value(Value::Text(field)) if !field.trim().is_empty() => quote_column(&field),
        Term::Value(Value::Text(_)) => Err(QbError::invalid_field("field name must not be empty")),
        other => Err(QbError::invalid_field(format!(
            "field must be a column name, got {}",
            other.describe()
        ))),
    }
}

fn classify_subquery(query: Box<SelectQb>, op: &str, value: Term) -> QbResult<Condition> {
    let op = parse_operator(op)?;
    if !op.is_comparison() {
        return Err(QbError::unsupported_operator(format!(
            "{op} cannot compare a subquery"
        )));
    }
    match value {
        Term::Value(value) => Ok(Condition::Subquery { query, op, value }),
        other => Err(QbError::invalid_condition(format!(
            "subquery comparison with {op} requires a scalar value, got {}",
            other.describe()
        ))),
    }
}

fn classify_reference(subject: Term, op: &str, column: ColumnRef) -> QbResult<Condition> {
    let field = quoted_field(subject)?;
    let op = parse_operator(op)?;
    if !op.is_comparison() {
        return Err(QbError::unsupported_operator(format!(
            "{op} cannot compare two columns"
        )));
    }
    if column.column.trim().is_empty() {
        return Err(QbError::invalid_field("referenced column must not be empty"));
    }
    let column = quote_column(&column.column)?;
    Ok(Condition::ColumnRef { field, op, column })
}

fn classify_simple(subject: Term, op: &str, value: Option<Term>) -> QbResult<Condition> {
    let field = quoted_field(subject)?;
    let op = parse_operator(op)?;

    match (op, value) {
        (op, None) if op.is_null_check() => Ok(Condition::NullCheck { field, op }),
        (op, Some(_)) if op.is_null_check() => Err(QbError::invalid_condition(format!(
            "{op} does not take a value"
        ))),
        (op, None) => Err(QbError::invalid_condition(format!(
            "{op} requires a value"
        ))),

        (op, Some(Term::List(values))) if op.is_list() => {
            if values.is_empty() {
                return Err(QbError::invalid_condition(format!(
                    "{op} requires a non-empty list"
                )));
            }
            Ok(Condition::InList { field, op, values })
        }
        (op, Some(other)) if op.is_list() => Err(QbError::invalid_condition(format!(
            "{op} requires a list, got {}",
            other.describe()
        ))),

        (op, Some(Term::List(values))) if op.is_range() => {
            let [low, high]: [Value; 2] = values.try_into().map_err(|v: Vec<Value>| {
                QbError::invalid_condition(format!(
                    "{op} requires exactly two values, got {}",
                    v.len()
                ))
            })?;
            Ok(Condition::Between {
                field,
                op,
                low,
                high,
            })
        }
        (op, Some(other)) if op.is_range() => Err(QbError::invalid_condition(format!(
            "{op} requires a list of two values, got {}",
            other.describe()
        ))),

        (op, Some(Term::Value(Value::Text(pattern)))) if op.is_pattern() => {
            Ok(Condition::Pattern { field, op, pattern })
        }
        (op, Some(other)) if op.is_pattern() => Err(QbError::invalid_condition(format!(
            "{op} requires a string pattern, got {}",
            other.describe()
        ))),

        (op, Some(Term::Value(value))) => Ok(Condition::Compare { field, op, value }),
        (op, Some(other)) => Err(QbError::invalid_condition(format!(
            "{op} requires a scalar value, got {}",
            other.describe()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BuildOptions;

    fn render(input: impl Into<ConditionInput>) -> (String, ParamContext) {
        let mut ctx = ParamContext::new();
        let sql = Condition::classify(input).unwrap().build(&mut ctx).unwrap();
        (sql, ctx)
    }

    #[test]
    fn operator_parse_is_case_and_space_insensitive() {
        assert_eq!(Operator::parse("is  not null"), Some(Operator::IsNotNull));
        assert_eq!(Operator::parse(" not\tin "), Some(Operator::NotIn));
        assert_eq!(Operator::parse("ilike"), Some(Operator::Ilike));
        assert_eq!(Operator::parse("=="), None);
    }

    #[test]
    fn simple_comparison() {
        let (sql, ctx) = render(("name", "=", "Deven"));
        assert_eq!(sql, r#""name" = $0"#);
        assert_eq!(ctx.parameters().get("$0"), Some(&Value::from("Deven")));
    }

    #[test]
    fn null_check_uses_no_placeholder() {
        let (sql, ctx) = render(("users.id", "IS NOT NULL"));
        assert_eq!(sql, r#""users"."id" IS NOT NULL"#);
        assert!(ctx.is_empty());
    }

    #[test]
    fn in_list_preserves_order() {
        let (sql, ctx) = render(("users.id", "IN", vec!["1", "2", "3"]));
        assert_eq!(sql, r#""users"."id" IN ($0, $1, $2)"#);
        assert_eq!(ctx.parameters().get("$2"), Some(&Value::from("3")));
    }

    #[test]
    fn in_list_single_element() {
        let (sql, ctx) = render(("id", "NOT IN", [7]));
        assert_eq!(sql, r#""id" NOT IN ($0)"#);
        assert_eq!(ctx.len(), 1);
    }

    #[test]
    fn between_takes_two_placeholders() {
        let (sql, _) = render(("age", "between", [18, 65]));
        assert_eq!(sql, r#""age" BETWEEN $0 AND $1"#);
    }

    #[test]
    fn like_is_inlined_and_escaped() {
        let (sql, ctx) = render(("users.id", "LIKE", "%pattern"));
        assert_eq!(sql, r#""users"."id" LIKE '%pattern'"#);
        assert!(ctx.is_empty());

        let (sql, _) = render(("name", "NOT LIKE", "O'Brien%"));
        assert_eq!(sql, r#""name" NOT LIKE 'O''Brien%'"#);
    }

    #[test]
    fn like_can_be_bound() {
        let mut ctx = ParamContext::with_options(BuildOptions::new().like_values(LikeValues::Bind));
        let sql = Condition::classify(("name", "ILIKE", "%ann%"))
            .unwrap()
            .build(&mut ctx)
            .unwrap();
        assert_eq!(sql, r#""name" ILIKE $0"#);
        assert_eq!(ctx.parameters().get("$0"), Some(&Value::from("%ann%")));
    }

    #[test]
    fn column_reference_binds_nothing() {
        let (sql, ctx) = render(("name", "=", col_ref("data.name")));
        assert_eq!(sql, r#""name" = "data"."name""#);
        assert!(ctx.is_empty());

        let (sql, _) = render(where_ref("a.x", "<>", "b.y"));
        assert_eq!(sql, r#""a"."x" <> "b"."y""#);
    }

    #[test]
    fn group_is_parenthesized_once() {
        let (sql, _) = render(or([
            ConditionInput::from(("a", "=", 1)),
            ("b", "=", 2).into(),
        ]));
        assert_eq!(sql, r#"("a" = $0 OR "b" = $1)"#);
    }

    #[test]
    fn nested_groups() {
        let (sql, ctx) = render(and([
            ConditionInput::from(("status", "=", "active")),
            or([
                ConditionInput::from(("role", "=", "admin")),
                ("role", "=", "owner").into(),
            ]),
        ]));
        assert_eq!(sql, r#"("status" = $0 AND ("role" = $1 OR "role" = $2))"#);
        assert_eq!(ctx.len(), 3);
    }

    #[test]
    fn empty_group_renders_nothing() {
        let cond = Condition::classify(and(Vec::<ConditionInput>::new())).unwrap();
        assert!(cond.is_empty());
        assert_eq!(cond.build(&mut ParamContext::new()).unwrap(), "");

        let (sql, _) = render(or([and(Vec::<ConditionInput>::new()), raw("1 = 1")]));
        assert_eq!(sql, "(1 = 1)");
    }

    #[test]
    fn raw_passes_through() {
        let (sql, ctx) = render("\"score\" > 10");
        assert_eq!(sql, "\"score\" > 10");
        assert!(ctx.is_empty());
    }

    #[test]
    fn blank_field_is_invalid() {
        let err = Condition::classify(("  ", "=", 1)).unwrap_err();
        assert!(matches!(err, QbError::InvalidField(_)));

        let err = Condition::classify((5, "=", 1)).unwrap_err();
        assert!(matches!(err, QbError::InvalidField(_)));
    }

    #[test]
    fn blank_reference_is_invalid() {
        let err = Condition::classify(("name", "=", col_ref(" "))).unwrap_err();
        assert!(matches!(err, QbError::InvalidField(_)));
    }

    #[test]
    fn unknown_operator_is_unsupported() {
        let err = Condition::classify(("id", "~~", 1)).unwrap_err();
        assert!(matches!(err, QbError::UnsupportedOperator(_)));
    }

    #[test]
    fn reference_with_non_comparison_is_unsupported() {
        let err = Condition::classify(("id", "IN", col_ref("other.id"))).unwrap_err();
        assert!(matches!(err, QbError::UnsupportedOperator(_)));
    }

    #[test]
    fn arity_and_type_mismatches_are_invalid() {
        let cases: Vec<ConditionInput> = vec![
            ("id", "IN", Vec::<i32>::new()).into(),
            ("id", "IN", 1).into(),
            ("id", "=").into(),
            ("id", "IS NULL", 1).into(),
            ("id", "=", vec![1, 2]).into(),
            ("name", "LIKE", 3).into(),
            ("age", "BETWEEN", [1, 2, 3]).into(),
            ("age", "NOT BETWEEN", 1).into(),
        ];
        for input in cases {
            let err = Condition::classify(input.clone()).unwrap_err();
            assert!(
                matches!(err, QbError::InvalidCondition(_)),
                "{input:?} gave {err:?}"
            );
        }
    }

    #[test]
    fn invalid_member_fails_whole_group() {
        let err = Condition::classify(or([
            ConditionInput::from(("a", "=", 1)),
            ("b", "IN", Vec::<i32>::new()).into(),
        ]))
        .unwrap_err();
        assert!(matches!(err, QbError::InvalidCondition(_)));
    }
}
