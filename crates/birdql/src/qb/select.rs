//! SELECT query builder.

use crate::condition::{Condition, ConditionInput};
use crate::config::BuildOptions;
use crate::error::{QbError, QbResult};
use crate::ident::{quote_column, quote_identifier, quote_table};
use crate::qb::functions::SqlFunction;
use crate::qb::param::ParamContext;
use crate::qb::traits::SqlQb;
use crate::qb::where_clause::{WhereClause, write_where};

/// One entry of the SELECT list.
#[derive(Debug, Clone, PartialEq)]
pub enum SelectField {
    /// Column expression; quoted when added to a statement.
    Column(String),
    Function(SqlFunction),
    /// Nested statement rendered as `(SELECT ...) [AS "alias"]`.
    Subquery(Box<SelectQb>),
}

impl From<&str> for SelectField {
    fn from(expr: &str) -> Self {
        SelectField::Column(expr.to_string())
    }
}

impl From<String> for SelectField {
    fn from(expr: String) -> Self {
        SelectField::Column(expr)
    }
}

impl From<SqlFunction> for SelectField {
    fn from(f: SqlFunction) -> Self {
        SelectField::Function(f)
    }
}

impl From<SelectQb> for SelectField {
    fn from(q: SelectQb) -> Self {
        SelectField::Subquery(Box::new(q))
    }
}

/// JOIN flavours.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    Join,
    Inner,
    Left,
    Right,
    Full,
}

impl JoinKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            JoinKind::Join => "JOIN",
            JoinKind::Inner => "INNER JOIN",
            JoinKind::Left => "LEFT JOIN",
            JoinKind::Right => "RIGHT JOIN",
            JoinKind::Full => "FULL JOIN",
        }
    }
}

/// Sort direction. Unspecified ordering sorts descending.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Order {
    Asc,
    #[default]
    Desc,
}

impl Order {
    pub fn as_str(&self) -> &'static str {
        match self {
            Order::Asc => "ASC",
            Order::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Join {
    kind: JoinKind,
    table: String,
    left: String,
    right: String,
}

/// SELECT query builder.
///
/// Identifiers and conditions are validated as they are added; the first
/// failure is kept and returned when the statement is built.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectQb {
    fields: Vec<SelectField>,
    tables: Vec<String>,
    joins: Vec<Join>,
    where_clauses: Vec<WhereClause>,
    order: Vec<(String, Order)>,
    limit: Option<u64>,
    offset: Option<u64>,
    /// Quoted alias, used when embedded as a field
    alias: Option<String>,
    options: BuildOptions,
    build_error: Option<QbError>,
}

impl SelectQb {
    /// Create an empty SELECT; add fields and a table before building.
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&mut self, err: QbError) {
        if self.build_error.is_none() {
            self.build_error = Some(err);
        }
    }

    /// First error recorded while chaining, if any.
    pub fn build_error(&self) -> Option<&QbError> {
        self.build_error.as_ref()
    }

    /// Alias given with [`SelectQb::as_`], already quoted.
    pub fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    // ==================== SELECT list ====================

    /// Append one field.
    pub fn field(mut self, field: impl Into<SelectField>) -> Self {
        let field = match field.into() {
            SelectField::Column(expr) => match quote_column(&expr) {
                Ok(quoted) => SelectField::Column(quoted),
                Err(err) => {
                    self.record(err);
                    return self;
                }
            },
            SelectField::Function(f) => {
                if let Err(err) = f.to_sql() {
                    self.record(err);
                    return self;
                }
                SelectField::Function(f)
            }
            subquery @ SelectField::Subquery(_) => subquery,
        };
        self.fields.push(field);
        self
    }

    /// Append several fields.
    pub fn fields<I, F>(self, fields: I) -> Self
    where
        I: IntoIterator<Item = F>,
        F: Into<SelectField>,
    {
        fields.into_iter().fold(self, |qb, f| qb.field(f))
    }

    // ==================== FROM / JOIN ====================

    /// Add a table (`[schema.]table [[AS] alias]`). Several tables are comma-separated.
    pub fn from(mut self, table: &str) -> Self {
        match quote_table(table) {
            Ok(quoted) => self.tables.push(quoted),
            Err(err) => self.record(err),
        }
        self
    }

    /// Add `<kind> table ON left = right`.
    pub fn join_with(mut self, kind: JoinKind, table: &str, left: &str, right: &str) -> Self {
        let parts = quote_table(table).and_then(|table| {
            Ok(Join {
                kind,
                table,
                left: quote_column(left)?,
                right: quote_column(right)?,
            })
        });
        match parts {
            Ok(join) => self.joins.push(join),
            Err(err) => self.record(err),
        }
        self
    }

    /// Add a plain `JOIN`.
    pub fn join(self, table: &str, left: &str, right: &str) -> Self {
        self.join_with(JoinKind::Join, table, left, right)
    }

    pub fn inner_join(self, table: &str, left: &str, right: &str) -> Self {
        self.join_with(JoinKind::Inner, table, left, right)
    }

    pub fn left_join(self, table: &str, left: &str, right: &str) -> Self {
        self.join_with(JoinKind::Left, table, left, right)
    }

    pub fn right_join(self, table: &str, left: &str, right: &str) -> Self {
        self.join_with(JoinKind::Right, table, left, right)
    }

    pub fn full_join(self, table: &str, left: &str, right: &str) -> Self {
        self.join_with(JoinKind::Full, table, left, right)
    }

    // ==================== WHERE ====================

    /// Add one condition. Separate calls are AND-joined.
    pub fn where_(self, condition: impl Into<ConditionInput>) -> Self {
        self.where_all([condition.into()])
    }

    /// Add several top-level conditions at once, AND-joined.
    pub fn where_all<I, C>(mut self, conditions: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<ConditionInput>,
    {
        match WhereClause::new(conditions) {
            Ok(clause) => self.where_clauses.push(clause),
            Err(err) => self.record(err),
        }
        self
    }

    /// Add an already classified condition.
    pub fn where_condition(mut self, condition: Condition) -> Self {
        match WhereClause::from_conditions(vec![condition]) {
            Ok(clause) => self.where_clauses.push(clause),
            Err(err) => self.record(err),
        }
        self
    }

    // ==================== ORDER BY / LIMIT ====================

    /// Order by a column, descending.
    pub fn order_by(self, column: &str) -> Self {
        self.order_by_with(column, Order::default())
    }

    pub fn order_by_asc(self, column: &str) -> Self {
        self.order_by_with(column, Order::Asc)
    }

    pub fn order_by_desc(self, column: &str) -> Self {
        self.order_by_with(column, Order::Desc)
    }

    pub fn order_by_with(mut self, column: &str, order: Order) -> Self {
        match quote_column(column) {
            Ok(quoted) => self.order.push((quoted, order)),
            Err(err) => self.record(err),
        }
        self
    }

    pub fn limit(mut self, n: u64) -> Self {
        self.limit = Some(n);
        self
    }

    pub fn offset(mut self, n: u64) -> Self {
        self.offset = Some(n);
        self
    }

    // ==================== Composition ====================

    /// Alias used when this statement is embedded as a field.
    pub fn as_(mut self, alias: &str) -> Self {
        match quote_identifier(alias) {
            Ok(quoted) => self.alias = Some(quoted),
            Err(err) => self.record(err),
        }
        self
    }

    /// Options used when this statement is built at the top level.
    ///
    /// Ignored while embedded: a subquery renders with its parent's options.
    pub fn options(mut self, options: BuildOptions) -> Self {
        self.options = options;
        self
    }

    fn render_field(field: &SelectField, ctx: &mut ParamContext) -> QbResult<String> {
        match field {
            SelectField::Column(quoted) => Ok(quoted.clone()),
            SelectField::Function(f) => f.to_sql(),
            SelectField::Subquery(query) => {
                let inner = query.build_with(ctx)?;
                Ok(match &query.alias {
                    Some(alias) => format!("({inner}) AS {alias}"),
                    None => format!("({inner})"),
                })
            }
        }
    }
}

impl SqlQb for SelectQb {
    fn kind(&self) -> &'static str {
        "SELECT"
    }

    fn build_options(&self) -> &BuildOptions {
        &self.options
    }

    fn build_with(&self, ctx: &mut ParamContext) -> QbResult<String> {
        if let Some(err) = &self.build_error {
            return Err(err.clone());
        }
        if self.fields.is_empty() {
            return Err(QbError::MissingSelectFields);
        }
        if self.tables.is_empty() {
            return Err(QbError::MissingFromTable);
        }

        let mut fields = Vec::with_capacity(self.fields.len());
        for field in &self.fields {
            fields.push(Self::render_field(field, ctx)?);
        }

        let mut sql = format!("SELECT {} FROM {}", fields.join(", "), self.tables.join(", "));

        for join in &self.joins {
            sql.push(' ');
            sql.push_str(join.kind.as_str());
            sql.push(' ');
            sql.push_str(&join.table);
            sql.push_str(" ON ");
            sql.push_str(&join.left);
            sql.push_str(" = ");
            sql.push_str(&join.right);
        }

        write_where(&mut sql, &self.where_clauses, ctx)?;

        if !self.order.is_empty() {
            let order: Vec<String> = self
                .order
                .iter()
                .map(|(column, dir)| format!("{column} {}", dir.as_str()))
                .collect();
            sql.push_str(" ORDER BY ");
            sql.push_str(&order.join(", "));
        }

        if let Some(limit) = self.limit {
            sql.push_str(&format!(" LIMIT {limit}"));
        }

        if let Some(offset) = self.offset {
            sql.push_str(&format!(" OFFSET {offset}"));
        }

        Ok(sql)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::qb::functions::{count, max};
    use crate::value::Value;

    #[test]
    fn simple_select() {
        let qb = SelectQb::new().field("*").from("data");
        assert_eq!(qb.to_sql().unwrap(), r#"SELECT * FROM "data""#);
    }

    #[test]
    fn fields_and_functions() {
        let qb = SelectQb::new()
            .fields(["id", "users.name AS n"])
            .field(count("*").as_("count"))
            .from("users u");
        assert_eq!(
            qb.to_sql().unwrap(),
            r#"SELECT "id", "users"."name" AS "n", COUNT(*) AS "count" FROM "users" AS "u""#
        );
    }

    #[test]
    fn joins_in_order_added() {
        let qb = SelectQb::new()
            .field("users.id")
            .from("users")
            .inner_join("orders", "users.id", "orders.user_id")
            .left_join("profiles p", "p.user_id", "users.id")
            .join("teams", "teams.id", "users.team_id");
        assert_eq!(
            qb.to_sql().unwrap(),
            r#"SELECT "users"."id" FROM "users" INNER JOIN "orders" ON "users"."id" = "orders"."user_id" LEFT JOIN "profiles" AS "p" ON "p"."user_id" = "users"."id" JOIN "teams" ON "teams"."id" = "users"."team_id""#
        );
    }

    #[test]
    fn order_defaults_to_desc() {
        let qb = SelectQb::new()
            .field("*")
            .from("posts")
            .order_by("created_at")
            .order_by_asc("title")
            .limit(10)
            .offset(20);
        assert_eq!(
            qb.to_sql().unwrap(),
            r#"SELECT * FROM "posts" ORDER BY "created_at" DESC, "title" ASC LIMIT 10 OFFSET 20"#
        );
    }

    #[test]
    fn separate_where_calls_are_and_joined() {
        let built = SelectQb::new()
            .field("*")
            .from("users")
            .where_(("age", ">", 18))
            .where_(("name", "LIKE", "A%"))
            .build()
            .unwrap();
        assert_eq!(
            built.sql,
            r#"SELECT * FROM "users" WHERE "age" > $0 AND "name" LIKE 'A%'"#
        );
        assert_eq!(built.params.get("$0"), Some(&Value::Int(18)));
        assert_eq!(built.params.len(), 1);
    }

    #[test]
    fn missing_fields_and_table() {
        let err = SelectQb::new().from("users").build().unwrap_err();
        assert_eq!(err, QbError::MissingSelectFields);

        let err = SelectQb::new().field("*").build().unwrap_err();
        assert_eq!(err, QbError::MissingFromTable);
    }

    #[test]
    fn first_chaining_error_wins() {
        let qb = SelectQb::new()
            .field("1bad")
            .from("users; ")
            .where_(("id", "IN", Vec::<i32>::new()));
        assert!(matches!(
            qb.build_error(),
            Some(QbError::InvalidColumnExpression(_))
        ));
        assert!(matches!(
            qb.build(),
            Err(QbError::InvalidColumnExpression(_))
        ));
    }

    #[test]
    fn embedded_subquery_shares_numbering() {
        let sub = SelectQb::new()
            .field("id")
            .from("users")
            .where_(("id", "=", 1))
            .as_("subquery");
        let built = SelectQb::new()
            .field(sub)
            .field(max("id").as_("max_id"))
            .from("users")
            .where_(("id", "=", 2))
            .build()
            .unwrap();
        assert_eq!(
            built.sql,
            r#"SELECT (SELECT "id" FROM "users" WHERE "id" = $0) AS "subquery", MAX("id") AS "max_id" FROM "users" WHERE "id" = $1"#
        );
        assert_eq!(built.params.get("$0"), Some(&Value::Int(1)));
        assert_eq!(built.params.get("$1"), Some(&Value::Int(2)));
    }

    #[test]
    fn subquery_error_surfaces_in_parent() {
        let sub = SelectQb::new().from("users");
        let err = SelectQb::new().field(sub).from("data").build().unwrap_err();
        assert_eq!(err, QbError::MissingSelectFields);
    }
}
