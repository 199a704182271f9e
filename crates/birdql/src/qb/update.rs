//! UPDATE query builder.

use crate::condition::ConditionInput;
use crate::config::BuildOptions;
use crate::error::{QbError, QbResult};
use crate::ident::{quote_column, quote_table};
use crate::qb::param::ParamContext;
use crate::qb::traits::SqlQb;
use crate::qb::where_clause::{WhereClause, write_where};
use crate::value::Value;

/// `UPDATE "table" SET "a" = $0, "b" = $1 [WHERE ...]`
///
/// SET placeholders are allocated before WHERE placeholders, from one context.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateQb {
    table: Option<String>,
    sets: Vec<(String, Value)>,
    where_clauses: Vec<WhereClause>,
    options: BuildOptions,
    build_error: Option<QbError>,
}

impl UpdateQb {
    /// Create an UPDATE for `table`. A blank name is reported at build time.
    pub fn new(table: &str) -> Self {
        let mut qb = Self::default();
        if !table.trim().is_empty() {
            match quote_table(table) {
                Ok(quoted) => qb.table = Some(quoted),
                Err(err) => qb.record(err),
            }
        }
        qb
    }

    fn record(&mut self, err: QbError) {
        if self.build_error.is_none() {
            self.build_error = Some(err);
        }
    }

    /// Set one column.
    pub fn set(mut self, column: &str, value: impl Into<Value>) -> Self {
        match quote_column(column) {
            Ok(quoted) => self.sets.push((quoted, value.into())),
            Err(err) => self.record(err),
        }
        self
    }

    /// Set several columns, in iteration order.
    pub fn set_all<I, K, V>(self, values: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        values
            .into_iter()
            .fold(self, |qb, (column, value)| qb.set(column.as_ref(), value))
    }

    /// Add one condition. Separate calls are AND-joined.
    pub fn where_(self, condition: impl Into<ConditionInput>) -> Self {
        self.where_all([condition.into()])
    }

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

    pub fn options(mut self, options: BuildOptions) -> Self {
        self.options = options;
        self
    }
}

impl SqlQb for UpdateQb {
    fn kind(&self) -> &'static str {
        "UPDATE"
    }

    fn build_options(&self) -> &BuildOptions {
        &self.options
    }

    fn build_with(&self, ctx: &mut ParamContext) -> QbResult<String> {
        if let Some(err) = &self.build_error {
            return Err(err.clone());
        }
        let table = self.table.as_ref().ok_or(QbError::MissingFromTable)?;
        if self.sets.is_empty() {
            return Err(QbError::MissingValues("UPDATE"));
        }

        let sets: Vec<String> = self
            .sets
            .iter()
            .map(|(column, value)| format!("{column} = {}", ctx.add_parameter(value.clone())))
            .collect();

        let mut sql = format!("UPDATE {} SET {}", table, sets.join(", "));
        write_where(&mut sql, &self.where_clauses, ctx)?;
        Ok(sql)
    }
}
