//! DELETE query builder.

use crate::condition::ConditionInput;
use crate::config::BuildOptions;
use crate::error::{QbError, QbResult};
use crate::ident::quote_table;
use crate::qb::param::ParamContext;
use crate::qb::traits::SqlQb;
use crate::qb::where_clause::{WhereClause, write_where};

/// `DELETE FROM "table" [WHERE ...]`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeleteQb {
    table: Option<String>,
    where_clauses: Vec<WhereClause>,
    options: BuildOptions,
    build_error: Option<QbError>,
}

impl DeleteQb {
    /// Create a DELETE for `table`. A blank name is reported at build time.
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

impl SqlQb for DeleteQb {
    fn kind(&self) -> &'static str {
        "DELETE"
    }

    fn build_options(&self) -> &BuildOptions {
        &self.options
    }

    fn build_with(&self, ctx: &mut ParamContext) -> QbResult<String> {
        if let Some(err) = &self.build_error {
            return Err(err.clone());
        }
        let table = self.table.as_ref().ok_or(QbError::MissingFromTable)?;

        let mut sql = format!("DELETE FROM {table}");
        write_where(&mut sql, &self.where_clauses, ctx)?;
        Ok(sql)
    }
}
