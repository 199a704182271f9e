//! INSERT query builder.

use crate::config::BuildOptions;
use crate::error::{QbError, QbResult};
use crate::ident::{quote_column, quote_table};
use crate::qb::param::ParamContext;
use crate::qb::traits::SqlQb;
use crate::value::Value;

/// `INSERT INTO "table" ("a", "b") VALUES ($0, $1)`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InsertQb {
    table: Option<String>,
    /// Quoted column and its value, in insertion order
    values: Vec<(String, Value)>,
    options: BuildOptions,
    build_error: Option<QbError>,
}

impl InsertQb {
    /// Create an INSERT for `table`. A blank name is reported at build time.
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

    /// Set one column value.
    pub fn value(mut self, column: &str, value: impl Into<Value>) -> Self {
        match quote_column(column) {
            Ok(quoted) => self.values.push((quoted, value.into())),
            Err(err) => self.record(err),
        }
        self
    }

    /// Set several column values, in iteration order.
    pub fn values<I, K, V>(self, values: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        values
            .into_iter()
            .fold(self, |qb, (column, value)| qb.value(column.as_ref(), value))
    }

    pub fn options(mut self, options: BuildOptions) -> Self {
        self.options = options;
        self
    }
}

impl SqlQb for InsertQb {
    fn kind(&self) -> &'static str {
        "INSERT"
    }

    fn build_options(&self) -> &BuildOptions {
        &self.options
    }

    fn build_with(&self, ctx: &mut ParamContext) -> QbResult<String> {
        if let Some(err) = &self.build_error {
            return Err(err.clone());
        }
        let table = self.table.as_ref().ok_or(QbError::MissingFromTable)?;
        if self.values.is_empty() {
            return Err(QbError::MissingValues("INSERT"));
        }

        let mut columns = Vec::with_capacity(self.values.len());
        let mut placeholders = Vec::with_capacity(self.values.len());
        for (column, value) in &self.values {
            columns.push(column.as_str());
            placeholders.push(ctx.add_parameter(value.clone()));
        }

        Ok(format!(
            "INSERT INTO {} ({}) VALUES ({})",
            table,
            columns.join(", "),
            placeholders.join(", ")
        ))
    }
}
