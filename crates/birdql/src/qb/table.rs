//! Thin CREATE TABLE / DROP TABLE statements.

use crate::config::BuildOptions;
use crate::error::{QbError, QbResult};
use crate::ident::{quote_identifier, quote_table};
use crate::qb::param::ParamContext;
use crate::qb::traits::SqlQb;

/// `CREATE TABLE [IF NOT EXISTS] "table" ("col" TYPE, ...)`
///
/// Column types are written verbatim.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CreateTableQb {
    table: Option<String>,
    columns: Vec<(String, String)>,
    if_not_exists: bool,
    options: BuildOptions,
    build_error: Option<QbError>,
}

impl CreateTableQb {
    pub fn new<I, K, T>(table: &str, columns: I) -> Self
    where
        I: IntoIterator<Item = (K, T)>,
        K: AsRef<str>,
        T: Into<String>,
    {
        let mut qb = Self::default();
        if !table.trim().is_empty() {
            match quote_table(table) {
                Ok(quoted) => qb.table = Some(quoted),
                Err(err) => qb.record(err),
            }
        }
        columns
            .into_iter()
            .fold(qb, |qb, (name, ty)| qb.column(name.as_ref(), ty))
    }

    fn record(&mut self, err: QbError) {
        if self.build_error.is_none() {
            self.build_error = Some(err);
        }
    }

    /// Append a column definition.
    pub fn column(mut self, name: &str, ty: impl Into<String>) -> Self {
        match quote_identifier(name) {
            Ok(quoted) => self.columns.push((quoted, ty.into())),
            Err(err) => self.record(err),
        }
        self
    }

    pub fn if_not_exists(mut self) -> Self {
        self.if_not_exists = true;
        self
    }
}

impl SqlQb for CreateTableQb {
    fn kind(&self) -> &'static str {
        "CREATE TABLE"
    }

    fn build_options(&self) -> &BuildOptions {
        &self.options
    }

    fn build_with(&self, _ctx: &mut ParamContext) -> QbResult<String> {
        if let Some(err) = &self.build_error {
            return Err(err.clone());
        }
        let table = self.table.as_ref().ok_or(QbError::MissingFromTable)?;
        if self.columns.is_empty() {
            return Err(QbError::MissingValues("CREATE TABLE"));
        }

        let columns: Vec<String> = self
            .columns
            .iter()
            .map(|(name, ty)| format!("{name} {}", ty.trim()))
            .collect();
        let exists = if self.if_not_exists { "IF NOT EXISTS " } else { "" };
        Ok(format!(
            "CREATE TABLE {exists}{table} ({})",
            columns.join(", ")
        ))
    }
}

/// `DROP TABLE "table"`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DropTableQb {
    table: Option<String>,
    options: BuildOptions,
    build_error: Option<QbError>,
}

impl DropTableQb {
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
}

impl SqlQb for DropTableQb {
    fn kind(&self) -> &'static str {
        "DROP TABLE"
    }

    fn build_options(&self) -> &BuildOptions {
        &self.options
    }

    fn build_with(&self, _ctx: &mut ParamContext) -> QbResult<String> {
        if let Some(err) = &self.build_error {
            return Err(err.clone());
        }
        let table = self.table.as_ref().ok_or(QbError::MissingFromTable)?;
        Ok(format!("DROP TABLE {table}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_table() {
        let sql = CreateTableQb::new(
            "users",
            [("id", "INTEGER PRIMARY KEY"), ("name", "TEXT NOT NULL")],
        )
        .to_sql()
        .unwrap();
        assert_eq!(
            sql,
            r#"CREATE TABLE "users" ("id" INTEGER PRIMARY KEY, "name" TEXT NOT NULL)"#
        );
    }

    #[test]
    fn create_table_if_not_exists() {
        let sql = CreateTableQb::new("data", [("name", "TEXT")])
            .if_not_exists()
            .to_sql()
            .unwrap();
        assert_eq!(sql, r#"CREATE TABLE IF NOT EXISTS "data" ("name" TEXT)"#);
    }

    #[test]
    fn create_table_requires_columns() {
        let err = CreateTableQb::new("data", Vec::<(&str, &str)>::new())
            .build()
            .unwrap_err();
        assert_eq!(err, QbError::MissingValues("CREATE TABLE"));
    }

    #[test]
    fn drop_table() {
        assert_eq!(
            DropTableQb::new("public.users").to_sql().unwrap(),
            r#"DROP TABLE "public"."users""#
        );
        assert_eq!(
            DropTableQb::new("").build().unwrap_err(),
            QbError::MissingFromTable
        );
    }

    #[test]
    fn create_table_keeps_first_error() {
        let err = CreateTableQb::new("data", [("drop", "TEXT"), ("name;", "TEXT")])
            .build()
            .unwrap_err();
        assert!(matches!(err, QbError::InvalidIdentifier(ref msg) if msg.starts_with("\"drop\"")));
    }
}
