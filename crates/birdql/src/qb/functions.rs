//! Aggregate and scalar function descriptors for SELECT fields.

use crate::error::QbResult;
use crate::ident::{quote_column, quote_identifier};

/// `NAME(column) [AS "alias"]`, rendered when the statement is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlFunction {
    name: &'static str,
    column: String,
    alias: Option<String>,
}

impl SqlFunction {
    fn new(name: &'static str, column: impl Into<String>) -> Self {
        Self {
            name,
            column: column.into(),
            alias: None,
        }
    }

    /// Name the result column.
    pub fn as_(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Render the call with its column (and alias) quoted.
    pub fn to_sql(&self) -> QbResult<String> {
        let mut sql = format!("{}({})", self.name, quote_column(&self.column)?);
        if let Some(alias) = &self.alias {
            sql.push_str(" AS ");
            sql.push_str(&quote_identifier(alias)?);
        }
        Ok(sql)
    }
}

/// `COUNT(column)`; pass `"*"` to count rows.
pub fn count(column: impl Into<String>) -> SqlFunction {
    SqlFunction::new("COUNT", column)
}

pub fn sum(column: impl Into<String>) -> SqlFunction {
    SqlFunction::new("SUM", column)
}

pub fn min(column: impl Into<String>) -> SqlFunction {
    SqlFunction::new("MIN", column)
}

pub fn max(column: impl Into<String>) -> SqlFunction {
    SqlFunction::new("MAX", column)
}

pub fn avg(column: impl Into<String>) -> SqlFunction {
    SqlFunction::new("AVG", column)
}

pub fn upper(column: impl Into<String>) -> SqlFunction {
    SqlFunction::new("UPPER", column)
}

pub fn lower(column: impl Into<String>) -> SqlFunction {
    SqlFunction::new("LOWER", column)
}

pub fn length(column: impl Into<String>) -> SqlFunction {
    SqlFunction::new("LENGTH", column)
}
