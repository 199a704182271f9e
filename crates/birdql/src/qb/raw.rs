//! Caller-written SQL passed straight through.

use crate::config::BuildOptions;
use crate::error::QbResult;
use crate::qb::param::{ParamContext, Params};
use crate::qb::traits::SqlQb;
use crate::value::Value;

/// A hand-written statement with its own placeholder mapping.
///
/// Neither the SQL nor the placeholder names are inspected.
#[derive(Debug, Clone, PartialEq)]
pub struct RawQb {
    sql: String,
    params: Params,
    options: BuildOptions,
}

impl RawQb {
    pub fn new<I, K, V>(sql: impl Into<String>, params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        Self {
            sql: sql.into(),
            params: params.into_iter().collect(),
            options: BuildOptions::default(),
        }
    }
}

impl SqlQb for RawQb {
    fn kind(&self) -> &'static str {
        "RAW"
    }

    fn build_options(&self) -> &BuildOptions {
        &self.options
    }

    fn build_with(&self, ctx: &mut ParamContext) -> QbResult<String> {
        for (name, value) in self.params.iter() {
            ctx.bind_named(name, value.clone());
        }
        Ok(self.sql.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passes_sql_and_params_through() {
        let built = RawQb::new("SELECT * FROM users WHERE id = $id", [("$id", 42)])
            .build()
            .unwrap();
        assert_eq!(built.sql, "SELECT * FROM users WHERE id = $id");
        assert_eq!(built.params.get("$id"), Some(&Value::Int(42)));
    }

    #[test]
    fn no_params() {
        let built = RawQb::new("PRAGMA foreign_keys = ON", Vec::<(String, Value)>::new())
            .build()
            .unwrap();
        assert!(built.params.is_empty());
    }
}
