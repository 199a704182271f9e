//! Trait definitions for query builders.

use crate::client::{ExecResult, Executor, PreparedQuery, Row, from_row};
use crate::config::BuildOptions;
use crate::error::QbResult;
use crate::monitor::QueryType;
use crate::qb::param::{ParamContext, Params};
use serde::de::DeserializeOwned;
use tracing::{debug, trace};

/// SQL text plus the placeholder mapping it references.
#[derive(Debug, Clone, PartialEq)]
pub struct BuiltQuery {
    pub sql: String,
    pub params: Params,
}

impl BuiltQuery {
    pub fn new(sql: String, params: Params) -> Self {
        Self { sql, params }
    }

    pub fn query_type(&self) -> QueryType {
        QueryType::from_sql(&self.sql)
    }

    fn prepare<E: Executor + ?Sized>(
        &self,
        executor: &E,
        call: &'static str,
    ) -> QbResult<E::Prepared> {
        debug!(
            target: "birdql.sql",
            query_type = ?self.query_type(),
            param_count = self.params.len(),
            call,
            "executing statement"
        );
        executor.prepare(&self.sql)
    }
}

/// Base trait for all statement builders.
///
/// Implementors only render themselves against a context; building,
/// execution and row mapping come for free.
pub trait SqlQb {
    /// Short statement kind used in log events (`"SELECT"`, `"INSERT"`, ...).
    fn kind(&self) -> &'static str;

    /// Options used when this statement is built at the top level.
    fn build_options(&self) -> &BuildOptions;

    /// Render the statement, allocating placeholders from `ctx`.
    ///
    /// Embedding statements call this with their own context so numbering
    /// continues across nesting levels.
    fn build_with(&self, ctx: &mut ParamContext) -> QbResult<String>;

    /// Build SQL and parameters with a fresh context.
    fn build(&self) -> QbResult<BuiltQuery> {
        let mut ctx = ParamContext::with_options(self.build_options().clone());
        let sql = self.build_with(&mut ctx)?;
        trace!(
            target: "birdql.build",
            kind = self.kind(),
            sql_len = sql.len(),
            param_count = ctx.len(),
            "statement built"
        );
        Ok(BuiltQuery::new(sql, ctx.into_parameters()))
    }

    /// Build and return only the SQL text.
    fn to_sql(&self) -> QbResult<String> {
        self.build().map(|built| built.sql)
    }

    /// Build and return only the parameters.
    fn params(&self) -> QbResult<Params> {
        self.build().map(|built| built.params)
    }

    /// Execute and return the first row, if any.
    fn get<E: Executor + ?Sized>(&self, executor: &E) -> QbResult<Option<Row>> {
        let built = self.build()?;
        built.prepare(executor, "get")?.get(&built.params)
    }

    /// Execute and return all rows.
    fn all<E: Executor + ?Sized>(&self, executor: &E) -> QbResult<Vec<Row>> {
        let built = self.build()?;
        built.prepare(executor, "all")?.all(&built.params)
    }

    /// Execute without reading rows.
    fn run<E: Executor + ?Sized>(&self, executor: &E) -> QbResult<ExecResult> {
        let built = self.build()?;
        built.prepare(executor, "run")?.run(&built.params)
    }

    /// Execute and deserialize the first row into `T`.
    fn get_as<T: DeserializeOwned>(
        &self,
        executor: &(impl Executor + ?Sized),
    ) -> QbResult<Option<T>> {
        self.get(executor)?.map(from_row::<T>).transpose()
    }

    /// Execute and deserialize every row into `T`.
    fn all_as<T: DeserializeOwned>(&self, executor: &(impl Executor + ?Sized)) -> QbResult<Vec<T>> {
        self.all(executor)?.into_iter().map(from_row::<T>).collect()
    }
}
