use super::composite::CompositeHook;
use super::types::{HookAction, QueryContext, QueryHook, QueryResult, QueryType};
use crate::client::{ExecResult, Executor, PreparedQuery, Row};
use crate::error::{QbError, QbResult};
use crate::qb::Params;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// An [`Executor`] wrapper that runs a [`QueryHook`] around every statement.
///
/// The hook runs when a prepared statement is executed, so
/// [`QueryContext::param_count`] reflects the parameters actually passed.
/// A `ModifySql` action re-prepares the statement on the wrapped engine with
/// the rewritten SQL.
///
/// # Example
///
/// ```rust,ignore
/// let engine = HookedExecutor::new(engine).with_hook(TracingSqlHook::new());
/// let rows = birdql::select_all().from("users").all(&engine)?;
/// ```
pub struct HookedExecutor<E> {
    inner: Arc<E>,
    hook: Option<Arc<dyn QueryHook>>,
    tag: Option<String>,
}

impl<E: Executor> HookedExecutor<E> {
    pub fn new(inner: E) -> Self {
        Self::from_arc(Arc::new(inner))
    }

    /// Wrap an engine that is already shared.
    pub fn from_arc(inner: Arc<E>) -> Self {
        Self {
            inner,
            hook: None,
            tag: None,
        }
    }

    /// Replace the hook.
    pub fn with_hook<H: QueryHook + 'static>(mut self, hook: H) -> Self {
        self.hook = Some(Arc::new(hook));
        self
    }

    /// Add a hook, running after any hook already set.
    pub fn add_hook<H: QueryHook + 'static>(self, hook: H) -> Self {
        self.add_hook_arc(Arc::new(hook))
    }

    pub fn add_hook_arc(mut self, hook: Arc<dyn QueryHook>) -> Self {
        self.hook = Some(match self.hook.take() {
            None => hook,
            Some(existing) => Arc::new(CompositeHook::new().add_arc(existing).add_arc(hook)),
        });
        self
    }

    /// Tag every statement run through this executor.
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    pub fn inner(&self) -> &E {
        &self.inner
    }

    pub fn into_inner(self) -> Arc<E> {
        self.inner
    }
}

impl<E: Executor> Executor for HookedExecutor<E> {
    type Prepared = HookedPrepared<E>;

    fn prepare(&self, sql: &str) -> QbResult<Self::Prepared> {
        Ok(HookedPrepared {
            inner: Arc::clone(&self.inner),
            hook: self.hook.clone(),
            tag: self.tag.clone(),
            sql: sql.to_string(),
            prepared: None,
        })
    }
}

/// A statement prepared through a [`HookedExecutor`].
pub struct HookedPrepared<E: Executor> {
    inner: Arc<E>,
    hook: Option<Arc<dyn QueryHook>>,
    tag: Option<String>,
    sql: String,
    // engine statement and the SQL it was prepared from
    prepared: Option<(String, E::Prepared)>,
}

impl<E: Executor> HookedPrepared<E> {
    fn context(&self, params: &Params) -> QueryContext {
        let ctx = QueryContext::new(&self.sql, params.len());
        match &self.tag {
            Some(tag) => ctx.with_tag(tag.clone()),
            None => ctx,
        }
    }

    fn apply_hook(&self, ctx: &mut QueryContext) -> QbResult<()> {
        let Some(hook) = &self.hook else {
            return Ok(());
        };

        match hook.before_query(ctx) {
            HookAction::Continue => Ok(()),
            HookAction::ModifySql {
                exec_sql,
                canonical_sql,
            } => {
                ctx.exec_sql = exec_sql;
                if let Some(canonical_sql) = canonical_sql {
                    ctx.canonical_sql = canonical_sql;
                }
                ctx.query_type = QueryType::from_sql(&ctx.canonical_sql);
                Ok(())
            }
            HookAction::Abort(reason) => Err(QbError::Aborted(reason)),
        }
    }

    fn report_result(&self, ctx: &QueryContext, duration: Duration, result: &QueryResult) {
        if let Some(hook) = &self.hook {
            hook.after_query(ctx, duration, result);
        }
    }

    fn statement(&mut self, exec_sql: &str) -> QbResult<&mut E::Prepared> {
        let stale = self
            .prepared
            .as_ref()
            .is_none_or(|(sql, _)| sql != exec_sql);
        if stale {
            let stmt = self.inner.prepare(exec_sql)?;
            self.prepared = Some((exec_sql.to_string(), stmt));
        }
        match &mut self.prepared {
            Some((_, stmt)) => Ok(stmt),
            None => Err(QbError::execution("statement was not prepared")),
        }
    }

    fn execute<T>(
        &mut self,
        params: &Params,
        run: impl FnOnce(&mut E::Prepared, &Params) -> QbResult<T>,
        summarize: impl FnOnce(&T) -> QueryResult,
    ) -> QbResult<T> {
        let mut ctx = self.context(params);
        self.apply_hook(&mut ctx)?;

        let start = Instant::now();
        let result = self.statement(&ctx.exec_sql).and_then(|stmt| run(stmt, params));
        let elapsed = start.elapsed();

        match &result {
            Ok(value) => self.report_result(&ctx, elapsed, &summarize(value)),
            Err(err) => self.report_result(&ctx, elapsed, &QueryResult::error(err.to_string())),
        }
        result
    }
}

impl<E: Executor> PreparedQuery for HookedPrepared<E> {
    fn get(&mut self, params: &Params) -> QbResult<Option<Row>> {
        self.execute(
            params,
            |stmt, p| stmt.get(p),
            |row| QueryResult::OptionalRow(row.is_some()),
        )
    }

    fn all(&mut self, params: &Params) -> QbResult<Vec<Row>> {
        self.execute(
            params,
            |stmt, p| stmt.all(p),
            |rows| QueryResult::Rows(rows.len()),
        )
    }

    fn run(&mut self, params: &Params) -> QbResult<ExecResult> {
        self.execute(
            params,
            |stmt, p| stmt.run(p),
            |res| QueryResult::Affected(res.changes),
        )
    }
}
