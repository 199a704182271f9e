//! Statement hooks and execution monitoring.
//!
//! A [`QueryHook`] sees every statement before it reaches the engine and can
//! let it through, rewrite it, or abort it. After the engine returns, the hook
//! receives the elapsed time and a summarized [`QueryResult`].
//!
//! Hooks are attached by wrapping an engine in a [`HookedExecutor`], which is
//! itself an [`Executor`](crate::client::Executor) and therefore works with
//! every builder's `get`/`all`/`run`.
//!
//! # Example
//!
//! ```rust,ignore
//! use birdql::monitor::{HookAction, HookedExecutor, QueryContext, QueryHook, TracingSqlHook};
//!
//! struct NoDrop;
//!
//! impl QueryHook for NoDrop {
//!     fn before_query(&self, ctx: &QueryContext) -> HookAction {
//!         if ctx.canonical_sql.starts_with("DROP") {
//!             HookAction::Abort("DROP is not allowed".into())
//!         } else {
//!             HookAction::Continue
//!         }
//!     }
//! }
//!
//! let engine = HookedExecutor::new(engine)
//!     .add_hook(TracingSqlHook::new())
//!     .add_hook(NoDrop);
//! ```

mod composite;
mod hooked;
mod tracing_hook;
mod types;


pub use composite::CompositeHook;
pub use hooked::{HookedExecutor, HookedPrepared};
pub use tracing_hook::TracingSqlHook;
pub use types::{HookAction, QueryContext, QueryHook, QueryResult, QueryType};

pub(crate) fn truncate_sql_bytes(sql: &str, max_bytes: usize) -> &str {
    if sql.len() <= max_bytes {
        return sql;
    }
    let mut end = max_bytes;
    while end > 0 && !sql.is_char_boundary(end) {
        end -= 1;
    }
    &sql[..end]
}
