//! # birdql
//!
//! A parameterized SQL statement assembler.
//!
//! ## Features
//!
//! - **Safe identifiers**: every table, column and alias goes through one
//!   quoter that rejects injection attempts and double-quotes each segment
//! - **One numbering sequence**: placeholders (`$0`, `$1`, ...) are unique
//!   across arbitrarily nested subqueries
//! - **Heterogeneous conditions**: comparisons, NULL checks, IN/BETWEEN lists,
//!   column references, AND/OR groups, subqueries and raw fragments
//! - **No mid-chain errors**: builders record the first problem and return it
//!   from `build()`
//! - **Engine agnostic execution**: `get`/`all`/`run` against any [`Executor`],
//!   with hooks for tracing, rewriting or vetoing statements
//!
//! ## Query Builder (qb)
//!
//! ```ignore
//! use birdql::{SqlQb, col_ref, qb};
//!
//! let built = qb::select_all()
//!     .from("data")
//!     .where_(("name", "=", "Deven"))
//!     .build()?;
//! assert_eq!(built.sql, r#"SELECT * FROM "data" WHERE "name" = $0"#);
//!
//! // Column references are never bound.
//! let sql = qb::select_all()
//!     .from("users")
//!     .where_(("name", "=", col_ref("data.name")))
//!     .to_sql()?;
//! assert_eq!(sql, r#"SELECT * FROM "users" WHERE "name" = "data"."name""#);
//!
//! // Execution goes through an engine.
//! let users: Vec<User> = qb::select(["id", "name"]).from("users").all_as(&engine)?;
//! # Ok::<(), birdql::QbError>(())
//! ```

pub mod client;
pub mod condition;
pub mod config;
pub mod error;
pub mod ident;
pub mod monitor;
pub mod qb;
pub mod value;

pub use client::{ExecResult, Executor, PreparedQuery, Row, from_row};
pub use condition::{
    ColumnRef, Combinator, Condition, ConditionInput, Operator, Term, and, col_ref, or, raw,
    where_ref,
};
pub use config::{BuildOptions, LikeValues};
pub use error::{QbError, QbResult};
pub use ident::{quote_column, quote_identifier, quote_table};
pub use monitor::{
    CompositeHook, HookAction, HookedExecutor, QueryContext, QueryHook, QueryResult, QueryType,
    TracingSqlHook,
};
pub use value::Value;

// Re-export qb module for easy access
pub use qb::{
    BuiltQuery, CreateTableQb, DeleteQb, DropTableQb, InsertQb, ParamContext, Params, RawQb,
    SelectQb, SqlQb, UpdateQb, WhereClause, create_table, delete_from, drop_table, insert_into,
    raw_query, select, select_all, update,
};
