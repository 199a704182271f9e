//! Statement builders.
//!
//! Every builder is a consuming, chainable value. Identifiers and conditions
//! are validated as they are added; the first failure is kept and returned by
//! the terminal [`SqlQb::build`], so a chain never panics and never returns
//! `Result` halfway through.
//!
//! All placeholders of one build come from a single [`ParamContext`]. A SELECT
//! embedded as a field or inside a condition renders against its parent's
//! context, which keeps `$n` numbering unique across nesting levels. Values
//! are bound outermost first: fields before WHERE, and a subquery condition's
//! compared value before the subquery's own values.
//!
//! # Usage
//!
//! ```ignore
//! use birdql::qb::{self, SqlQb};
//!
//! // SELECT
//! let built = qb::select_all()
//!     .from("users")
//!     .where_(("users.id", "IN", ["1", "2", "3"]))
//!     .build()?;
//! assert_eq!(built.sql, r#"SELECT * FROM "users" WHERE "users"."id" IN ($0, $1, $2)"#);
//!
//! // INSERT
//! qb::insert_into("users")
//!     .value("username", "alice")
//!     .value("email", "alice@example.com")
//!     .run(&engine)?;
//!
//! // UPDATE
//! qb::update("users")
//!     .set("status", "inactive")
//!     .where_(("id", "=", user_id))
//!     .run(&engine)?;
//!
//! // DELETE
//! qb::delete_from("users")
//!     .where_(("id", "=", user_id))
//!     .run(&engine)?;
//! # Ok::<(), birdql::QbError>(())
//! ```

mod delete;
mod functions;
mod insert;
mod param;
mod raw;
mod select;
mod table;
mod traits;
mod update;
mod where_clause;

pub use delete::DeleteQb;
pub use functions::{SqlFunction, avg, count, length, lower, max, min, sum, upper};
pub use insert::InsertQb;
pub use param::{ParamContext, Params};
pub use raw::RawQb;
pub use select::{JoinKind, Order, SelectField, SelectQb};
pub use table::{CreateTableQb, DropTableQb};
pub use traits::{BuiltQuery, SqlQb};
pub use update::UpdateQb;
pub use where_clause::WhereClause;

use crate::value::Value;

/// Create a SELECT with the given fields.
///
/// # Example
/// ```ignore
/// let qb = birdql::qb::select(["id", "name"]).from("users");
/// ```
pub fn select<I, F>(fields: I) -> SelectQb
where
    I: IntoIterator<Item = F>,
    F: Into<SelectField>,
{
    SelectQb::new().fields(fields)
}

/// Create a `SELECT *`.
pub fn select_all() -> SelectQb {
    SelectQb::new().field("*")
}

/// Create an INSERT for the given table.
pub fn insert_into(table: &str) -> InsertQb {
    InsertQb::new(table)
}

/// Create an UPDATE for the given table.
pub fn update(table: &str) -> UpdateQb {
    UpdateQb::new(table)
}

/// Create a DELETE for the given table.
///
/// Without a WHERE condition every row is deleted.
pub fn delete_from(table: &str) -> DeleteQb {
    DeleteQb::new(table)
}

/// Wrap hand-written SQL and its placeholder mapping.
///
/// # Example
/// ```ignore
/// let qb = birdql::qb::raw_query("SELECT * FROM users WHERE id = $id", [("$id", 1)]);
/// ```
pub fn raw_query<I, K, V>(sql: impl Into<String>, params: I) -> RawQb
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<Value>,
{
    RawQb::new(sql, params)
}

/// Create a CREATE TABLE from `(column, type)` pairs.
pub fn create_table<I, K, T>(table: &str, columns: I) -> CreateTableQb
where
    I: IntoIterator<Item = (K, T)>,
    K: AsRef<str>,
    T: Into<String>,
{
    CreateTableQb::new(table, columns)
}

/// Create a DROP TABLE.
pub fn drop_table(table: &str) -> DropTableQb {
    DropTableQb::new(table)
}
