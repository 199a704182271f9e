//! Example demonstrating birdql's statement builders and condition helpers.
//!
//! Run with:
//!   cargo run --example sql_builder -p birdql

use birdql::qb::{self, SqlQb, count};
use birdql::{BuildOptions, ConditionInput, QbResult, and, col_ref, or};

#[derive(Debug)]
struct Filters {
    status: Option<String>,
    search: Option<String>,
    roles_any_of: Vec<String>,
    page: u64,
    per_page: u64,
}

fn build_list_users(filters: &Filters) -> qb::SelectQb {
    let mut conditions: Vec<ConditionInput> = Vec::new();

    if let Some(status) = &filters.status {
        conditions.push(("status", "=", status.as_str()).into());
    }
    if let Some(search) = &filters.search {
        conditions.push(("name", "ILIKE", format!("%{search}%")).into());
    }
    if !filters.roles_any_of.is_empty() {
        conditions.push(("role", "IN", filters.roles_any_of.clone()).into());
    }

    let mut select = qb::select(["id", "name", "status"]).from("users");
    if !conditions.is_empty() {
        select = select.where_all(conditions);
    }
    select
        .order_by_asc("name")
        .limit(filters.per_page)
        .offset(filters.page.saturating_sub(1) * filters.per_page)
}

fn main() -> QbResult<()> {
    let filters = Filters {
        status: Some("active".into()),
        search: Some("dev".into()),
        roles_any_of: vec!["admin".into(), "owner".into()],
        page: 2,
        per_page: 20,
    };

    let built = build_list_users(&filters)
        .options(BuildOptions::new().first_placeholder(1))
        .build()?;
    println!("{}", built.sql);
    println!("{}", serde_json::to_string(&built.params)?);

    // Subquery field and subquery condition share one numbering sequence.
    let order_count = qb::select([count("*")])
        .from("orders o")
        .where_(("o.user_id", "=", col_ref("u.id")))
        .as_("order_count");
    let built = qb::select(["u.id"])
        .field(order_count)
        .from("users u")
        .where_(or([
            ConditionInput::from(("u.role", "=", "admin")),
            and([
                ConditionInput::from(("u.created_at", "BETWEEN", ["2024-01-01", "2024-12-31"])),
                ("u.email", "IS NOT NULL").into(),
            ]),
        ]))
        .build()?;
    println!("{}", built.sql);
    println!("{}", serde_json::to_string(&built.params)?);

    Ok(())
}
