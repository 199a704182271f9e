//! WHERE clause: one or more classified conditions joined with AND.

use crate::condition::{Condition, ConditionInput};
use crate::error::{QbError, QbResult};
use crate::qb::param::ParamContext;

/// An ordered, non-empty list of conditions from one `where` call.
///
/// Conditions are independent top-level entries, AND-joined when built.
/// Several clauses on one statement are AND-joined as well.
#[derive(Debug, Clone, PartialEq)]
pub struct WhereClause {
    conditions: Vec<Condition>,
}

impl WhereClause {
    /// Classify every input; fails on the first invalid one or on an empty list.
    pub fn new<I, C>(conditions: I) -> QbResult<Self>
    where
        I: IntoIterator<Item = C>,
        C: Into<ConditionInput>,
    {
        let conditions = conditions
            .into_iter()
            .map(Condition::classify)
            .collect::<QbResult<Vec<_>>>()?;
        Self::from_conditions(conditions)
    }

    /// Wrap conditions that were classified beforehand.
    pub fn from_conditions(conditions: Vec<Condition>) -> QbResult<Self> {
        if conditions.is_empty() {
            return Err(QbError::invalid_condition(
                "WHERE requires at least one condition",
            ));
        }
        Ok(Self { conditions })
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    /// Render the conditions joined by AND; empty groups are dropped.
    pub fn build(&self, ctx: &mut ParamContext) -> QbResult<String> {
        let mut parts = Vec::with_capacity(self.conditions.len());
        for cond in &self.conditions {
            let sql = cond.build(ctx)?;
            if !sql.is_empty() {
                parts.push(sql);
            }
        }
        Ok(parts.join(" AND "))
    }
}

/// Render several clauses as one ` WHERE ...` suffix, or nothing.
pub(crate) fn write_where(
    sql: &mut String,
    clauses: &[WhereClause],
    ctx: &mut ParamContext,
) -> QbResult<()> {
    let mut parts = Vec::with_capacity(clauses.len());
    for clause in clauses {
        let part = clause.build(ctx)?;
        if !part.is_empty() {
            parts.push(part);
        }
    }
    if !parts.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&parts.join(" AND "));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::{and, raw};

    #[test]
    fn conditions_are_and_joined() {
        let clause = WhereClause::new([
            ConditionInput::from(("a", "=", 1)),
            ("b", "IS NULL").into(),
        ])
        .unwrap();
        let mut ctx = ParamContext::new();
        assert_eq!(clause.build(&mut ctx).unwrap(), r#""a" = $0 AND "b" IS NULL"#);
    }

    #[test]
    fn empty_list_is_rejected() {
        let err = WhereClause::new(Vec::<ConditionInput>::new()).unwrap_err();
        assert!(matches!(err, QbError::InvalidCondition(_)));
    }

    #[test]
    fn empty_groups_are_dropped() {
        let clause = WhereClause::new([and(Vec::<ConditionInput>::new()), raw("x > 1")]).unwrap();
        let mut ctx = ParamContext::new();
        assert_eq!(clause.build(&mut ctx).unwrap(), "x > 1");

        let mut sql = String::from("SELECT 1");
        let only_empty = WhereClause::new([and(Vec::<ConditionInput>::new())]).unwrap();
        write_where(&mut sql, &[only_empty], &mut ctx).unwrap();
        assert_eq!(sql, "SELECT 1");
    }
}
