use birdql::qb::{self, SqlQb};
use birdql::{Condition, ConditionInput, ParamContext, SelectQb, WhereClause};
use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

/// SELECT col0, col1, ... FROM t WHERE col0 = $0 AND col1 = $1 ...
fn build_select(n: usize) -> SelectQb {
    let fields: Vec<String> = (0..n).map(|i| format!("col{i}")).collect();
    let conditions: Vec<ConditionInput> = (0..n)
        .map(|i| (format!("col{i}"), "=", i as i64).into())
        .collect();
    qb::select(fields).from("t").where_all(conditions)
}

/// Each level selects from the one below it and adds one bound condition.
fn build_nested(depth: usize) -> SelectQb {
    (0..depth).fold(
        qb::select(["id"]).from("t0").where_(("id", "=", 0)),
        |inner, level| {
            qb::select(["id"])
                .field(inner.as_("inner"))
                .from(&format!("t{}", level + 1))
                .where_(("id", "=", level as i64 + 1))
        },
    )
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("sql_builder/build");

    for n in [1, 5, 10, 50, 100] {
        let select = build_select(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &select, |b, select| {
            b.iter(|| black_box(select.build()));
        });
    }

    group.finish();
}

fn bench_construct_and_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("sql_builder/construct_and_build");

    for n in [1, 5, 10, 50, 100] {
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            b.iter(|| black_box(build_select(n).build()));
        });
    }

    group.finish();
}

fn bench_in_list(c: &mut Criterion) {
    let mut group = c.benchmark_group("sql_builder/in_list");

    for n in [5, 20, 100, 500] {
        let values: Vec<i64> = (0..n).collect();
        group.bench_with_input(BenchmarkId::from_parameter(n), &values, |b, values| {
            b.iter(|| {
                let select = qb::select_all()
                    .from("t")
                    .where_(("id", "IN", values.clone()));
                black_box(select.build())
            });
        });
    }

    group.finish();
}

fn bench_where_clause(c: &mut Criterion) {
    let mut group = c.benchmark_group("sql_builder/where_clause");

    for n in [1, 5, 10, 50] {
        let conditions: Vec<Condition> = (0..n)
            .filter_map(|i| Condition::classify((format!("col{i}"), "=", i as i64)).ok())
            .collect();
        let Ok(clause) = WhereClause::from_conditions(conditions) else {
            continue;
        };

        group.bench_with_input(BenchmarkId::from_parameter(n), &clause, |b, clause| {
            b.iter(|| {
                let mut ctx = ParamContext::new();
                black_box(clause.build(&mut ctx))
            });
        });
    }

    group.finish();
}

fn bench_nested_subqueries(c: &mut Criterion) {
    let mut group = c.benchmark_group("sql_builder/nested_subqueries");

    for depth in [1, 4, 16, 64] {
        let select = build_nested(depth);
        group.bench_with_input(BenchmarkId::from_parameter(depth), &select, |b, select| {
            b.iter(|| black_box(select.build()));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_build,
    bench_construct_and_build,
    bench_in_list,
    bench_where_clause,
    bench_nested_subqueries
);
criterion_main!(benches);
