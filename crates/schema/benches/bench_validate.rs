// Validation throughput benchmarks
// Run with: cargo bench -p nebula-schema

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use nebula_schema::prelude::*;
use serde_json::{Value, json};

fn user_schema() -> Validator {
    object()
        .fields([
            ("name", string().options(json!({"trim": true, "minLength": 1})).build()),
            ("email", email().build()),
            ("age", number().options(json!({"opt": true, "min": 0})).build()),
            ("tags", array().items([string()]).build()),
        ])
        .build()
        .unwrap()
}

fn user(n: usize) -> Value {
    json!({
        "name": format!("  user {n} "),
        "email": format!("User{n}@Example.com"),
        "age": n % 90,
        "tags": ["a", "b", "c"],
    })
}

/// Single flat object, the common request-body case
fn bench_object(c: &mut Criterion) {
    let schema = user_schema();
    let data = user(7);

    c.bench_function("validate_object", |b| {
        b.iter(|| black_box(schema.validate(black_box(&data))));
    });
}

/// Arrays of objects at growing sizes
fn bench_array_of_objects(c: &mut Criterion) {
    let schema = array().items([user_schema()]).build().unwrap();
    let mut group = c.benchmark_group("validate_array");

    for size in [10, 100, 1000] {
        let data = Value::Array((0..size).map(user).collect());
        group.bench_with_input(BenchmarkId::from_parameter(size), &data, |b, data| {
            b.iter(|| black_box(schema.validate(data)));
        });
    }
    group.finish();
}

/// Fast path vs the option-carrying kind
fn bench_email_paths(c: &mut Criterion) {
    let fast = email().build().unwrap();
    let full = email().optional().build().unwrap();
    let data = json!(" Someone@Example.COM ");

    c.bench_function("email_fast", |b| {
        b.iter(|| black_box(fast.validate(black_box(&data))));
    });
    c.bench_function("email_full", |b| {
        b.iter(|| black_box(full.validate(black_box(&data))));
    });
}

/// Failing validation builds a nested error chain
fn bench_failure(c: &mut Criterion) {
    let schema = array().items([user_schema()]).build().unwrap();
    let data = json!([user(1), {"name": "x", "email": "broken", "tags": []}]);

    c.bench_function("validate_failure_nested", |b| {
        b.iter(|| black_box(schema.validate(black_box(&data)).is_err()));
    });
}

/// Schema construction and derivation
fn bench_build(c: &mut Criterion) {
    c.bench_function("build_user_schema", |b| {
        b.iter(|| black_box(user_schema()));
    });

    let schema = user_schema();
    c.bench_function("clone_with_whitelist", |b| {
        b.iter(|| black_box(schema.clone_with([Patch::keep(["name", "email"])])));
    });
}

criterion_group!(
    benches,
    bench_object,
    bench_array_of_objects,
    bench_email_paths,
    bench_failure,
    bench_build
);
criterion_main!(benches);
