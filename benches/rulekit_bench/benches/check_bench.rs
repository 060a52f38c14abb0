//! `Validator::check` throughput benchmarks
//!
//! Measures a flat form, a wildcard list and batch collection.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rulekit_validate::{RuleMap, RuleRegistry, Validator, Value};
use serde_json::json;
use std::sync::Arc;

fn validator(rules: RuleMap) -> Validator {
    Validator::with_registry(rules, Arc::new(RuleRegistry::new()))
}

fn signup_rules() -> RuleMap {
    RuleMap::from([
        ("name|Name", "required|chsDash|max:25"),
        ("email", "required|email"),
        ("password", "required|length:6,32"),
        ("password_confirmation", "same:password"),
        ("age", "nullable|integer|between:18,120"),
        ("status", "default:active|in:active,banned"),
    ])
}

/// Benchmark a flat signup form
fn bench_flat_form(c: &mut Criterion) {
    let mut group = c.benchmark_group("flat_form");

    let valid = Value::from(json!({
        "name": "kit",
        "email": "kit@example.com",
        "password": "secret123",
        "password_confirmation": "secret123",
        "age": 30
    }));
    let invalid = Value::from(json!({
        "name": "",
        "email": "nope",
        "password": "123",
        "password_confirmation": "321",
        "age": 12
    }));

    group.bench_function("valid", |b| {
        let mut v = validator(signup_rules());
        b.iter(|| v.check(black_box(&valid)))
    });

    group.bench_function("invalid_fail_fast", |b| {
        let mut v = validator(signup_rules());
        b.iter(|| v.check(black_box(&invalid)))
    });

    group.bench_function("invalid_batch", |b| {
        let mut v = validator(signup_rules()).batch(true);
        b.iter(|| v.check(black_box(&invalid)))
    });

    group.finish();
}

/// Benchmark wildcard expansion over growing lists
fn bench_wildcard_list(c: &mut Criterion) {
    let mut group = c.benchmark_group("wildcard_list");

    for size in [10usize, 100, 1000] {
        let items: Vec<_> = (0..size)
            .map(|i| json!({"sku": format!("SKU-{}", i), "qty": i % 7 + 1}))
            .collect();
        let data = Value::from(json!({ "items": items }));
        let rules = RuleMap::from([
            ("items", "required|array"),
            ("items.*.sku", "required|alphaDash|max:16"),
            ("items.*.qty", "required|integer|egt:1"),
        ]);

        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &data, |b, data| {
            let mut v = validator(rules.clone()).batch(true);
            b.iter(|| v.check(black_box(data)))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_flat_form, bench_wildcard_list);
criterion_main!(benches);
