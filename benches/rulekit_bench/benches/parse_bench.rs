//! Rule parsing benchmarks

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rulekit_validate::{tokenize, FieldRules, RuleMap};

/// Benchmark tokenizing rule strings
fn bench_tokenize(c: &mut Criterion) {
    let mut group = c.benchmark_group("tokenize");

    group.bench_function("short", |b| {
        b.iter(|| tokenize(black_box("required|email")))
    });

    group.bench_function("long", |b| {
        b.iter(|| {
            tokenize(black_box(
                "required|string|alphaDash|length:3,32|notIn:admin,root|different:email",
            ))
        })
    });

    // Regex parameters are compiled once and cached
    group.bench_function("regex_param", |b| {
        b.iter(|| FieldRules::parse(black_box(r"required|regex:/^[A-Z]{2}\d{6}$/i")))
    });

    group.finish();
}

/// Benchmark building a rule map
fn bench_rule_map(c: &mut Criterion) {
    c.bench_function("rule_map_build", |b| {
        b.iter(|| {
            RuleMap::from([
                ("name|Name", "required|max:25"),
                ("email", "required|email"),
                ("items.*.sku", "required|alphaDash"),
                ("items.*.qty", "required|integer|gt:0"),
            ])
        })
    });
}

criterion_group!(benches, bench_tokenize, bench_rule_map);
criterion_main!(benches);
