//! Verification throughput benchmarks
//!
//! Measures the pairwise heuristic pass as the clause count grows, the
//! formal path on a fixed constraint set, and the clause-set fingerprint.
//!
//! Run with: cargo bench -p clause-core --bench determinism

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use clause_core::normalizer::fingerprint;
use clause_core::{Clause, ClauseCategory, Verifier};

const TEXT_TEMPLATES: &[&str] = &[
    "Seller may terminate with {} days notice",
    "Neither party may terminate before {} days",
    "Vendor is the exclusive supplier for region {}",
    "Buyer shall pay within {} days of invoice",
];

fn free_text_clauses(n: usize) -> Vec<Clause> {
    (0..n)
        .map(|i| {
            let template = TEXT_TEMPLATES[i % TEXT_TEMPLATES.len()];
            Clause::text(format!("t{}", i), template.replace("{}", &(10 + i).to_string()))
        })
        .collect()
}

fn formal_clauses() -> Vec<Clause> {
    vec![
        Clause::categorized("d1", "Term is exactly 12 months", ClauseCategory::Duration, 12),
        Clause::categorized("d2", "Minimum term of 6 months", ClauseCategory::Duration, 6),
        Clause::categorized("d3", "No more than 36 months", ClauseCategory::Duration, 36),
        Clause::categorized("l1", "Liability capped at $20,000", ClauseCategory::Liability, 20_000),
        Clause::categorized("l2", "Penalty of $5,000", ClauseCategory::Liability, 5_000),
    ]
}

fn bench_heuristic(c: &mut Criterion) {
    let verifier = Verifier::default();
    let mut group = c.benchmark_group("heuristic");
    for n in [8usize, 32, 128] {
        let clauses = free_text_clauses(n);
        group.throughput(Throughput::Elements((n * (n - 1) / 2) as u64));
        group.bench_with_input(BenchmarkId::from_parameter(n), &clauses, |b, clauses| {
            b.iter(|| verifier.verify(black_box(clauses)))
        });
    }
    group.finish();
}

fn bench_formal(c: &mut Criterion) {
    let verifier = Verifier::default();
    let clauses = formal_clauses();
    c.bench_function("formal/five_clauses", |b| {
        b.iter(|| verifier.verify(black_box(&clauses)))
    });
}

fn bench_fingerprint(c: &mut Criterion) {
    let clauses = free_text_clauses(128);
    c.bench_function("fingerprint/128_clauses", |b| {
        b.iter(|| fingerprint(black_box(&clauses)))
    });
}

criterion_group!(benches, bench_heuristic, bench_formal, bench_fingerprint);
criterion_main!(benches);
