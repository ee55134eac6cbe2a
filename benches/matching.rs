//! Benchmarks for linrex pattern matching
//!
//! One benchmark per matcher branch, plus compile cost and the
//! pathological nested-quantifier case.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use linrex::Pattern;

const LOG_LINE: &str = "2024-03-01T12:00:00Z host42 sshd[1881]: Accepted publickey for deploy from 10.0.0.7 port 51234 ssh2";

fn bench_literal(c: &mut Criterion) {
    let p = Pattern::compile("publickey").unwrap();

    c.bench_function("literal_substring", |b| {
        b.iter(|| p.is_match(black_box(LOG_LINE)))
    });
}

fn bench_anchored_literal(c: &mut Criterion) {
    let p = Pattern::compile("^2024-03-01T12:00:00Z").unwrap();

    c.bench_function("anchored_literal", |b| {
        b.iter(|| p.is_match(black_box(LOG_LINE)))
    });
}

fn bench_literal_alternation(c: &mut Criterion) {
    let p = Pattern::compile("error|warning|fatal|panic|Accepted").unwrap();

    c.bench_function("literal_alternation", |b| {
        b.iter(|| p.is_match(black_box(LOG_LINE)))
    });
}

fn bench_both_anchors(c: &mut Criterion) {
    let p = Pattern::compile("^2024.*ssh2$").unwrap();

    c.bench_function("both_anchors", |b| {
        b.iter(|| p.is_match(black_box(LOG_LINE)))
    });
}

fn bench_url_shape(c: &mut Criterion) {
    let p = Pattern::compile("https?://[a-zA-Z0-9./-]+").unwrap();
    let text = "fetching https://example.com/path/to/resource next";

    c.bench_function("url_shape", |b| b.iter(|| p.is_match(black_box(text))));
}

fn bench_advanced_alternation(c: &mut Criterion) {
    let p = Pattern::compile("^FDSN:NET_STA_LOC_L_H_N/MSEED3?|^FDSN:XY_STA_10_B_H_.*/MSEED3?|^FDSN:YY_ST1_.*_.*_.*_Z/MSEED3?")
        .unwrap();
    let text = "FDSN:XY_STA_10_B_H_Z/MSEED";

    c.bench_function("advanced_alternation", |b| {
        b.iter(|| p.is_match(black_box(text)))
    });
}

fn bench_general_nfa(c: &mut Criterion) {
    let p = Pattern::compile("sshd\\[[0-9]+\\]").unwrap();

    c.bench_function("general_nfa", |b| b.iter(|| p.is_match(black_box(LOG_LINE))));
}

fn bench_pathological(c: &mut Criterion) {
    let p = Pattern::compile("(a+)+").unwrap();
    let text = format!("{}X", "a".repeat(64));

    c.bench_function("nested_quantifiers", |b| {
        b.iter(|| p.is_match(black_box(&text)))
    });
}

fn bench_compile(c: &mut Criterion) {
    c.bench_function("compile_general", |b| {
        b.iter(|| Pattern::compile(black_box("h.llo (wor|ld)+ [0-9a-f]*$")).unwrap())
    });

    c.bench_function("compile_alternation", |b| {
        b.iter(|| Pattern::compile(black_box("error|warning|fatal|panic")).unwrap())
    });
}

criterion_group!(
    benches,
    bench_literal,
    bench_anchored_literal,
    bench_literal_alternation,
    bench_both_anchors,
    bench_url_shape,
    bench_advanced_alternation,
    bench_general_nfa,
    bench_pathological,
    bench_compile
);
criterion_main!(benches);
