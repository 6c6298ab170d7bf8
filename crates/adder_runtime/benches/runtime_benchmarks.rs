//! Benchmarks for the Adder REPL core (classification, continuation, completion).
//!
//! Run with: `cargo bench --package adder_runtime --bench runtime_benchmarks`

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

use adder_foundation::Namespace;
use adder_language::{Output, Value};
use adder_runtime::{Document, ReplConfig, Session, classify, complete, decide};

// =============================================================================
// Helper Functions
// =============================================================================

/// Builds a buffer holding a function with `lines` body statements.
fn function_buffer(lines: usize) -> String {
    let mut text = String::from("def f(items):\n    total = 0\n");
    for i in 0..lines {
        text.push_str(&format!("    total += items[{i}] * {i}  # step {i}\n"));
    }
    text.push_str("    return total\n");
    text
}

/// Builds a namespace with `count` names.
fn namespace(count: usize) -> Namespace<Value> {
    (0..count)
        .map(|i| (format!("name_{i:05}"), Value::Int(i64::try_from(i).unwrap_or(0))))
        .collect()
}

// =============================================================================
// Classification Benchmarks
// =============================================================================

fn bench_classify(c: &mut Criterion) {
    let mut group = c.benchmark_group("classify");

    for lines in [1, 10, 100] {
        let text = function_buffer(lines);
        group.bench_with_input(BenchmarkId::from_parameter(lines), &text, |b, text| {
            b.iter(|| classify(black_box(text)));
        });
    }

    group.finish();
}

// =============================================================================
// Continuation Benchmarks
// =============================================================================

fn bench_decide(c: &mut Criterion) {
    let mut group = c.benchmark_group("decide");

    group.bench_function("single_line", |b| {
        let doc = Document::at_end("x = [i * 2 for i in range(10)]");
        b.iter(|| decide(black_box(&doc), "<bench>"));
    });

    group.bench_function("open_block", |b| {
        let doc = Document::at_end(function_buffer(20).trim_end().to_string());
        b.iter(|| decide(black_box(&doc), "<bench>"));
    });

    group.bench_function("unterminated_string", |b| {
        let doc = Document::at_end("s = '''first line\nsecond line");
        b.iter(|| decide(black_box(&doc), "<bench>"));
    });

    group.finish();
}

// =============================================================================
// Completion Benchmarks
// =============================================================================

fn bench_complete(c: &mut Criterion) {
    let mut group = c.benchmark_group("complete");
    let builtins = namespace(50);

    for size in [10, 1000] {
        let globals = namespace(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &globals, |b, globals| {
            b.iter(|| complete(black_box("x = name_00"), 11, globals, &builtins));
        });
    }

    group.finish();
}

// =============================================================================
// Session Benchmarks
// =============================================================================

fn bench_session(c: &mut Criterion) {
    let mut group = c.benchmark_group("session");
    let config = ReplConfig::new();

    group.bench_function("submit_expression", |b| {
        let mut session = Session::with_output(&config, Output::buffer());
        session.submit("xs = list(range(100))");
        b.iter(|| {
            session.submit(black_box("sum(xs)"));
            session.output().take()
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_classify,
    bench_decide,
    bench_complete,
    bench_session
);
criterion_main!(benches);
