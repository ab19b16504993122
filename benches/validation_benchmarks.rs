use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use markup_lint::{check_well_formed, tokenize, validate_source, RuleRegistry};
use std::hint::black_box;

/// Generate a question document with `sections` nested panels
fn generate_document(sections: usize, scenario: &str) -> String {
    let mut doc = String::from("<?xml version=\"1.0\"?>\n<pl-question-panel>\n");

    for i in 0..sections {
        match scenario {
            "nested_restricted" if i % 10 == 0 => {
                doc.push_str("  <div><pl-question-panel>nested</pl-question-panel></div>\n");
            }
            _ => {}
        }
        doc.push_str(&format!(
            "  <section id=\"s{i}\" class='q'>\n    <!-- part {i} -->\n    <p>Compute {i} &amp; {} &lt; x</p>\n    <pl-number-input answers-name=\"a{i}\" weight=\"1\"/>\n  </section>\n",
            i + 1
        ));
    }

    if scenario == "unclosed" {
        doc.push_str("  <div>\n    <span>\n");
    }
    doc.push_str("</pl-question-panel>\n");
    doc
}

/// Benchmark the tokenizer alone
fn bench_tokenize(c: &mut Criterion) {
    let mut group = c.benchmark_group("tokenize");

    for sections in [10, 100, 1_000] {
        let doc = generate_document(sections, "valid");
        group.throughput(Throughput::Bytes(doc.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(sections), &doc, |b, doc| {
            b.iter(|| {
                let count = tokenize(black_box(doc)).filter(Result::is_ok).count();
                black_box(count)
            })
        });
    }

    group.finish();
}

/// Benchmark tree construction with and without nesting errors
fn bench_well_formedness(c: &mut Criterion) {
    let mut group = c.benchmark_group("well_formedness");

    for scenario in ["valid", "unclosed"] {
        let doc = generate_document(1_000, scenario);
        group.bench_with_input(BenchmarkId::from_parameter(scenario), &doc, |b, doc| {
            b.iter(|| black_box(check_well_formed(tokenize(black_box(doc)))))
        });
    }

    group.finish();
}

/// Benchmark the full pipeline including the root-only rule
fn bench_validate_source(c: &mut Criterion) {
    let rules = RuleRegistry::from_config(&["pl-question-panel".to_string()])
        .expect("build rule registry");
    let mut group = c.benchmark_group("validate_source");

    for scenario in ["valid", "nested_restricted"] {
        let doc = generate_document(1_000, scenario);
        group.bench_with_input(BenchmarkId::from_parameter(scenario), &doc, |b, doc| {
            b.iter(|| black_box(validate_source(black_box(doc), black_box(&rules))))
        });
    }

    group.finish();
}

criterion_group!(
    validation_benches,
    bench_tokenize,
    bench_well_formedness,
    bench_validate_source
);

criterion_main!(validation_benches);
