use std::hint::black_box;

use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use sqlguard_core::analysis::AnalysisEngine;
use sqlguard_core::parser::ParsedFile;
use sqlguard_core::taint::TaintAnalyzer;

fn generate_service_module(handlers: usize) -> String {
    let mut code = String::with_capacity(handlers * 400);
    code.push_str("// Generated data-access module for benchmarking\n\n");

    for i in 0..handlers {
        code.push_str(&format!(
            r#"function findUser{i}(req, res) {{
    const id = req.params.id;
    const query = "SELECT * FROM users WHERE id = " + id;
    db.query(query);
}}

function listUsers{i}() {{
    const query = "SELECT * FROM users WHERE active = true";
    db.query(query);
}}

function updateUser{i}(req) {{
    pool.query("UPDATE users SET name = ? WHERE id = ?", [req.body.name, req.params.id]);
}}

"#,
            i = i
        ));
    }

    code
}

fn bench_parsing(c: &mut Criterion) {
    let source = generate_service_module(25);

    let mut group = c.benchmark_group("parsing");
    group.throughput(Throughput::Bytes(source.len() as u64));
    group.bench_function("service_module", |b| {
        b.iter(|| ParsedFile::from_source("service.js", black_box(&source)))
    });
    group.finish();
}

fn bench_taint_analysis(c: &mut Criterion) {
    let source = generate_service_module(25);
    let parsed = ParsedFile::from_source("service.js", &source);
    let analyzer = TaintAnalyzer::new();

    c.bench_function("taint_analysis", |b| {
        b.iter(|| analyzer.analyze(black_box(&parsed)))
    });
}

fn bench_full_engine(c: &mut Criterion) {
    let source = generate_service_module(25);
    let parsed = ParsedFile::from_source("service.js", &source);
    let engine = AnalysisEngine::new();

    c.bench_function("analysis_engine", |b| {
        b.iter(|| engine.analyze(black_box(&parsed)))
    });
}

criterion_group!(benches, bench_parsing, bench_taint_analysis, bench_full_engine);
criterion_main!(benches);
