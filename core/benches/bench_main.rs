use criterion::{Criterion, criterion_group, criterion_main};
use mlang_core::{
    parser::Parser,
    token::Tokenizer,
    visitor::Visitor,
    workspace::{IndexConfig, analyze},
};
use std::hint::black_box;
use url::Url;

// A mid-sized script: a few functions, control flow, matrices and calls
fn sample_source(functions: usize) -> String {
    let mut src = String::new();
    for i in 0..functions {
        src.push_str(&format!(
            "% Computes step {i}.\n\
             function [out, total] = step{i}(x, scale = 2)\n\
             \x20 total = 0;\n\
             \x20 for k = 1:numel(x)\n\
             \x20   if x(k) > 0\n\
             \x20     total = total + x(k) * scale;\n\
             \x20   elseif x(k) == 0\n\
             \x20     continue;\n\
             \x20   else\n\
             \x20     total = total - abs(x(k));\n\
             \x20   end\n\
             \x20 end\n\
             \x20 out = [total, numel(x); x(1)', 0];\n\
             end\n\n"
        ));
    }
    for i in 0..functions {
        src.push_str(&format!("[o{i}, t{i}] = step{i}([1, -2, 3], 4);\n"));
    }
    src
}

fn bench_tokenize(c: &mut Criterion) {
    let src = sample_source(50);
    c.bench_function("tokenize_50_functions", |b| {
        b.iter(|| {
            let tokens = Tokenizer::tokenize(black_box(&src)).unwrap();
            black_box(tokens.len());
        })
    });
}

fn bench_parse(c: &mut Criterion) {
    let src = sample_source(50);
    let tokens = Tokenizer::tokenize(&src).unwrap();
    c.bench_function("parse_50_functions", |b| {
        b.iter(|| {
            let mut parser = Parser::new(black_box(&tokens));
            let program = parser.parse();
            black_box(program.body.len());
        })
    });

    let mut parser = Parser::new(&tokens);
    let program = parser.parse();
    c.bench_function("visit_50_functions", |b| {
        b.iter(|| {
            let mut visitor = Visitor::new();
            visitor.visit(black_box(&program));
            black_box(visitor.references.len());
        })
    });
}

fn bench_analyze(c: &mut Criterion) {
    let src = sample_source(50);
    let uri = Url::parse("file:///bench/sample.m").unwrap();
    let config = IndexConfig::default();
    c.bench_function("analyze_document", |b| {
        b.iter(|| {
            let snapshot = analyze(uri.clone(), src.clone(), 1, 0, &config, &|_| false);
            black_box(snapshot.diagnostics.len());
        })
    });
}

criterion_group!(benches, bench_tokenize, bench_parse, bench_analyze);
criterion_main!(benches);
