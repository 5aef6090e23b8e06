use criterion::{criterion_group, criterion_main, Criterion};
use pyll::{lexer, parser};
use std::hint::black_box;

static INPUT: &str = include_str!("../../demos/big.py");

fn criterion_benchmark(c: &mut Criterion) {
    let tokens = lexer::lex(INPUT).unwrap();

    c.bench_function("parser", |b| {
        b.iter(|| {
            let module = parser::parse(black_box(&tokens)).unwrap();
            black_box(module);
        })
    });

    c.bench_function("compile", |b| {
        b.iter(|| {
            let ir = pyll::compile(black_box(INPUT), "big.py").unwrap();
            black_box(ir);
        })
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
