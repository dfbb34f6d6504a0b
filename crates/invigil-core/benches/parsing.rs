use criterion::{black_box, criterion_group, criterion_main, Criterion};

use invigil_core::quizfile::{parse_module_str, validate_module};

fn bench_quiz_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("quiz_parsing");

    let small_toml = generate_quiz_toml(5);
    let medium_toml = generate_quiz_toml(40);
    let large_toml = generate_quiz_toml(200);

    group.bench_function("5_questions", |b| {
        b.iter(|| parse_module_str(black_box(&small_toml), black_box("bench.toml".as_ref())))
    });

    group.bench_function("40_questions", |b| {
        b.iter(|| parse_module_str(black_box(&medium_toml), black_box("bench.toml".as_ref())))
    });

    group.bench_function("200_questions", |b| {
        b.iter(|| parse_module_str(black_box(&large_toml), black_box("bench.toml".as_ref())))
    });

    group.finish();
}

fn bench_validation(c: &mut Criterion) {
    let mut group = c.benchmark_group("quiz_validation");

    let toml = generate_quiz_toml(40);
    let module = parse_module_str(&toml, "bench.toml".as_ref()).unwrap();

    group.bench_function("40_questions", |b| {
        b.iter(|| validate_module(black_box(&module)))
    });

    group.finish();
}

fn generate_quiz_toml(n: usize) -> String {
    let mut s = String::new();
    s.push_str(
        r#"[module]
title = "Benchmark"

[quiz]
title = "Benchmark quiz"
kind = "exam"
duration_minutes = 30
"#,
    );
    for i in 0..n {
        if i % 4 == 3 {
            s.push_str(&format!(
                r#"
[[questions]]
id = "q{i}"
kind = "essay"
prompt = "Discuss topic {i} in your own words."
rubric = "Mentions the key points of topic {i}."
"#
            ));
        } else {
            s.push_str(&format!(
                r#"
[[questions]]
id = "q{i}"
kind = "multiple_choice"
prompt = "Question {i}: pick the right answer."
options = ["alpha", "beta", "gamma", "delta"]
answer = "beta"
"#
            ));
        }
    }
    s
}

criterion_group!(benches, bench_quiz_parsing, bench_validation);
criterion_main!(benches);
