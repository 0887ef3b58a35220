use criterion::{black_box, criterion_group, criterion_main, Criterion};

use quizmark_core::normalize::normalize;

fn bench_normalize(c: &mut Criterion) {
    let mut group = c.benchmark_group("normalize");

    let clean = r#"{"scores":[80,65,90],"feedback":"Solid work overall, with gaps in Q2.","per_question_feedback":["good","shaky","great"]}"#;

    let fenced = format!("```json\n{clean}\n```");

    let noisy = format!("Sure! Here is the grading:\n\n{clean}\n\nLet me know if you need more.");

    let garbage = {
        let mut s = String::new();
        for i in 0..50 {
            s.push_str(&format!("line {i} of a reply that is not JSON at all\n"));
        }
        s
    };

    group.bench_function("clean", |b| b.iter(|| normalize(black_box(clean))));

    group.bench_function("fenced", |b| b.iter(|| normalize(black_box(&fenced))));

    group.bench_function("noisy", |b| b.iter(|| normalize(black_box(&noisy))));

    group.bench_function("garbage", |b| b.iter(|| normalize(black_box(&garbage))));

    group.finish();
}

criterion_group!(benches, bench_normalize);
criterion_main!(benches);
