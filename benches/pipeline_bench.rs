//! Optimization pipeline performance benchmarks

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use promptlift::config::ScoringConfig;
use promptlift::models::{OptimizationSettings, OutputPreference, TargetModel, Tone};
use promptlift::providers::{GenerationParams, OpenAIProvider};
use promptlift::services::{compose_instruction, fallback_optimize, parse_reply, PromptOptimizer};
use std::sync::Arc;

fn settings_matrix() -> Vec<OptimizationSettings> {
    let mut matrix = Vec::new();
    for target in ["gpt-4", "claude", "generic", "mistral"] {
        for tone in ["neutral", "technical", "creative", "concise"] {
            for output in ["detailed", "short"] {
                matrix.push(OptimizationSettings::new(
                    TargetModel::parse(target),
                    Tone::parse(tone),
                    OutputPreference::parse(output),
                ));
            }
        }
    }
    matrix
}

fn create_reply(paragraphs: usize) -> String {
    let body = (0..paragraphs)
        .map(|i| format!("Step {}: describe the expected behavior in precise terms.", i))
        .collect::<Vec<_>>()
        .join("\n\n");
    format!(
        "OPTIMIZED_PROMPT:\nYou are a senior engineer.\n\n{}\n\nEXPLANATION:\nAdded a role and numbered steps.",
        body
    )
}

fn bench_compose(c: &mut Criterion) {
    let matrix = settings_matrix();
    c.bench_function("compose_instruction_matrix", |b| {
        b.iter(|| {
            for settings in &matrix {
                black_box(compose_instruction(black_box(settings)));
            }
        })
    });
}

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_reply");

    for paragraphs in [1, 10, 100, 1000] {
        let reply = create_reply(paragraphs);
        group.bench_with_input(BenchmarkId::from_parameter(paragraphs), &reply, |b, reply| {
            b.iter(|| black_box(parse_reply(black_box(reply))))
        });
    }

    group.bench_function("unformatted", |b| {
        let reply = "Just a rewritten prompt with no markers at all. ".repeat(100);
        b.iter(|| black_box(parse_reply(black_box(&reply))))
    });

    group.finish();
}

fn bench_fallback(c: &mut Criterion) {
    let settings = OptimizationSettings::new(TargetModel::Gpt4, Tone::Technical, OutputPreference::Detailed);
    c.bench_function("fallback_optimize", |b| {
        b.iter(|| black_box(fallback_optimize(black_box("Write code for a login page"), &settings)))
    });
}

fn bench_offline_pipeline(c: &mut Criterion) {
    // No credential: every run ends in the fallback without touching the network
    let provider = OpenAIProvider::new("http://127.0.0.1:9", None, "gpt-4o-mini", 5).unwrap();
    let optimizer = PromptOptimizer::new(
        Arc::new(provider),
        GenerationParams {
            temperature: 0.3,
            max_tokens: 1024,
        },
        ScoringConfig {
            enabled: true,
            fallback_on_failure: true,
            temperature: 0.0,
        },
    );
    let settings = OptimizationSettings::new(TargetModel::Claude, Tone::Concise, OutputPreference::Short);

    c.bench_function("offline_pipeline", |b| {
        b.iter(|| {
            tokio_test::block_on(optimizer.optimize(black_box("Summarize this article"), settings.clone()))
                .unwrap()
        })
    });
}

criterion_group!(
    benches,
    bench_compose,
    bench_parse,
    bench_fallback,
    bench_offline_pipeline
);
criterion_main!(benches);
