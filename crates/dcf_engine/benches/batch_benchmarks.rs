//! Criterion benchmarks for the DCF pipeline.
//!
//! Benchmarks cover:
//! - A single scenario through every stage
//! - IRR solving on a typical equity cash-flow vector
//! - Batch analysis at increasing scenario counts, sequential and parallel

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use dcf_core::types::{MarketRegime, MarketScenario, PropertyDescription};
use dcf_engine::batch::{BatchConfig, BatchRunner};
use dcf_engine::irr::solve_irr;
use dcf_engine::policy::MetricsPolicy;
use dcf_engine::AnalysisPipeline;
use dcf_scenarios::{CorrelationConfig, GeneratorConfig};

fn mixed_use() -> PropertyDescription {
    PropertyDescription::new(3_500_000.0, "DEFAULT")
        .with_residential(24, 1_250.0)
        .with_commercial(3, 2_500.0)
        .with_renovation(400_000.0, 3.0)
        .with_appraisal(4_080_000.0)
}

fn bench_single_scenario(c: &mut Criterion) {
    let property = mixed_use();
    let scenario = MarketScenario::from_parameters(
        0,
        [0.065, 0.06, 0.05, 0.03, 0.025, 0.03, 0.75, 0.05, 0.01],
        MarketRegime::Neutral,
        0.5,
        0.3,
    );
    let pipeline = AnalysisPipeline::with_defaults();

    c.bench_function("single_scenario_analysis", |b| {
        b.iter(|| pipeline.analyse(black_box(&property), black_box(&scenario)))
    });
}

fn bench_irr(c: &mut Criterion) {
    let flows = [
        -1_015_000.0,
        93_740.0,
        104_046.0,
        114_673.0,
        125_631.0,
        136_930.0 + 2_997_310.0,
    ];
    let policy = MetricsPolicy::default();

    c.bench_function("irr_five_year", |b| {
        b.iter(|| solve_irr(black_box(&flows), &policy))
    });
}

fn bench_batch(c: &mut Criterion) {
    let mut group = c.benchmark_group("batch_analysis");
    group.sample_size(20);
    let property = mixed_use();
    let correlation = CorrelationConfig::standard();

    for n_scenarios in [100usize, 1_000, 10_000] {
        for (label, min_parallel_batch) in [("sequential", usize::MAX), ("parallel", 1)] {
            let runner = BatchRunner::with_defaults()
                .with_generator(GeneratorConfig::with_seed(42))
                .with_batch_config(BatchConfig {
                    min_parallel_batch,
                    ..BatchConfig::default()
                });
            group.bench_with_input(
                BenchmarkId::new(label, n_scenarios),
                &n_scenarios,
                |b, &n| b.iter(|| runner.run_batch_analysis(black_box(&property), n, &correlation)),
            );
        }
    }

    group.finish();
}

criterion_group!(benches, bench_single_scenario, bench_irr, bench_batch);
criterion_main!(benches);
