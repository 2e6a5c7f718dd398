use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use dd_core::{DepthConfig, DepthEngine, TangentMode};

fn piecewise(n: usize) -> Vec<f64> {
    (0..n)
        .map(|k| {
            let x = k as f64 * 0.01;
            match k % 300 {
                0..100 => 5.0,
                100..200 => x,
                _ => x * x,
            }
        })
        .collect()
}

fn bench_classify(c: &mut Criterion) {
    let mut group = c.benchmark_group("classify");
    for mode in [TangentMode::Float, TangentMode::Decimal] {
        let engine = DepthEngine::new(&DepthConfig {
            tangent: mode,
            ..DepthConfig::default()
        })
        .unwrap();
        for n in [1_000, 10_000] {
            let values = piecewise(n);
            group.bench_with_input(
                BenchmarkId::new(format!("{mode:?}"), n),
                &values,
                |b, values| b.iter(|| engine.classify(black_box(values), 0.01).unwrap()),
            );
        }
    }
    group.finish();
}

fn bench_max_depth(c: &mut Criterion) {
    let values = piecewise(10_000);
    let mut group = c.benchmark_group("max_depth");
    for max_depth in [4, 10, 20] {
        let engine = DepthEngine::new(&DepthConfig {
            max_depth,
            ..DepthConfig::default()
        })
        .unwrap();
        group.bench_function(BenchmarkId::from_parameter(max_depth), |b| {
            b.iter(|| engine.classify(black_box(&values), 0.01).unwrap())
        });
    }
    group.finish();
}

criterion_group!(benches, bench_classify, bench_max_depth);
criterion_main!(benches);
