//! Benchmarks for a complete simulated threshold test.
//!
//! Run:
//! - cargo bench

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use perimetry::app;
use perimetry::config::{ObserverConfig, RunConfig, SamplerConfig};
use perimetry::core::hexgrid::{self, HexGridParams};
use perimetry::observer::VirtualObserver;
use perimetry::sampler::Sampler;

const A_LIMITS: [f64; 2] = [24.0, 30.0];
const BATCH_SIZES: [usize; 3] = [4, 8, 16];

fn bench_build_grid(c: &mut Criterion) {
    let mut group = c.benchmark_group("hexgrid_build");
    for a_limit in A_LIMITS {
        let params = HexGridParams {
            a_limit,
            ..HexGridParams::default()
        };
        group.bench_with_input(BenchmarkId::from_parameter(a_limit), &params, |b, p| {
            b.iter(|| black_box(hexgrid::build(p).unwrap()));
        });
    }
    group.finish();
}

fn bench_full_run(c: &mut Criterion) {
    let graph = hexgrid::build(&HexGridParams::default()).unwrap();
    let mut group = c.benchmark_group("full_run");
    group.sample_size(50);
    for batch_size in BATCH_SIZES {
        group.bench_with_input(
            BenchmarkId::from_parameter(batch_size),
            &batch_size,
            |b, &batch_size| {
                b.iter(|| {
                    let cfg = SamplerConfig {
                        batch_size,
                        ..SamplerConfig::default()
                    };
                    let mut sampler = Sampler::new(&graph, cfg);
                    let obs_cfg = ObserverConfig {
                        seed: Some(7),
                        ..ObserverConfig::default()
                    };
                    let mut observer =
                        VirtualObserver::from_config(&graph, sampler.scale(), &obs_cfg);
                    black_box(app::run(&mut sampler, &mut observer, &RunConfig::default()).unwrap())
                });
            },
        );
    }
    group.finish();
}

criterion_group!(benches, bench_build_grid, bench_full_run);
criterion_main!(benches);
