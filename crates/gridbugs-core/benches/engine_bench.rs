use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use gridbugs_core::{Engine, WorldConfig};
use std::time::Duration;

fn bench_engine_ticks(c: &mut Criterion) {
    let mut group = c.benchmark_group("engine_tick");
    group.sample_size(20);
    group.warm_up_time(Duration::from_secs(2));
    group.measurement_time(Duration::from_secs(10));

    for &warmup in &[0u32, 2000, 8000] {
        group.bench_function(format!("tick_after_{warmup}_days"), |b| {
            b.iter_batched(
                || {
                    let config = WorldConfig {
                        rng_seed: 0xBEEF,
                        ..WorldConfig::default()
                    };
                    let mut engine = Engine::new(config).expect("engine");
                    engine.spawn_founder().expect("founder");
                    for _ in 0..warmup {
                        engine.tick();
                    }
                    engine
                },
                |mut engine| {
                    for _ in 0..64 {
                        engine.tick();
                    }
                },
                BatchSize::LargeInput,
            );
        });
    }
    group.finish();
}

criterion_group!(benches, bench_engine_ticks);
criterion_main!(benches);
