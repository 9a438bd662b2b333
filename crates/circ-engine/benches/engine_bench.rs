use circ_core::{HousingVolumes, PolicyInput, PolicyLever};
use circ_engine::SimulationEngine;
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn bench_engine(c: &mut Criterion) {
    let engine = SimulationEngine::default();
    let volumes = HousingVolumes::new(25_000, 1_500);
    let a = PolicyInput::new(0.3, 0.2, 0.3);
    let b = PolicyInput::new(0.6, 0.3, 0.5);

    c.bench_function("simulate", |bch| {
        bch.iter(|| black_box(engine.simulate(black_box(&a), black_box(volumes))))
    });
    c.bench_function("compare", |bch| {
        bch.iter(|| black_box(circ_engine::compare(&engine, &a, &b, black_box(volumes))))
    });
    c.bench_function("sweep 101 points", |bch| {
        bch.iter(|| {
            let _ = black_box(circ_engine::sweep(
                &engine,
                &a,
                volumes,
                PolicyLever::ConcreteRecycle,
                101,
            ));
        })
    });
}

criterion_group!(benches, bench_engine);
criterion_main!(benches);
