use basin_allocator::core::basin::Basin;
use basin_allocator::network::topology::NetworkTopology;
use basin_allocator::optimization::engine::{AllocationEngine, RunParameters};
use basin_allocator::optimization::model::AllocationModel;
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn bench_topology_build(c: &mut Criterion) {
    let basin = Basin::chao_viru();

    c.bench_function("topology_build", |b| {
        b.iter(|| NetworkTopology::build(black_box(&basin)))
    });
}

fn bench_model_build(c: &mut Criterion) {
    let basin = Basin::chao_viru();
    let topology = NetworkTopology::build(&basin);
    let params = RunParameters::default();
    let scenario = basin.scenario("S1").unwrap();

    c.bench_function("model_build", |b| {
        b.iter(|| {
            AllocationModel::build(
                black_box(&basin),
                black_box(&topology),
                black_box(scenario),
                black_box(&params),
            )
        })
    });
}

fn bench_full_run_s1(c: &mut Criterion) {
    let basin = Basin::chao_viru();
    let params = RunParameters::default();

    c.bench_function("full_run_s1", |b| {
        b.iter(|| AllocationEngine::run(black_box(&basin), black_box(&params)))
    });
}

fn bench_full_run_s2(c: &mut Criterion) {
    let basin = Basin::chao_viru();
    let params = RunParameters {
        scenario: "S2".to_string(),
        ..Default::default()
    };

    c.bench_function("full_run_s2", |b| {
        b.iter(|| AllocationEngine::run(black_box(&basin), black_box(&params)))
    });
}

criterion_group!(
    benches,
    bench_topology_build,
    bench_model_build,
    bench_full_run_s1,
    bench_full_run_s2
);
criterion_main!(benches);
