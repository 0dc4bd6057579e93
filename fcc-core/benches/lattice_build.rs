//! Benchmark for lattice construction and trajectory ticking.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use fcc_core::{LatticeConfig, Lattice, LaunchCommand, Simulator, Vec3};

fn bench_lattice_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("lattice_build");

    for n in [5usize, 10, 20] {
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            b.iter(|| Lattice::build(black_box(LatticeConfig::new(2.0, n))))
        });
    }

    group.finish();
}

fn bench_trajectory(c: &mut Criterion) {
    let lattice = Lattice::build(LatticeConfig::default()).unwrap();
    let command = LaunchCommand {
        position: lattice.corner(),
        direction: Vec3::new(1.0, 1.0, 1.0),
        normalize: true,
        speed: 0.1,
    };

    c.bench_function("trajectory_until_exit", |b| {
        b.iter(|| {
            let mut sim = Simulator::new(lattice.corner(), lattice.center(), lattice.exit_radius());
            sim.launch(black_box(&command)).unwrap();
            while sim.is_active() {
                black_box(sim.tick());
            }
            sim.trail().len()
        })
    });
}

criterion_group!(benches, bench_lattice_build, bench_trajectory);
criterion_main!(benches);
