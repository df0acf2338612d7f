//! Benchmarks for the per-tick hot paths.
//!
//! Run with: `cargo bench`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use twister::prelude::*;
use twister::{wind_at, Particle, Vortex};

fn bench_particle_advance(c: &mut Criterion) {
    let params = VortexParams::default();
    let mut rng = SpawnRng::seeded(1);
    let mut particles: Vec<Particle> = (0..10_000).map(|i| Particle::spawn(i, 10_000, &params, &mut rng)).collect();

    c.bench_function("particle_advance_10k", |b| {
        b.iter(|| {
            for p in particles.iter_mut() {
                black_box(p.advance(1.0 / 60.0, &params, &mut rng));
            }
        })
    });
}

fn bench_wind(c: &mut Criterion) {
    let mut group = c.benchmark_group("wind_at");
    let mut rng = SpawnRng::seeded(2);

    for count in [1usize, 4, 16] {
        let vortices: Vec<Vortex> = (0..count)
            .map(|i| {
                let params = VortexParams::default()
                    .with_position(DVec3::new(5.0 + 2.0 * i as f64, 0.0, 20.0))
                    .with_particle_count(1);
                Vortex::new(VortexId(i as u64), params, &mut rng).unwrap()
            })
            .collect();
        group.bench_with_input(BenchmarkId::from_parameter(count), &vortices, |b, v| {
            b.iter(|| black_box(wind_at(black_box(DVec2::new(21.0, 19.5)), v)))
        });
    }

    group.finish();
}

fn bench_grid_update(c: &mut Criterion) {
    let mut rng = SpawnRng::seeded(3);
    let vortices: Vec<Vortex> = (0..4)
        .map(|i| {
            let params = VortexParams::default()
                .with_position(DVec3::new(8.0 + 9.0 * i as f64, 0.0, 22.0))
                .with_particle_count(1);
            Vortex::new(VortexId(i), params, &mut rng).unwrap()
        })
        .collect();
    let mut grid = AtmosphericGrid::default();

    c.bench_function("grid_update_4_vortices", |b| b.iter(|| grid.update(black_box(&vortices))));
}

fn bench_simulation_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("simulation_step");

    for particles in [1_000usize, 10_000] {
        let mut sim = Simulation::new().with_seed(4);
        sim.spawn_vortex(
            VortexParams::default()
                .with_position(DVec3::new(12.0, 0.0, 22.0))
                .with_particle_count(particles),
            MovementPolicy::PressureGradient,
        )
        .unwrap();
        sim.spawn_vortex(
            VortexParams::default()
                .with_position(DVec3::new(34.0, 0.0, 22.0))
                .with_particle_count(particles),
            MovementPolicy::Manual,
        )
        .unwrap();
        let mut frame = InstanceBuffer::new();

        group.bench_function(BenchmarkId::from_parameter(particles), |b| {
            b.iter(|| {
                frame.clear();
                black_box(sim.step(1.0 / 60.0, &mut frame));
            })
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_particle_advance,
    bench_wind,
    bench_grid_update,
    bench_simulation_step
);
criterion_main!(benches);
