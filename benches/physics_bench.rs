use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use dem_kinematics::*;
use std::hint::black_box;

const DT: f32 = 1.0e-4;

fn prepare_world(body_count: usize, clump_size: usize) -> DemWorld {
    let config = IntegratorConfig::default().with_time_step(DT);
    let mut world = DemWorld::new(config).expect("valid config");
    let sphere = MassProperties::solid_sphere(0.01, 2600.0);
    let mut pending = Vec::with_capacity(clump_size);
    for i in 0..body_count {
        let position = Vec3::new((i % 64) as f32 * 0.021, (i / 64) as f32 * 0.021, 0.0);
        let id = world
            .add_body(Body::new(position, sphere))
            .expect("valid body");
        if clump_size > 1 {
            pending.push(id);
            if pending.len() == clump_size {
                world.create_clump(&pending).expect("valid clump");
                pending.clear();
            }
        }
    }
    world
}

fn bench_world_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("world_tick");
    for &count in &[1024usize, 8192, 32768] {
        for (label, clump_size) in [("spheres", 1usize), ("clumps4", 4)] {
            group.bench_with_input(
                BenchmarkId::new(format!("{label}/sequential"), count),
                &count,
                |b, &count| {
                    let mut world = prepare_world(count, clump_size);
                    world.set_parallel_enabled(false);
                    b.iter(|| black_box(world.tick().expect("tick")))
                },
            );
            group.bench_with_input(
                BenchmarkId::new(format!("{label}/parallel"), count),
                &count,
                |b, &count| {
                    let mut world = prepare_world(count, clump_size);
                    world.set_parallel_enabled(true);
                    b.iter(|| black_box(world.tick().expect("tick")));
                    world.last_profile().report();
                },
            );
        }
    }
    group.finish();
}

fn bench_cundall_damping(c: &mut Criterion) {
    let damper = CundallDamper::new(0.2).expect("valid damping");
    let count = 4096;
    let loads: Vec<Vec3> = (0..count)
        .map(|i| Vec3::new((i as f32).sin(), (i as f32).cos(), 0.5))
        .collect();
    let velocities: Vec<Vec3> = loads.iter().map(|l| *l * -0.3).collect();

    c.bench_function("cundall_damp_4096", |b| {
        b.iter(|| {
            for (load, velocity) in loads.iter().zip(&velocities) {
                black_box(damper.damp_vector(DT, *load, *velocity, *load));
            }
        })
    });
}

criterion_group!(benches, bench_world_tick, bench_cundall_damping);
criterion_main!(benches);
