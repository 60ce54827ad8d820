use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use glam::Vec3;
use trackside::{Aabb, Category, CollisionWorld, Node, SceneGraph, WorldConfig};

// --- Helper for building a grid of cars between walls ---
fn build_world(num_bodies: usize, num_walls: usize) -> CollisionWorld {
    let mut graph = SceneGraph::new();
    let root = graph.root();
    let half = Aabb::from_half_extents(Vec3::splat(0.5)).unwrap();

    for i in 0..num_bodies {
        let mut car = Node::new(format!("car_{i}"))
            .with_category(Category::free())
            .with_box(half)
            .with_translation(Vec3::new((i % 16) as f32 * 1.5, 0.0, (i / 16) as f32 * 1.5));
        car.velocity = Vec3::new(if i % 2 == 0 { 3.0 } else { -3.0 }, 0.0, 1.0);
        graph.spawn(root, car).unwrap();
    }

    for i in 0..num_walls {
        let wall = Node::new(format!("wall_{i}"))
            .with_category(Category::Obstacle)
            .with_box(Aabb::new(Vec3::new(-0.5, -1.0, -20.0), Vec3::new(0.5, 1.0, 20.0)).unwrap())
            .with_translation(Vec3::new(i as f32 * 6.0 - 3.0, 0.0, 0.0));
        graph.spawn(root, wall).unwrap();
    }

    CollisionWorld::new(graph, WorldConfig::default()).unwrap()
}

fn run_ticks(world: &mut CollisionWorld, steps: usize) {
    let dt = 1.0 / 60.0;
    for _ in 0..steps {
        world.update(black_box(dt));
    }
}

// Free bodies resolved against each other and a handful of walls
fn bench_free_bodies(c: &mut Criterion) {
    let mut group = c.benchmark_group("free_bodies");

    for num_bodies in [10, 50, 200].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(num_bodies), num_bodies, |b, &n| {
            b.iter(|| {
                let mut world = build_world(black_box(n), 4);
                run_ticks(&mut world, 30);
            });
        });
    }
    group.finish();
}

// A single tick on a pre-built world, excluding setup
fn bench_single_tick(c: &mut Criterion) {
    let mut world = build_world(100, 8);
    c.bench_function("single_tick_100", |b| {
        b.iter(|| world.update(black_box(1.0 / 60.0)));
    });
}

criterion_group!(benches, bench_free_bodies, bench_single_tick);
criterion_main!(benches);
