use criterion::{black_box, criterion_group, criterion_main, Criterion};

use deepcrawl::dungeon::MoveDirection;
use deepcrawl::{Dungeon, DungeonConfig};
use glam::Vec3;

fn bench_generate(c: &mut Criterion) {
    let config = DungeonConfig::default();
    let mut seed = 0u64;
    c.bench_function("generate_default", |b| {
        b.iter(|| {
            seed += 1;
            black_box(Dungeon::from_seed(&config, seed).ok())
        })
    });
}

fn bench_can_move(c: &mut Criterion) {
    let config = DungeonConfig::default();
    let Ok(mut dungeon) = Dungeon::from_seed(&config, 7) else {
        return;
    };
    let spawn = dungeon.spawn_position();
    let look = spawn + Vec3::new(0.0, 0.0, 1.0);
    c.bench_function("can_move", |b| {
        b.iter(|| black_box(dungeon.can_move(look, spawn, MoveDirection::Forward)))
    });
}

criterion_group!(benches, bench_generate, bench_can_move);
criterion_main!(benches);
