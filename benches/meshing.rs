/// Benchmark suite for the face-culling mesher across terrain shapes.
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use cubecraft::{
    BlockKind, Chunk, CulledMesher, MesherConfig, TerrainGenerator, World, CHUNK_HEIGHT,
};
use glam::{IVec2, IVec3};

fn world_with_terrain() -> World {
    let generator = TerrainGenerator::new(1337);
    let mut world = World::new();
    for x in -1..=1 {
        for z in -1..=1 {
            world.insert_chunk(generator.generate_chunk(IVec2::new(x, z)));
        }
    }
    world
}

fn bench_mesh_empty_chunk(c: &mut Criterion) {
    let mut world = World::new();
    world.insert_chunk(Chunk::new(IVec2::ZERO));
    let config = MesherConfig::default();

    c.bench_function("mesh_empty_chunk", |b| {
        b.iter(|| CulledMesher::mesh_chunk(black_box(&world), IVec2::ZERO, &config));
    });
}

fn bench_mesh_solid_chunk(c: &mut Criterion) {
    let mut world = World::new();
    world.insert_chunk(Chunk::filled(IVec2::ZERO, BlockKind::Stone));
    let config = MesherConfig::default();

    c.bench_function("mesh_solid_chunk", |b| {
        b.iter(|| CulledMesher::mesh_chunk(black_box(&world), IVec2::ZERO, &config));
    });
}

fn bench_mesh_terrain_chunk(c: &mut Criterion) {
    let world = world_with_terrain();
    let config = MesherConfig::default();

    c.bench_function("mesh_terrain_chunk", |b| {
        b.iter(|| CulledMesher::mesh_chunk(black_box(&world), IVec2::ZERO, &config));
    });
}

fn bench_mesh_water_pool(c: &mut Criterion) {
    let mut world = World::new();
    world.insert_chunk(Chunk::new(IVec2::ZERO));
    for x in 0..16 {
        for z in 0..16 {
            for y in 4..8 {
                world.set_block(IVec3::new(x, y, z), BlockKind::Water);
            }
        }
    }
    let config = MesherConfig::default();

    c.bench_function("mesh_water_pool", |b| {
        b.iter(|| CulledMesher::mesh_chunk(black_box(&world), IVec2::ZERO, &config));
    });
}

fn bench_mesh_checkered_worst_case(c: &mut Criterion) {
    // Alternating solid/air maximises emitted faces.
    let mut world = World::new();
    let mut chunk = Chunk::new(IVec2::ZERO);
    for y in 0..CHUNK_HEIGHT {
        for z in 0..16 {
            for x in 0..16 {
                if (x + y + z) % 2 == 0 {
                    chunk.set_block(x, y, z, BlockKind::Stone);
                }
            }
        }
    }
    world.insert_chunk(chunk);
    let config = MesherConfig::default();

    c.bench_function("mesh_checkered_worst_case", |b| {
        b.iter(|| CulledMesher::mesh_chunk(black_box(&world), IVec2::ZERO, &config));
    });
}

criterion_group!(
    benches,
    bench_mesh_empty_chunk,
    bench_mesh_solid_chunk,
    bench_mesh_terrain_chunk,
    bench_mesh_water_pool,
    bench_mesh_checkered_worst_case
);
criterion_main!(benches);
