//! Benchmark for region encode/decode and tile lookups.
//!
//! Run with: cargo bench --package strata_core --bench codec_benchmark

use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use strata_core::{
    Coordinate, EmptyGenerator, Region, RegionCodec, Tile, TileEntry, TileId, TileRegistry, World,
    WorldId,
};
use strata_shared::{REGION_SIZE, REGION_VOLUME};

fn registry() -> (TileRegistry, TileId, TileId) {
    let registry = TileRegistry::new();
    let stone = registry.register(TileEntry::new("base", "stone")).unwrap();
    let dirt = registry.register(TileEntry::new("base", "dirt")).unwrap();
    (registry, stone, dirt)
}

/// Layered terrain: stone, a dirt band, then air, with scattered damage.
fn layered_region(stone: TileId, dirt: TileId) -> Region {
    let mut region = Region::new(Coordinate::ZERO, WorldId(0));
    for z in 0..REGION_SIZE {
        for x in 0..REGION_SIZE {
            for y in 0..REGION_SIZE / 2 {
                let id = if y + 3 >= REGION_SIZE / 2 { dirt } else { stone };
                let damage = if (x * 31 + z * 17 + y) % 97 == 0 { 3 } else { 0 };
                *region.tile_mut(x, y, z) = Tile::new(id).with_damage(damage);
            }
        }
    }
    region
}

/// Worst case: every slot differs from its predecessor.
fn noisy_region(stone: TileId, dirt: TileId) -> Region {
    let mut region = Region::new(Coordinate::ZERO, WorldId(0));
    for (i, tile) in region.tiles_mut().iter_mut().enumerate() {
        let id = if i % 2 == 0 { stone } else { dirt };
        *tile = Tile::new(id).with_damage(i as i64);
    }
    region
}

fn benchmark_encode(c: &mut Criterion) {
    let (_, stone, dirt) = registry();
    let empty = Region::new(Coordinate::ZERO, WorldId(0));
    let layered = layered_region(stone, dirt);
    let noisy = noisy_region(stone, dirt);

    let mut group = c.benchmark_group("region_encode");
    group.throughput(Throughput::Elements(REGION_VOLUME as u64));
    group.bench_function("empty", |b| b.iter(|| black_box(RegionCodec::encode(&empty))));
    group.bench_function("layered", |b| b.iter(|| black_box(RegionCodec::encode(&layered))));
    group.bench_function("noisy", |b| b.iter(|| black_box(RegionCodec::encode(&noisy))));
    group.finish();
}

fn benchmark_decode(c: &mut Criterion) {
    let (registry, stone, dirt) = registry();
    let layered = RegionCodec::encode(&layered_region(stone, dirt));
    let noisy = RegionCodec::encode(&noisy_region(stone, dirt));

    let mut group = c.benchmark_group("region_decode");
    group.throughput(Throughput::Elements(REGION_VOLUME as u64));
    group.bench_function("layered", |b| {
        b.iter(|| black_box(RegionCodec::decode(&layered, &registry, WorldId(0)).unwrap()));
    });
    group.bench_function("noisy", |b| {
        b.iter(|| black_box(RegionCodec::decode(&noisy, &registry, WorldId(0)).unwrap()));
    });
    group.finish();
}

fn benchmark_get_tile(c: &mut Criterion) {
    let world = World::authoritative(WorldId(0), Arc::new(TileRegistry::new()));
    world.set_generator(Arc::new(EmptyGenerator));
    for x in -2..2 {
        for z in -2..2 {
            world.load_region(Coordinate::new(x * 32, 0, z * 32)).unwrap();
        }
    }

    c.bench_function("world_get_loaded_tile", |b| {
        let mut n = 0i32;
        b.iter(|| {
            n = n.wrapping_add(7);
            let at = Coordinate::new(n.rem_euclid(128) - 64, n.rem_euclid(32), (n / 3).rem_euclid(128) - 64);
            black_box(world.get_loaded_tile(at))
        });
    });

    c.bench_function("world_neighbor_tiles", |b| {
        b.iter(|| black_box(world.get_loaded_neighbor_tiles(black_box(Coordinate::new(31, 5, 31)))));
    });
}

criterion_group!(benches, benchmark_encode, benchmark_decode, benchmark_get_tile);
criterion_main!(benches);
