//! Codec Benchmarks
//!
//! Decode and encode throughput for synthetic tiles

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use glam::Vec2;
use maptile_core::{Theme, TileGeometry, LINE_LAYER_COUNT};

/// A tile with `size x size` grid cells per mesh layer and `size` lines per line layer
fn synthetic_tile(size: u16) -> TileGeometry {
    let mut tile = TileGeometry::new(Theme::Earth);
    let step = 1000.0 / size as f32;

    let mut vertices = Vec::new();
    let mut triangles = Vec::new();
    for row in 0..=size {
        for col in 0..=size {
            vertices.push(Vec2::new(col as f32 * step - 500.0, row as f32 * step - 500.0));
        }
    }
    let stride = size + 1;
    for row in 0..size {
        for col in 0..size {
            let i = row * stride + col;
            triangles.push([i, i + 1, i + stride]);
            triangles.push([i + 1, i + stride + 1, i + stride]);
        }
    }

    for key in Theme::Earth.memory_order() {
        tile.add_geometry(key, &vertices, &triangles).unwrap();
    }

    for layer in 0..LINE_LAYER_COUNT {
        for i in 0..size {
            let y = i as f32 * step - 500.0;
            tile.add_line(layer, Vec2::new(-500.0, y), Vec2::new(500.0, y), 4.0)
                .unwrap();
        }
    }

    tile
}

fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("tile_decode");

    for size in [8u16, 32, 64].iter() {
        let bytes = synthetic_tile(*size).encode().unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(size), &bytes, |b, bytes| {
            b.iter(|| black_box(TileGeometry::decode(bytes, Theme::Earth).unwrap()));
        });
    }

    group.finish();
}

fn bench_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("tile_encode");

    for size in [8u16, 32, 64].iter() {
        let tile = synthetic_tile(*size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &tile, |b, tile| {
            b.iter(|| black_box(tile.encode().unwrap()));
        });
    }

    group.finish();
}

fn bench_add_line(c: &mut Criterion) {
    let mut group = c.benchmark_group("add_line");

    group.bench_function("lines_1000", |b| {
        b.iter_batched(
            || TileGeometry::new(Theme::Earth),
            |mut tile| {
                for i in 0..1000 {
                    let x = i as f32 * 0.5;
                    tile.add_line(i % LINE_LAYER_COUNT, Vec2::new(x, 0.0), Vec2::new(x, 100.0), 4.0)
                        .unwrap();
                }
                tile
            },
            criterion::BatchSize::SmallInput,
        );
    });

    group.finish();
}

criterion_group!(benches, bench_decode, bench_encode, bench_add_line);

criterion_main!(benches);
