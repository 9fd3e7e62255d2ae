use std::time::Duration;

use criterion::{criterion_group, criterion_main, Criterion};

use mandeltile_core::{Complex, ViewState};
use mandeltile_render::{ColorScaling, IterationGrid, MemorySink, Palette, TileGrid, TileJob};

fn bench_tile_compute(c: &mut Criterion) {
    let job = TileJob {
        origin: Complex::new(-2.5, -1.5),
        pixel_size: 4.0 / 800.0,
        max_iterations: 1024,
    };

    c.bench_function("tile_200x200_home", |b| {
        b.iter(|| IterationGrid::compute(200, 200, &job));
    });

    let deep = TileJob {
        origin: Complex::new(-0.7453, 0.1127),
        pixel_size: 1e-6,
        max_iterations: 4096,
    };
    c.bench_function("tile_200x200_seahorse_4096iter", |b| {
        b.iter(|| IterationGrid::compute(200, 200, &deep));
    });
}

fn bench_grid_cycle(c: &mut Criterion) {
    let palette = Palette::shared();
    let mut grid = TileGrid::new(640, 480, 200, |_, r| MemorySink::new(r.width, r.height)).unwrap();
    let view = ViewState::HOME;

    c.bench_function("grid_640x480_recompute_and_poll", |b| {
        b.iter(|| {
            grid.recompute_all(&view, 256);
            while !grid.poll_and_apply_completed(&palette, ColorScaling::Global) {
                std::thread::sleep(Duration::from_micros(50));
            }
        });
    });
}

fn bench_palette_paint(c: &mut Criterion) {
    let palette = Palette::shared();
    let scale = palette.scale(0, 1024);
    let counts: Vec<u32> = (0..200 * 200).map(|i| i % 1025).collect();

    c.bench_function("palette_lookup_200x200", |b| {
        b.iter(|| counts.iter().map(|&n| scale.color(n)[0] as u64).sum::<u64>());
    });
}

criterion_group!(
    benches,
    bench_tile_compute,
    bench_grid_cycle,
    bench_palette_paint
);
criterion_main!(benches);
