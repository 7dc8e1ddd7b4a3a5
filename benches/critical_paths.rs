//! Criterion benchmarks for iconsmith critical paths
//!
//! - Color: text decoding
//! - Fill: flood fill over open and maze-like grids
//! - Raster: grid to bitmap and back, PNG encoding
//! - History: snapshot push/undo churn
//! - Transforms: the heavier whole-image operations

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use iconsmith::color::{parse_color, Pixel};
use iconsmith::fill::flood_fill;
use iconsmith::grid::PixelGrid;
use iconsmith::history::History;
use iconsmith::raster::{self, Resample};
use iconsmith::transforms::{self, Transform};

// =============================================================================
// Test Data Generators
// =============================================================================

/// Grid with a repeating 16-color pattern.
fn make_pattern_grid(size: usize) -> PixelGrid {
    let mut grid = PixelGrid::new(size);
    for y in 0..size {
        for x in 0..size {
            let i = ((x + y * 3) % 16) as u8;
            let _ = grid.set(x, y, Pixel::Opaque(i * 16, i * 8, 255 - i * 16));
        }
    }
    grid
}

/// White grid with black walls on every other column, open at alternating
/// ends, forming a single serpentine corridor.
fn make_maze_grid(size: usize) -> PixelGrid {
    let mut grid = PixelGrid::new(size);
    for x in (1..size).step_by(2) {
        let gap = if (x / 2) % 2 == 0 { size - 1 } else { 0 };
        for y in 0..size {
            if y != gap {
                let _ = grid.set(x, y, Pixel::BLACK);
            }
        }
    }
    grid
}

// =============================================================================
// Benchmarks
// =============================================================================

fn bench_color(c: &mut Criterion) {
    let mut group = c.benchmark_group("color");

    group.bench_function("parse_hex_6", |b| b.iter(|| parse_color(black_box("#FF0000"))));
    group.bench_function("parse_hex_8", |b| b.iter(|| parse_color(black_box("#FF000080"))));
    group.bench_function("parse_rgba", |b| {
        b.iter(|| parse_color(black_box("rgba(255, 0, 0, 0.5)")))
    });
    group.bench_function("parse_list", |b| b.iter(|| parse_color(black_box("255 128 0 200"))));

    group.finish();
}

fn bench_fill(c: &mut Criterion) {
    let mut group = c.benchmark_group("fill");

    for size in [16, 64, 256].iter() {
        let open = PixelGrid::new(*size);
        let maze = make_maze_grid(*size);
        group.throughput(Throughput::Elements((*size * *size) as u64));

        group.bench_with_input(BenchmarkId::new("open", size), &open, |b, grid| {
            b.iter(|| {
                let mut g = grid.clone();
                flood_fill(&mut g, (0, 0), Pixel::WHITE, Pixel::Transparent, 0)
            })
        });
        group.bench_with_input(BenchmarkId::new("maze", size), &maze, |b, grid| {
            b.iter(|| {
                let mut g = grid.clone();
                flood_fill(&mut g, (0, 0), Pixel::WHITE, Pixel::Opaque(255, 0, 0), 32)
            })
        });
    }

    group.finish();
}

fn bench_raster(c: &mut Criterion) {
    let mut group = c.benchmark_group("raster");

    for size in [16, 32, 64].iter() {
        let grid = make_pattern_grid(*size);
        let image = raster::to_image(&grid);
        group.throughput(Throughput::Elements((*size * *size) as u64));

        group.bench_with_input(BenchmarkId::new("to_image", size), &grid, |b, grid| {
            b.iter(|| raster::to_image(black_box(grid)))
        });
        group.bench_with_input(BenchmarkId::new("from_image", size), &image, |b, image| {
            b.iter(|| raster::from_image(black_box(image), *size, Resample::Lanczos))
        });
        group.bench_with_input(BenchmarkId::new("encode_png", size), &image, |b, image| {
            b.iter(|| raster::encode_png(black_box(image)))
        });
    }

    let photo = raster::to_image(&make_pattern_grid(512));
    group.bench_function("downsample_512_to_16", |b| {
        b.iter(|| raster::from_image(black_box(&photo), 16, Resample::Lanczos))
    });

    group.finish();
}

fn bench_history(c: &mut Criterion) {
    let mut group = c.benchmark_group("history");
    let grid = make_pattern_grid(32);

    group.bench_function("push_100_capped", |b| {
        b.iter(|| {
            let mut history = History::default();
            for _ in 0..100 {
                history.push_undo(black_box(&grid));
            }
            history
        })
    });

    group.bench_function("undo_redo_cycle", |b| {
        let mut history = History::default();
        for _ in 0..50 {
            history.push_undo(&grid);
        }
        b.iter(|| {
            let previous = history.undo(&grid);
            let next = history.redo(&grid);
            (previous, next)
        })
    });

    group.finish();
}

fn bench_transforms(c: &mut Criterion) {
    let mut group = c.benchmark_group("transforms");
    let grid = make_pattern_grid(32);

    for (name, transform) in [
        ("quantize_8", Transform::Quantize { colors: 8 }),
        ("blur", Transform::Blur { sigma: 1.0 }),
        ("hue_90", Transform::HueShift { degrees: 90 }),
        ("rotate_90", Transform::Rotate { degrees: 90 }),
    ] {
        group.bench_function(name, |b| {
            b.iter(|| transforms::apply(black_box(&grid), &transform, Resample::Nearest))
        });
    }

    group.finish();
}

// =============================================================================
// Criterion Configuration
// =============================================================================

criterion_group!(benches, bench_color, bench_fill, bench_raster, bench_history, bench_transforms);

criterion_main!(benches);
