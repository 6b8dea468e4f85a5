//! Benchmarks for the book-autosplit analysis stages
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use book_autosplit::{
    BorderTrimmer, DeskewOptions, PageImage, PageSplitter, ProjectionDeskewer, Rect,
    SplitOptions, SpineLocator, SpineSide, TrimOptions, WHITE,
};

/// White spread with a dark spine and black scanner borders
fn synthetic_spread(width: u32, height: u32) -> PageImage {
    let mut img = PageImage::filled(width, height, WHITE);
    let border = height / 20;
    let black = [0u16; 3];
    img.write_pixel_block(
        Rect::new(0, 0, width, border),
        &vec![black; (width * border) as usize],
    )
    .unwrap();
    img.write_pixel_block(
        Rect::new(0, height - border, width, border),
        &vec![black; (width * border) as usize],
    )
    .unwrap();
    img.write_pixel_block(
        Rect::new(width / 2 + 7, 0, 1, height),
        &vec![black; height as usize],
    )
    .unwrap();
    img
}

fn bench_spine_locate(c: &mut Criterion) {
    let mut group = c.benchmark_group("spine_locate");

    for &(width, height) in &[(1200u32, 900u32), (2400, 1800)] {
        let img = synthetic_spread(width, height);
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{}x{}", width, height)),
            &img,
            |b, img| b.iter(|| SpineLocator::locate(black_box(img), SpineSide::Center)),
        );
    }

    group.finish();
}

fn bench_border_detect(c: &mut Criterion) {
    let img = synthetic_spread(2400, 1800);
    let options = TrimOptions::default();

    c.bench_function("border_detect", |b| {
        b.iter(|| BorderTrimmer::detect(black_box(&img), black_box(&options)))
    });
}

fn bench_split(c: &mut Criterion) {
    let img = synthetic_spread(2400, 1800);
    let options = SplitOptions::default();

    c.bench_function("split_at_spine", |b| {
        b.iter(|| PageSplitter::split(black_box(img.clone()), 1207, &options))
    });
}

fn bench_skew_detect(c: &mut Criterion) {
    let img = synthetic_spread(1200, 900);
    let options = DeskewOptions::fast();

    c.bench_function("skew_detect_fast", |b| {
        b.iter(|| ProjectionDeskewer::detect_skew(black_box(&img), &options))
    });
}

criterion_group!(
    benches,
    bench_spine_locate,
    bench_border_detect,
    bench_split,
    bench_skew_detect
);
criterion_main!(benches);
