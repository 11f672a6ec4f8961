//! # Perception Benchmark

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use image::{Rgb, RgbImage};

use rov_lib::auto::per::{
    classify,
    rectify::Rectifier,
    PerMgr, PerParams,
};
use util::module::State;

/// Simulator sized frame with ground, sky and a rock.
fn frame() -> RgbImage {
    RgbImage::from_fn(320, 160, |x, y| {
        if (130..=190).contains(&x) && (120..=136).contains(&y) {
            Rgb([200, 160, 20])
        } else if y >= 100 {
            Rgb([200, 190, 180])
        } else {
            Rgb([40, 30, 20])
        }
    })
}

fn perception_benchmark(c: &mut Criterion) {
    let params = PerParams::default();
    let frame = frame();

    c.bench_function("Rectifier::new", |b| {
        b.iter(|| {
            Rectifier::new(
                &params.src_quad_px,
                &params.dst_quad(320, 160),
                black_box(320),
                black_box(160),
            )
            .unwrap()
        })
    });

    let rectifier =
        Rectifier::new(&params.src_quad_px, &params.dst_quad(320, 160), 320, 160).unwrap();

    c.bench_function("Rectifier::warp_rgb", |b| {
        b.iter(|| rectifier.warp_rgb(black_box(&frame)).unwrap())
    });

    c.bench_function("classify::sample_mask", |b| {
        b.iter(|| classify::sample_mask(black_box(&frame), &params.sample_thresh))
    });

    // Full perception with the cached rectifier
    let mut per_mgr = PerMgr::new(params.clone());
    per_mgr.proc(&frame).unwrap();

    c.bench_function("PerMgr::proc", |b| {
        b.iter(|| per_mgr.proc(black_box(&frame)).unwrap())
    });
}

criterion_group!(benches, perception_benchmark);
criterion_main!(benches);
