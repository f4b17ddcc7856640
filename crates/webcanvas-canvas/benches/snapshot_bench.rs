// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Criterion benchmarks for the snapshot pipeline in the webcanvas-canvas crate.
// Covers the two costs paid on the UI thread per `canvas.snapshot`: the
// downscale and the best-compression PNG + base64 encode.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use image::{Rgba, RgbaImage};

use webcanvas_canvas::Snapshot;
use webcanvas_core::config::SnapshotFilter;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// A phone-sized frame with a coloured header band, so PNG filtering has
/// something other than a flat fill to chew on.
fn phone_frame() -> RgbaImage {
    let (width, height) = (390u32, 844u32);
    let mut img = RgbaImage::from_pixel(width, height, Rgba([250, 250, 250, 255]));
    for y in 0..120 {
        for x in 0..width {
            img.put_pixel(x, y, Rgba([(x % 256) as u8, 90, 200, 255]));
        }
    }
    img
}

// ---------------------------------------------------------------------------
// Benchmarks
// ---------------------------------------------------------------------------

fn bench_fit_width(c: &mut Criterion) {
    let frame = phone_frame();
    c.bench_function("fit_width 390x844 -> 200 (triangle)", |b| {
        b.iter(|| {
            Snapshot::from_rgba(black_box(frame.clone()))
                .fit_width(Some(200), SnapshotFilter::Triangle)
        });
    });
}

fn bench_base64_png(c: &mut Criterion) {
    let snapshot = Snapshot::from_rgba(phone_frame());
    c.bench_function("to_base64_png 390x844", |b| {
        b.iter(|| black_box(&snapshot).to_base64_png().expect("encode"));
    });
}

criterion_group!(benches, bench_fit_width, bench_base64_png);
criterion_main!(benches);
