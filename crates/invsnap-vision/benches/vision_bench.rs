//! invsnap-vision 성능 벤치마크
//!
//! 실행: cargo bench -p invsnap-vision
//!
//! 벤치마크 대상:
//! - 타일 분할 (tiler::split)
//! - PNG 인코딩 (encode_png)

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use image::{Rgba, RgbaImage};
use invsnap_vision::{encoder, tiler};

/// 테스트용 패턴 이미지 생성
fn create_test_image(width: u32, height: u32, seed: u8) -> RgbaImage {
    RgbaImage::from_fn(width, height, |x, y| {
        let r = (x as u8).wrapping_add(seed).wrapping_mul(17);
        let g = (y as u8).wrapping_add(seed).wrapping_mul(31);
        let b = (x as u8).wrapping_add(y as u8).wrapping_add(seed);
        Rgba([r, g, b, 255])
    })
}

/// 타일 분할 벤치마크
fn bench_split(c: &mut Criterion) {
    let mut group = c.benchmark_group("tiler_split");

    let resolutions = [(1360, 300), (1920, 1080), (2560, 1440)];
    for (width, height) in resolutions {
        group.throughput(Throughput::Elements((width * height) as u64));
        let image = create_test_image(width, height, 42);

        group.bench_with_input(
            BenchmarkId::new("2x4", format!("{width}x{height}")),
            &image,
            |b, img| b.iter(|| tiler::split(black_box(img), 2, 4)),
        );
    }

    group.finish();
}

/// PNG 인코딩 벤치마크 (타일 크기)
fn bench_png(c: &mut Criterion) {
    let mut group = c.benchmark_group("png_encoding");

    for (width, height) in [(340, 150), (640, 360)] {
        let image = create_test_image(width, height, 7);
        group.bench_with_input(
            BenchmarkId::new("encode_png_base64", format!("{width}x{height}")),
            &image,
            |b, img| b.iter(|| encoder::encode_png_base64(black_box(img))),
        );
    }

    group.finish();
}

criterion_group!(benches, bench_split, bench_png);
criterion_main!(benches);
