use criterion::{black_box, criterion_group, criterion_main, Criterion};

use yuvdelta::{
    delta, rle, rgb_to_yuv420, yuv420_to_rgb, DeflateCompressor, Dimensions, EntropyCompressor,
    PlanarFrame, RawFrame,
};

fn gradient_frame(dims: Dimensions, t: usize) -> RawFrame {
    let data = (0..dims.raw_len())
        .map(|i| ((i / 3 + t * 2) % 256) as u8)
        .collect();
    RawFrame::new(data, dims).unwrap()
}

fn planar_sequence(dims: Dimensions, frames: usize) -> Vec<PlanarFrame> {
    (0..frames)
        .map(|t| rgb_to_yuv420(&gradient_frame(dims, t)))
        .collect()
}

fn bench_color(c: &mut Criterion) {
    let dims = Dimensions::default();
    let frame = gradient_frame(dims, 0);

    c.bench_function("rgb_to_yuv420_384x216", |b| {
        b.iter(|| rgb_to_yuv420(black_box(&frame)));
    });

    let planar = rgb_to_yuv420(&frame);
    c.bench_function("yuv420_to_rgb_384x216", |b| {
        b.iter(|| yuv420_to_rgb(black_box(&planar)));
    });
}

fn bench_delta(c: &mut Criterion) {
    let dims = Dimensions::default();
    let planar = planar_sequence(dims, 16);

    c.bench_function("forward_delta_16f", |b| {
        b.iter(|| delta::forward_delta(black_box(planar.clone())).unwrap());
    });

    let deltas = delta::forward_delta(planar).unwrap();
    c.bench_function("inverse_delta_16f", |b| {
        b.iter(|| delta::inverse_delta(black_box(deltas.clone())).unwrap());
    });
    c.bench_function("inverse_delta_parallel4_16f", |b| {
        b.iter(|| delta::inverse_delta_parallel(black_box(deltas.clone()), 4).unwrap());
    });
}

fn bench_entropy(c: &mut Criterion) {
    let dims = Dimensions::default();
    let deltas = delta::forward_delta(planar_sequence(dims, 8)).unwrap();
    let stream: Vec<u8> = deltas.iter().flat_map(|d| d.as_bytes().to_vec()).collect();

    c.bench_function("rle_encoded_len_8f", |b| {
        b.iter(|| rle::encoded_len(black_box(&stream)));
    });

    let deflate = DeflateCompressor::default();
    c.bench_function("deflate_compress_8f", |b| {
        b.iter(|| deflate.compress(black_box(&stream)).unwrap());
    });

    let artifact = deflate.compress(&stream).unwrap();
    c.bench_function("deflate_decompress_8f", |b| {
        b.iter(|| deflate.decompress(black_box(&artifact)).unwrap());
    });
}

criterion_group!(benches, bench_color, bench_delta, bench_entropy);
criterion_main!(benches);
