//! Basic round trip through the yuvdelta pipeline.
//!
//! ```sh
//! cargo run --example basic_roundtrip
//! ```

#![allow(clippy::cast_possible_truncation)]

use std::io::Cursor;

use yuvdelta::{Dimensions, Pipeline, PipelineConfig, PipelineOutputs};

fn main() {
    let dims = Dimensions::new(64, 64).unwrap();
    let frames = 8usize;

    // Synthetic gradient panning one pixel per frame (RGB)
    let mut rgb = Vec::with_capacity(dims.raw_len() * frames);
    for t in 0..frames {
        for row in 0..dims.height() as usize {
            for col in 0..dims.width() as usize {
                let v = ((col + t) * 4 + row) as u8;
                rgb.extend_from_slice(&[v, v.wrapping_add(30), v.wrapping_add(60)]);
            }
        }
    }

    let pipeline = Pipeline::new(PipelineConfig {
        workers: 2,
        ..PipelineConfig::new(dims)
    });

    let mut planar = Vec::new();
    let mut reconstructed = Vec::new();
    let mut outputs = PipelineOutputs {
        planar: &mut planar,
        decoded_planar: None,
        reconstructed: &mut reconstructed,
    };
    let report = pipeline.run(Cursor::new(&rgb), &mut outputs).unwrap();

    println!("Frames:     {}", report.frames);
    println!("Raw:        {} bytes", report.sizes.raw);
    println!(
        "YUV420p:    {} bytes ({:.2}%)",
        report.sizes.planar,
        report.sizes.percent_of_raw(report.sizes.planar)
    );
    println!(
        "RLE:        {} bytes ({:.2}%)",
        report.sizes.rle,
        report.sizes.percent_of_raw(report.sizes.rle)
    );
    println!(
        "Compressed: {} bytes ({:.2}%)",
        report.sizes.compressed,
        report.sizes.percent_of_raw(report.sizes.compressed)
    );
    println!("Ratio:      {:.2}x", report.sizes.compression_ratio());
    println!("PSNR:       {:.2} dB", report.psnr);
}
