//! CLI for yuvdelta
//!
//! ```bash
//! yuvdelta run input.rgb24 -W 384 -H 216
//! yuvdelta encode input.rgb24 -W 384 -H 216 -o video.deflate
//! yuvdelta decode video.deflate -W 384 -H 216 -o decoded.rgb24
//! ```

use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::process;

use clap::{Args, Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use yuvdelta::entropy::BEST_LEVEL;
use yuvdelta::{
    Dimensions, Pipeline, PipelineConfig, PipelineOutputs, DEFAULT_FRAME_RATE, DEFAULT_HEIGHT,
    DEFAULT_WIDTH,
};

#[derive(Parser)]
#[command(
    name = "yuvdelta",
    version,
    about = "yuvdelta: YUV 4:2:0 + temporal delta + DEFLATE raw video codec"
)]
struct Cli {
    /// Log stage details (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct VideoArgs {
    /// Frame width in pixels (even)
    #[arg(short = 'W', long, default_value_t = DEFAULT_WIDTH)]
    width: u32,
    /// Frame height in pixels (even)
    #[arg(short = 'H', long, default_value_t = DEFAULT_HEIGHT)]
    height: u32,
    /// Worker threads for color conversion and delta reconstruction
    #[arg(long, default_value_t = 1)]
    workers: usize,
}

#[derive(Subcommand)]
enum Commands {
    /// Encode and decode a raw RGB24 video, writing every intermediate
    Run {
        /// Input file (raw interleaved RGB24), or - for stdin
        input: String,
        #[command(flatten)]
        video: VideoArgs,
        /// DEFLATE level (0-9)
        #[arg(short, long, default_value_t = 9, value_parser = clap::value_parser!(u32).range(0..=9))]
        level: u32,
        /// Playback frame rate for the ffplay hint
        #[arg(long, default_value_t = DEFAULT_FRAME_RATE)]
        frame_rate: u32,
        /// Planar YUV 4:2:0 output
        #[arg(long, default_value = "encoded.yuv")]
        planar: String,
        /// Planar frames rebuilt from the compressed stream
        #[arg(long)]
        decoded_planar: Option<String>,
        /// Reconstructed RGB24 output
        #[arg(short, long, default_value = "decoded.rgb24")]
        output: String,
    },
    /// Encode raw RGB24 frames into a compressed artifact
    Encode {
        /// Input file (raw interleaved RGB24), or - for stdin
        input: String,
        #[command(flatten)]
        video: VideoArgs,
        /// DEFLATE level (0-9)
        #[arg(short, long, default_value_t = 9, value_parser = clap::value_parser!(u32).range(0..=9))]
        level: u32,
        /// Output artifact
        #[arg(short, long)]
        output: String,
    },
    /// Decode a compressed artifact back to raw RGB24
    Decode {
        /// Input artifact
        input: String,
        #[command(flatten)]
        video: VideoArgs,
        /// Output file (raw RGB24)
        #[arg(short, long)]
        output: String,
    },
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "info,yuvdelta=debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Run {
            input,
            video,
            level,
            frame_rate,
            planar,
            decoded_planar,
            output,
        } => cmd_run(
            &input,
            &video,
            level,
            frame_rate,
            &planar,
            decoded_planar.as_deref(),
            &output,
        ),
        Commands::Encode {
            input,
            video,
            level,
            output,
        } => cmd_encode(&input, &video, level, &output),
        Commands::Decode {
            input,
            video,
            output,
        } => cmd_decode(&input, &video, &output),
    };

    if let Err(e) = result {
        error!("{e}");
        process::exit(1);
    }
}

fn video_config(video: &VideoArgs, level: u32) -> Result<PipelineConfig, String> {
    let dimensions = Dimensions::new(video.width, video.height).map_err(|e| e.to_string())?;
    Ok(PipelineConfig {
        dimensions,
        compression_level: level,
        workers: video.workers,
        ..PipelineConfig::default()
    })
}

fn open_input(path: &str) -> Result<Box<dyn Read>, String> {
    if path == "-" {
        return Ok(Box::new(io::stdin().lock()));
    }
    let file = File::open(path).map_err(|e| format!("open {path}: {e}"))?;
    Ok(Box::new(BufReader::new(file)))
}

fn create_output(path: &str) -> Result<BufWriter<File>, String> {
    File::create(path)
        .map(BufWriter::new)
        .map_err(|e| format!("create {path}: {e}"))
}

fn cmd_run(
    input: &str,
    video: &VideoArgs,
    level: u32,
    frame_rate: u32,
    planar: &str,
    decoded_planar: Option<&str>,
    output: &str,
) -> Result<(), String> {
    let config = PipelineConfig {
        frame_rate,
        ..video_config(video, level)?
    };
    let pipeline = Pipeline::new(config);

    let reader = open_input(input)?;
    let mut planar_out = create_output(planar)?;
    let mut decoded_out = decoded_planar.map(create_output).transpose()?;
    let mut reconstructed_out = create_output(output)?;

    let mut outputs = PipelineOutputs {
        planar: &mut planar_out,
        decoded_planar: decoded_out.as_mut().map(|w| w as &mut dyn Write),
        reconstructed: &mut reconstructed_out,
    };
    let report = pipeline.run(reader, &mut outputs).map_err(|e| e.to_string())?;

    info!(
        frames = report.frames,
        psnr_db = report.psnr,
        ratio = report.sizes.compression_ratio(),
        "{}",
        report.sizes
    );
    info!(
        "play with: ffplay -f rawvideo -pixel_format rgb24 -video_size {} -framerate {} {output}",
        config.dimensions, config.frame_rate
    );
    Ok(())
}

fn cmd_encode(input: &str, video: &VideoArgs, level: u32, output: &str) -> Result<(), String> {
    let pipeline = Pipeline::new(video_config(video, level)?);

    let frames = pipeline
        .ingest(open_input(input)?)
        .map_err(|e| e.to_string())?;
    let encoded = pipeline.encode(&frames).map_err(|e| e.to_string())?;
    fs::write(output, &encoded.artifact).map_err(|e| format!("write {output}: {e}"))?;

    info!(
        "encoded {} frames at {} ({} bytes) -> {} bytes ({:.2}% of raw, level {})",
        encoded.frames,
        pipeline.config().dimensions,
        encoded.sizes.raw,
        encoded.sizes.compressed,
        encoded.sizes.percent_of_raw(encoded.sizes.compressed),
        pipeline.compressor().level(),
    );
    Ok(())
}

fn cmd_decode(input: &str, video: &VideoArgs, output: &str) -> Result<(), String> {
    let pipeline = Pipeline::new(video_config(video, BEST_LEVEL)?);

    let artifact = fs::read(input).map_err(|e| format!("read {input}: {e}"))?;
    let frames = pipeline.decode_rgb(&artifact).map_err(|e| e.to_string())?;

    let mut out = create_output(output)?;
    for frame in &frames {
        out.write_all(frame.as_bytes())
            .map_err(|e| format!("write {output}: {e}"))?;
    }
    out.flush().map_err(|e| format!("write {output}: {e}"))?;

    info!(
        "decoded {} frames at {} -> {} bytes (raw RGB24)",
        frames.len(),
        pipeline.config().dimensions,
        frames.iter().map(|f| f.len()).sum::<usize>(),
    );
    Ok(())
}
