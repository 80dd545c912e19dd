//! Example: descale a frame, measure the rescale error, and double it back.
//!
//! Loads a grayscale PNG, descales it to one or more candidate heights with
//! a chosen kernel, and reports the mean rescale error of each candidate. The
//! best candidate is then doubled on both axes with the edge-directed
//! composition, and the windows of every step are recorded.
//!
//! Results are written to a JSON file next to the input image.
//! Per-candidate timing is printed to stdout.
//!
//! Run from the workspace root:
//!   cargo run -p planeshift --example rescale -- --help
//!   cargo run -p planeshift --example rescale -- --input frame.png --heights 720,810

use std::time::Instant;

use anyhow::{Context, Result, bail};
use clap::Parser;
use image::ImageReader;
use log::debug;
use planeshift::{
    CubicLineDoubler, DescaleArgs, Descaled, DoublingFilters, EdgeLineAverage, Image, Kernel,
    KernelParams, Plane, Range, Rect, WindowedImage, descale, ee2x,
};
use serde::Serialize;

// ── CLI ───────────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(about = "Rank candidate native heights of a frame by rescale error")]
struct Args {
    /// Path to the grayscale frame
    #[arg(long, default_value = "data/frame.png")]
    input: String,

    /// Candidate native heights, comma separated
    #[arg(long, value_delimiter = ',', default_value = "720")]
    heights: Vec<usize>,

    /// Kernel family (bilinear, bicubic, lanczos, spline16/36/64)
    #[arg(long, default_value = "bicubic")]
    kernel: String,

    /// Bicubic b
    #[arg(long, default_value_t = 0.0)]
    b: f64,

    /// Bicubic c
    #[arg(long, default_value_t = 0.5)]
    c: f64,

    /// Output JSON path (default: <input stem>_rescale.json next to input)
    #[arg(long)]
    out: Option<String>,
}

// ── JSON DTOs ─────────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct CandidateResult {
    width: usize,
    height: usize,
    /// Mean absolute rescale error in 8-bit code values.
    mean_error: f64,
    window: Rect,
    elapsed_ms: f64,
}

#[derive(Serialize)]
struct Report {
    input_size: [usize; 2],
    kernel: Kernel,
    candidates: Vec<CandidateResult>,
    best_height: usize,
    doubled_size: [usize; 2],
    doubled_window: Rect,
}

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Width matching `height` at the input's aspect ratio, rounded to even.
fn matching_width(src_w: usize, src_h: usize, height: usize) -> usize {
    let w = (src_w as f64 * height as f64 / src_h as f64 / 2.0).round() as usize * 2;
    w.max(2)
}

fn mean_error(diff: &Plane) -> f64 {
    let samples = diff.samples_f32();
    let sum: f64 = samples.data().iter().map(|&v| f64::from(v)).sum();
    sum / samples.data().len().max(1) as f64
}

// ── Main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let img_path = &args.input;
    let out_path = args.out.clone().unwrap_or_else(|| {
        let p = std::path::Path::new(img_path);
        let stem = p.file_stem().unwrap_or_default().to_string_lossy();
        let dir = p.parent().unwrap_or(std::path::Path::new("."));
        dir.join(format!("{stem}_rescale.json"))
            .to_string_lossy()
            .into_owned()
    });

    let gray = ImageReader::open(img_path)
        .with_context(|| format!("opening {img_path}"))?
        .decode()
        .with_context(|| format!("decoding {img_path}"))?
        .into_luma8();
    let (src_w, src_h) = (gray.width() as usize, gray.height() as usize);
    let plane = Plane::from_u8(
        &Image::from_vec(src_w, src_h, gray.into_raw()).context("building plane")?,
        Range::Limited,
    );

    if args.heights.is_empty() {
        bail!("at least one candidate height is required");
    }
    let kernel = Kernel::parse(
        &args.kernel,
        &KernelParams {
            b: args.b,
            c: args.c,
            ..KernelParams::default()
        },
    )?;
    println!("loaded {img_path}: {src_w}x{src_h}, kernel {kernel:?}");

    let image = WindowedImage::new(plane);
    let mut candidates = Vec::with_capacity(args.heights.len());
    let mut best: Option<(f64, WindowedImage<Plane>)> = None;

    for &height in &args.heights {
        let width = matching_width(src_w, src_h, height);
        let t0 = Instant::now();
        let Descaled { down, diff } = descale(&image, &DescaleArgs::new(width, height, kernel), true)
            .with_context(|| format!("descaling to {width}x{height}"))?;
        let elapsed_ms = t0.elapsed().as_secs_f64() * 1e3;

        let diff = diff.context("descale returned no diff plane")?;
        let err = mean_error(diff.buffer());
        println!("  {width}x{height}: mean error {err:.4}  ({elapsed_ms:.2} ms)");
        debug!("{width}x{height}: window {:?}", down.window());

        candidates.push(CandidateResult {
            width,
            height,
            mean_error: err,
            window: down.window(),
            elapsed_ms,
        });
        if best.as_ref().is_none_or(|(e, _)| err < *e) {
            best = Some((err, down));
        }
    }

    let (_, down) = best.context("no candidate was evaluated")?;
    let best_height = down.height();
    let fast = CubicLineDoubler;
    let edge = EdgeLineAverage::default();
    let doubled = ee2x(&down, DoublingFilters::new(&fast, &edge), false)?.edge;
    println!(
        "best height {best_height}, doubled to {}x{} with window {:?}",
        doubled.width(),
        doubled.height(),
        doubled.window()
    );

    let report = Report {
        input_size: [src_w, src_h],
        kernel,
        candidates,
        best_height,
        doubled_size: [doubled.width(), doubled.height()],
        doubled_window: doubled.window(),
    };
    let out_file =
        std::fs::File::create(&out_path).with_context(|| format!("creating {out_path}"))?;
    serde_json::to_writer_pretty(out_file, &report)
        .with_context(|| format!("writing JSON to {out_path}"))?;

    println!("results written to {out_path}");
    Ok(())
}
