use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use image::GrayImage;
use log::info;
use ps_core::{Image, Margins, Plane, Range, Rect, SampleFormat, depth};
use ps_double::{CubicLineDoubler, DoublingFilters, EdgeLineAverage, EdgeLineConfig, aa2x, ee2x};
use ps_kernels::{Kernel, KernelParams, resolve};
use ps_morph::{DescaleMaskConfig, descale_aa_mask};
use ps_window::{
    BorderPlan, DescaleArgs, Descaled, FDescaleArgs, RatioPlan, WindowedImage, bdescale, descale,
    fdescale,
};
use serde::{Deserialize, Serialize};

#[derive(Parser, Debug)]
#[command(name = "ps_gallery")]
#[command(about = "Run planeshift operations on grayscale fixtures")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    #[command(name = "descale")]
    Descale(DescaleCmd),
    #[command(name = "bdescale")]
    Bdescale(BdescaleCmd),
    #[command(name = "fdescale")]
    Fdescale(FdescaleCmd),
    #[command(name = "aa2x")]
    Aa2x(DoubleCmd),
    #[command(name = "mask")]
    Mask(MaskCmd),
    /// Run the operation described by a JSON job file.
    #[command(name = "job")]
    Job(JobCmd),
}

#[derive(Args, Debug, Clone)]
struct CommonArgs {
    #[arg(long, required = true)]
    input: PathBuf,
    #[arg(long, default_value = "gallery")]
    out: PathBuf,
    /// Signal range the 8-bit input is interpreted in.
    #[arg(long, value_enum, default_value_t = RangeArg::Limited)]
    range: RangeArg,
}

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
enum RangeArg {
    Limited,
    Full,
}

impl From<RangeArg> for Range {
    fn from(r: RangeArg) -> Self {
        match r {
            RangeArg::Limited => Range::Limited,
            RangeArg::Full => Range::Full,
        }
    }
}

#[derive(Args, Debug, Clone)]
struct KernelArgs {
    /// Kernel family; a leading "de" is accepted.
    #[arg(long, default_value = "bicubic")]
    kernel: String,
    #[arg(long, default_value_t = 0.0)]
    b: f64,
    #[arg(long, default_value_t = 0.5)]
    c: f64,
    #[arg(long, default_value_t = 3)]
    taps: u32,
}

impl KernelArgs {
    fn kernel(&self) -> Result<Kernel> {
        let params = KernelParams {
            b: self.b,
            c: self.c,
            taps: self.taps,
        };
        Kernel::parse(&self.kernel, &params).with_context(|| format!("resolving kernel '{}'", self.kernel))
    }
}

#[derive(Args, Debug, Clone)]
struct TargetArgs {
    #[arg(long, required = true)]
    width: usize,
    #[arg(long, required = true)]
    height: usize,
    #[arg(long, default_value_t = 0.0)]
    src_left: f64,
    #[arg(long, default_value_t = 0.0)]
    src_top: f64,
    #[arg(long)]
    src_width: Option<f64>,
    #[arg(long)]
    src_height: Option<f64>,
    #[command(flatten)]
    kernel: KernelArgs,
}

impl TargetArgs {
    fn descale_args(&self) -> Result<DescaleArgs> {
        Ok(DescaleArgs {
            width: self.width,
            height: self.height,
            kernel: self.kernel.kernel()?,
            src_left: self.src_left,
            src_top: self.src_top,
            src_width: self.src_width,
            src_height: self.src_height,
        })
    }
}

#[derive(Args, Debug, Clone)]
struct DescaleCmd {
    #[command(flatten)]
    common: CommonArgs,
    #[command(flatten)]
    target: TargetArgs,
    /// Skip the rescale error plane.
    #[arg(long, default_value_t = false)]
    no_diff: bool,
}

#[derive(Args, Debug, Clone)]
struct BdescaleCmd {
    #[command(flatten)]
    common: CommonArgs,
    #[command(flatten)]
    target: TargetArgs,
    #[arg(long, default_value_t = 0)]
    left: usize,
    #[arg(long, default_value_t = 0)]
    right: usize,
    #[arg(long, default_value_t = 0)]
    top: usize,
    #[arg(long, default_value_t = 0)]
    bottom: usize,
    /// Border code value; black when omitted.
    #[arg(long)]
    color: Option<f64>,
    /// Skip the rescale error plane.
    #[arg(long, default_value_t = false)]
    no_diff: bool,
}

#[derive(Args, Debug, Clone)]
struct FdescaleCmd {
    #[command(flatten)]
    common: CommonArgs,
    #[arg(long, required = true)]
    ratio: f64,
    #[arg(long)]
    base_width: Option<usize>,
    #[arg(long)]
    base_height: Option<usize>,
    #[command(flatten)]
    kernel: KernelArgs,
    /// Skip the rescale error plane.
    #[arg(long, default_value_t = false)]
    no_diff: bool,
}

#[derive(Args, Debug, Clone)]
struct DoubleCmd {
    #[command(flatten)]
    common: CommonArgs,
    /// Use the checked two-pass composition instead of plain 2x.
    #[arg(long, default_value_t = false)]
    ee: bool,
    #[arg(long, default_value_t = 4)]
    radius: usize,
    #[arg(long, default_value_t = 2.0)]
    alpha: f32,
}

#[derive(Args, Debug, Clone)]
struct MaskCmd {
    #[command(flatten)]
    common: CommonArgs,
    #[command(flatten)]
    target: TargetArgs,
    #[arg(long, default_value_t = 10.0)]
    thr: f64,
    #[arg(long, default_value_t = 3)]
    expand: usize,
    #[arg(long, default_value_t = 3)]
    inflate: usize,
    /// Only the binarized rescale error, without the edge mask.
    #[arg(long, default_value_t = false)]
    show_credit: bool,
}

#[derive(Args, Debug, Clone)]
struct JobCmd {
    #[arg(long, required = true)]
    job: PathBuf,
}

/// One gallery run: an input, an output directory and an operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Job {
    input: PathBuf,
    #[serde(default = "default_out")]
    out: PathBuf,
    #[serde(default = "default_range")]
    range: RangeArg,
    #[serde(flatten)]
    op: Operation,
}

fn default_out() -> PathBuf {
    PathBuf::from("gallery")
}

fn default_range() -> RangeArg {
    RangeArg::Limited
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
enum Operation {
    Descale {
        #[serde(default)]
        args: DescaleArgs,
        #[serde(default)]
        with_diff: bool,
    },
    Bdescale {
        #[serde(default)]
        args: DescaleArgs,
        #[serde(default)]
        borders: Margins,
        #[serde(default)]
        color: Option<f64>,
        #[serde(default)]
        with_diff: bool,
    },
    Fdescale {
        args: FDescaleArgs,
    },
    Aa2x {
        #[serde(default)]
        ee: bool,
        #[serde(default)]
        edge: EdgeLineConfig,
    },
    Mask {
        #[serde(default)]
        args: DescaleArgs,
        #[serde(default)]
        mask: DescaleMaskConfig,
    },
}

impl Operation {
    fn name(&self) -> &'static str {
        match self {
            Self::Descale { .. } => "descale",
            Self::Bdescale { .. } => "bdescale",
            Self::Fdescale { .. } => "fdescale",
            Self::Aa2x { ee: false, .. } => "aa2x",
            Self::Aa2x { ee: true, .. } => "ee2x",
            Self::Mask { .. } => "mask",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
struct Meta {
    operation: &'static str,
    input_size: [usize; 2],
    output_size: [usize; 2],
    /// Window of the main output, when the operation tracks one.
    #[serde(skip_serializing_if = "Option::is_none")]
    window: Option<Rect>,
    #[serde(skip_serializing_if = "Option::is_none")]
    border_plan: Option<BorderPlan>,
    #[serde(skip_serializing_if = "Option::is_none")]
    ratio_plan: Option<RatioPlan>,
    job: Job,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let job = match cli.cmd {
        Command::Descale(cmd) => Job {
            input: cmd.common.input,
            out: cmd.common.out,
            range: cmd.common.range,
            op: Operation::Descale {
                args: cmd.target.descale_args()?,
                with_diff: !cmd.no_diff,
            },
        },
        Command::Bdescale(cmd) => Job {
            input: cmd.common.input,
            out: cmd.common.out,
            range: cmd.common.range,
            op: Operation::Bdescale {
                args: cmd.target.descale_args()?,
                borders: Margins::new(cmd.left, cmd.right, cmd.top, cmd.bottom),
                color: cmd.color,
                with_diff: !cmd.no_diff,
            },
        },
        Command::Fdescale(cmd) => Job {
            input: cmd.common.input,
            out: cmd.common.out,
            range: cmd.common.range,
            op: Operation::Fdescale {
                args: FDescaleArgs {
                    base_width: cmd.base_width,
                    base_height: cmd.base_height,
                    kernel: cmd.kernel.kernel()?,
                    with_diff: !cmd.no_diff,
                    ..FDescaleArgs::new(cmd.ratio)
                },
            },
        },
        Command::Aa2x(cmd) => Job {
            input: cmd.common.input,
            out: cmd.common.out,
            range: cmd.common.range,
            op: Operation::Aa2x {
                ee: cmd.ee,
                edge: EdgeLineConfig {
                    radius: cmd.radius,
                    alpha: cmd.alpha,
                    ..EdgeLineConfig::default()
                },
            },
        },
        Command::Mask(cmd) => Job {
            input: cmd.common.input,
            out: cmd.common.out,
            range: cmd.common.range,
            op: Operation::Mask {
                args: cmd.target.descale_args()?,
                mask: DescaleMaskConfig {
                    thr: cmd.thr,
                    expand: cmd.expand,
                    inflate: cmd.inflate,
                    show_credit: cmd.show_credit,
                    ..DescaleMaskConfig::default()
                },
            },
        },
        Command::Job(cmd) => read_json(&cmd.job)
            .with_context(|| format!("reading job file {}", cmd.job.display()))?,
    };

    run_job(job)
}

fn run_job(job: Job) -> Result<()> {
    ensure_file_exists(&job.input, "input")?;
    let plane = load_input_plane(&job.input, job.range.into())?;
    let input_size = [plane.width(), plane.height()];

    let case_dir = job.out.join(job.op.name());
    fs::create_dir_all(&case_dir)
        .with_context(|| format!("creating output directory {}", case_dir.display()))?;
    info!(
        "{}: {}x{} from {}",
        job.op.name(),
        input_size[0],
        input_size[1],
        job.input.display()
    );

    let image = WindowedImage::new(plane.clone());
    let mut meta = Meta {
        operation: job.op.name(),
        input_size,
        output_size: [0, 0],
        window: None,
        border_plan: None,
        ratio_plan: None,
        job: job.clone(),
    };

    match &job.op {
        Operation::Descale { args, with_diff } => {
            let Descaled { down, diff } = descale(&image, args, *with_diff)?;
            save_windowed(&case_dir, &down, diff.as_ref(), &mut meta)?;
        }
        Operation::Bdescale {
            args,
            borders,
            color,
            with_diff,
        } => {
            if !borders.is_zero() {
                meta.border_plan = Some(BorderPlan::compute(
                    plane.width(),
                    plane.height(),
                    args,
                    *borders,
                )?);
            }
            let Descaled { down, diff } = bdescale(&image, args, *borders, *color, *with_diff)?;
            meta.output_size = [down.width(), down.height()];
            save_plane(case_dir.join("down.png"), &down)?;
            if let Some(diff) = diff {
                save_stretched(case_dir.join("diff.png"), &diff)?;
            }
        }
        Operation::Fdescale { args } => {
            meta.ratio_plan = Some(RatioPlan::compute(plane.width(), plane.height(), args)?);
            let Descaled { down, diff } = fdescale(&image, args)?;
            save_windowed(&case_dir, &down, diff.as_ref(), &mut meta)?;
        }
        Operation::Aa2x { ee, edge } => {
            let fast = CubicLineDoubler;
            let edge = EdgeLineAverage::new(*edge);
            let filters = DoublingFilters::new(&fast, &edge);
            let doubled = if *ee {
                let out = ee2x(&image, filters, true)?;
                if let Some(fast) = &out.fast {
                    save_plane(case_dir.join("fast.png"), fast.buffer())?;
                }
                out.edge
            } else {
                aa2x(&image, filters)?
            };
            save_windowed(&case_dir, &doubled, None, &mut meta)?;
        }
        Operation::Mask { args, mask } => {
            let Descaled { down, diff } = descale(&image, args, true)?;
            let diff = diff.context("descale returned no diff plane")?;
            let rescaled = rescale(down.buffer(), &plane, args)?;
            let m = descale_aa_mask(diff.buffer(), Some(&rescaled), mask)?;

            meta.output_size = [m.width(), m.height()];
            save_plane(case_dir.join("rescaled.png"), &rescaled)?;
            save_stretched(case_dir.join("diff.png"), diff.buffer())?;
            save_plane(case_dir.join("mask.png"), &m)?;
        }
    }

    write_json(case_dir.join("meta.json"), &meta)?;
    info!("wrote {}", case_dir.display());
    Ok(())
}

/// Upscales `down` back onto `like`'s grid with the kernel that produced it.
fn rescale(down: &Plane, like: &Plane, args: &DescaleArgs) -> Result<Plane> {
    let pair = resolve(args.kernel)?;
    let up = pair.up.execute(
        &depth::to_float(down),
        like.width(),
        like.height(),
        args.source_rect(),
    )?;
    Ok(depth::from_float(&up, like.format())?)
}

fn save_windowed(
    dir: &Path,
    out: &WindowedImage<Plane>,
    diff: Option<&WindowedImage<Plane>>,
    meta: &mut Meta,
) -> Result<()> {
    meta.output_size = [out.width(), out.height()];
    meta.window = Some(out.window());
    save_plane(dir.join("out.png"), out.buffer())?;
    if let Some(diff) = diff {
        save_stretched(dir.join("diff.png"), diff.buffer())?;
    }
    Ok(())
}

fn load_input_plane(path: &Path, range: Range) -> Result<Plane> {
    let dyn_img =
        image::open(path).with_context(|| format!("opening input image {}", path.display()))?;
    let luma = dyn_img.to_luma8();
    let (w, h) = luma.dimensions();
    let img = Image::from_vec(w as usize, h as usize, luma.into_raw())
        .with_context(|| format!("constructing plane from {}", path.display()))?;
    Ok(Plane::from_u8(&img, range))
}

/// Writes `plane` as 8-bit, keeping its range.
fn save_plane(path: PathBuf, plane: &Plane) -> Result<()> {
    let range = match plane.format() {
        SampleFormat::Int { range, .. } => range,
        SampleFormat::Float => Range::Full,
    };
    let eight = depth::convert(plane, SampleFormat::Int { bits: 8, range }, None)?;
    let data = eight.samples_f32().data().iter().map(|&v| v as u8).collect();
    save_luma_raw(path, plane.width(), plane.height(), data)
}

/// Writes `plane` stretched to the full 8-bit range, for error planes.
fn save_stretched(path: PathBuf, plane: &Plane) -> Result<()> {
    let samples = plane.samples_f32();
    save_luma_raw(path, plane.width(), plane.height(), f32_to_u8_vis(samples.data()))
}

fn save_luma_raw(path: PathBuf, width: usize, height: usize, data: Vec<u8>) -> Result<()> {
    let gray = GrayImage::from_raw(width as u32, height as u32, data)
        .context("constructing GrayImage from raw bytes")?;
    gray.save(&path)
        .with_context(|| format!("saving image {}", path.display()))
}

fn f32_to_u8_vis(data: &[f32]) -> Vec<u8> {
    let (min_v, max_v) = data
        .iter()
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    if data.is_empty() || (max_v - min_v).abs() < 1e-12 {
        return vec![0u8; data.len()];
    }

    let scale = 255.0 / (max_v - min_v);
    data.iter()
        .map(|&v| ((v - min_v) * scale).round().clamp(0.0, 255.0) as u8)
        .collect()
}

fn write_json(path: PathBuf, value: &impl Serialize) -> Result<()> {
    let bytes = serde_json::to_vec_pretty(value).context("serializing json")?;
    fs::write(&path, bytes).with_context(|| format!("writing json {}", path.display()))
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T> {
    ensure_file_exists(path, "job")?;
    let data = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_slice(&data).with_context(|| format!("parsing json {}", path.display()))
}

fn ensure_file_exists(path: &Path, what: &str) -> Result<()> {
    if !path.exists() {
        bail!("{} file does not exist: {}", what, path.display());
    }
    if !path.is_file() {
        bail!("{} path is not a file: {}", what, path.display());
    }
    Ok(())
}
