use log::debug;
use ps_core::depth::{from_float, from_float_delta, to_float};
use ps_core::{Error, LumaPlane, Plane, Raster, Rect, SampleFormat};
use ps_kernels::{Kernel, resolve};
use serde::{Deserialize, Serialize};

use crate::windowed::WindowedImage;

/// Target geometry and kernel of a descale.
///
/// The source rectangle is given in the coordinates of the descaled output;
/// `src_width`/`src_height` default to the target size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DescaleArgs {
    pub width: usize,
    pub height: usize,
    pub kernel: Kernel,
    pub src_left: f64,
    pub src_top: f64,
    pub src_width: Option<f64>,
    pub src_height: Option<f64>,
}

impl Default for DescaleArgs {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            kernel: Kernel::default(),
            src_left: 0.0,
            src_top: 0.0,
            src_width: None,
            src_height: None,
        }
    }
}

impl DescaleArgs {
    pub fn new(width: usize, height: usize, kernel: Kernel) -> Self {
        Self {
            width,
            height,
            kernel,
            ..Self::default()
        }
    }

    /// The source rectangle with defaults resolved.
    pub fn source_rect(&self) -> Rect {
        Rect::new(
            self.src_left,
            self.src_top,
            self.src_width.unwrap_or(self.width as f64),
            self.src_height.unwrap_or(self.height as f64),
        )
    }
}

/// Downscaled result and, on request, the rescale error.
#[derive(Debug, Clone, PartialEq)]
pub struct Descaled<T> {
    pub down: T,
    pub diff: Option<T>,
}

/// Descales the luma plane of `image`.
///
/// The output window is the input window projected through the source
/// rectangle: `sx' = src_left + sx * src_width / buffer_width` (widths scale
/// by the same ratio). With `with_diff`, the result is upscaled back with the
/// matching kernel and `|input - upscaled|` is returned registered to the
/// input window.
pub fn descale<B>(
    image: &WindowedImage<B>,
    args: &DescaleArgs,
    with_diff: bool,
) -> Result<Descaled<WindowedImage<Plane>>, Error>
where
    B: Raster + LumaPlane,
{
    let src = args.source_rect();
    let ratio_w = src.w / image.width() as f64;
    let ratio_h = src.h / image.height() as f64;

    let win = image.window();
    let projected = Rect::new(
        src.x + ratio_w * win.x,
        src.y + ratio_h * win.y,
        ratio_w * win.w,
        ratio_h * win.h,
    );
    debug!(
        "descale {}x{} -> {}x{} ({:?}): window {win:?} -> {projected:?}",
        image.width(),
        image.height(),
        args.width,
        args.height,
        args.kernel
    );

    let luma = image.buffer().luma()?;
    let Descaled { down, diff } = descale_plane(luma, args, with_diff)?;

    Ok(Descaled {
        down: WindowedImage::with_window(down, projected),
        diff: diff.map(|d| WindowedImage::with_window(d, win)),
    })
}

/// Descale of a bare plane, without any window bookkeeping.
///
/// Integer inputs come back at their own depth and range. The diff plane of
/// an integer input is full range, one code per step of the input range.
pub(crate) fn descale_plane(
    plane: &Plane,
    args: &DescaleArgs,
    with_diff: bool,
) -> Result<Descaled<Plane>, Error> {
    let pair = resolve(args.kernel)?;
    let src = args.source_rect();

    let input = to_float(plane);
    let down = pair.down.execute(&input, args.width, args.height, src)?;

    let diff = if with_diff {
        let up = pair.up.execute(&down, input.width(), input.height(), src)?;
        Some(input.zip_map(&up, |a, b| (a - b).abs())?)
    } else {
        None
    };

    let format = plane.format();
    let down = from_float(&down, format)?;
    let diff = match (diff, format) {
        (None, _) => None,
        (Some(d), SampleFormat::Float) => Some(Plane::Float(d)),
        (Some(d), SampleFormat::Int { bits, range }) => Some(from_float_delta(&d, bits, range)?),
    };

    Ok(Descaled { down, diff })
}
