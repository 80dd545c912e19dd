use log::debug;
use ps_core::{Error, LumaPlane, Plane, Raster};
use ps_kernels::Kernel;
use serde::{Deserialize, Serialize};

use crate::descale::{DescaleArgs, Descaled, descale};
use crate::windowed::WindowedImage;

/// Arguments of [`fdescale`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FDescaleArgs {
    /// Descaled size over input size, in `(0, 1)`.
    pub ratio: f64,
    /// Parity reference for the output width. Defaults to the source width
    /// rounded up to a multiple of 16.
    #[serde(default)]
    pub base_width: Option<usize>,
    /// Parity reference for the output height. Defaults to the source height
    /// rounded up to a multiple of 18.
    #[serde(default)]
    pub base_height: Option<usize>,
    #[serde(default)]
    pub kernel: Kernel,
    #[serde(default)]
    pub with_diff: bool,
}

impl FDescaleArgs {
    pub fn new(ratio: f64) -> Self {
        Self {
            ratio,
            base_width: None,
            base_height: None,
            kernel: Kernel::default(),
            with_diff: false,
        }
    }
}

/// Geometry chosen by [`fdescale`] for one input size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatioPlan {
    pub src_width: f64,
    pub src_height: f64,
    pub base_width: usize,
    pub base_height: usize,
    pub width: usize,
    pub height: usize,
    pub src_left: f64,
    pub src_top: f64,
}

impl RatioPlan {
    /// Picks the smallest output at least as large as the scaled input and
    /// sharing the parity of the base size, centred on the scaled input.
    pub fn compute(luma_width: usize, luma_height: usize, args: &FDescaleArgs) -> Result<Self, Error> {
        // Written to also reject NaN.
        if !(args.ratio > 0.0 && args.ratio < 1.0) {
            return Err(Error::validation(
                "fdescale",
                format!("ratio must be within (0, 1), got {}", args.ratio),
            ));
        }

        let src_width = luma_width as f64 * args.ratio;
        let src_height = luma_height as f64 * args.ratio;
        let base_width = args
            .base_width
            .unwrap_or_else(|| (src_width / 16.0).ceil() as usize * 16);
        let base_height = args
            .base_height
            .unwrap_or_else(|| (src_height / 18.0).ceil() as usize * 18);

        let width = parity_fit(base_width, src_width, "base_width")?;
        let height = parity_fit(base_height, src_height, "base_height")?;

        Ok(Self {
            src_width,
            src_height,
            base_width,
            base_height,
            width,
            height,
            src_left: (width as f64 - src_width) / 2.0,
            src_top: (height as f64 - src_height) / 2.0,
        })
    }

    pub fn descale_args(&self, kernel: Kernel) -> DescaleArgs {
        DescaleArgs {
            width: self.width,
            height: self.height,
            kernel,
            src_left: self.src_left,
            src_top: self.src_top,
            src_width: Some(self.src_width),
            src_height: Some(self.src_height),
        }
    }
}

/// `base - 2 * floor((base - src) / 2)`.
fn parity_fit(base: usize, src: f64, what: &str) -> Result<usize, Error> {
    let base_f = base as f64;
    let size = base_f - 2.0 * ((base_f - src) / 2.0).floor();
    if size < 1.0 {
        return Err(Error::validation(
            "fdescale",
            format!("{what} {base} leaves no output for source extent {src}"),
        ));
    }
    Ok(size as usize)
}

/// Descales by a ratio, assuming the whole luma plane is the effective
/// region and the source was cropped symmetrically.
///
/// The incoming window is discarded. The output is centred on the scaled
/// source: `src_left = (width - src_width) / 2`.
pub fn fdescale<B>(
    image: &WindowedImage<B>,
    args: &FDescaleArgs,
) -> Result<Descaled<WindowedImage<Plane>>, Error>
where
    B: Raster + LumaPlane,
{
    let luma = image.buffer().luma()?;
    let plan = RatioPlan::compute(luma.width(), luma.height(), args)?;
    debug!("fdescale ratio {}: {plan:?}", args.ratio);

    let fresh = WindowedImage::new(luma.clone());
    descale(&fresh, &plan.descale_args(args.kernel), args.with_diff)
}
