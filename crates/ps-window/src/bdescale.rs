use log::debug;
use ps_core::{Error, LumaPlane, Margins, Plane, Raster, Rect};
use serde::{Deserialize, Serialize};

use crate::descale::{DescaleArgs, Descaled, descale, descale_plane};
use crate::windowed::WindowedImage;

/// Border arithmetic of [`bdescale`].
///
/// `extra_*` are the descaled-space extents covered by the inserted border,
/// `crop` their integer ceilings that are removed from the descaled plane,
/// and `src`/`width`/`height` the descale that is actually run on the
/// bordered plane.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BorderPlan {
    pub extra_left: f64,
    pub extra_right: f64,
    pub extra_top: f64,
    pub extra_bottom: f64,
    pub crop: Margins,
    pub src: Rect,
    pub width: usize,
    pub height: usize,
}

impl BorderPlan {
    /// Plans a bordered descale of a `luma_width × luma_height` plane.
    ///
    /// A negative leading extent has its integer part dropped and its
    /// fractional remainder carried into the source offset. A negative
    /// trailing extent is only clamped, since it never feeds the offset.
    pub fn compute(
        luma_width: usize,
        luma_height: usize,
        args: &DescaleArgs,
        borders: Margins,
    ) -> Result<Self, Error> {
        if luma_width == 0 || luma_height == 0 {
            return Err(Error::validation("bdescale", "input plane is empty"));
        }
        let src = args.source_rect();
        let ratio_w = src.w / luma_width as f64;
        let ratio_h = src.h / luma_height as f64;

        let (extra_left, left) = leading(borders.left as f64 * ratio_w - src.x);
        let (extra_top, top) = leading(borders.top as f64 * ratio_h - src.y);
        let (extra_right, right) =
            trailing(borders.right as f64 * ratio_w + src.x + src.w - args.width as f64);
        let (extra_bottom, bottom) =
            trailing(borders.bottom as f64 * ratio_h + src.y + src.h - args.height as f64);

        Ok(Self {
            extra_left,
            extra_right,
            extra_top,
            extra_bottom,
            crop: Margins::new(left, right, top, bottom),
            src: Rect::new(
                left as f64 - extra_left,
                top as f64 - extra_top,
                extra_left + extra_right + args.width as f64,
                extra_top + extra_bottom + args.height as f64,
            ),
            width: left + right + args.width,
            height: top + bottom + args.height,
        })
    }

    /// Descale arguments for the bordered plane.
    pub fn descale_args(&self, kernel: ps_kernels::Kernel) -> DescaleArgs {
        DescaleArgs {
            width: self.width,
            height: self.height,
            kernel,
            src_left: self.src.x,
            src_top: self.src.y,
            src_width: Some(self.src.w),
            src_height: Some(self.src.h),
        }
    }
}

fn leading(extra: f64) -> (f64, usize) {
    let int = extra.ceil();
    if int < 0.0 {
        (extra - int, 0)
    } else {
        (extra, int as usize)
    }
}

fn trailing(extra: f64) -> (f64, usize) {
    (extra, extra.ceil().max(0.0) as usize)
}

/// Output of [`bdescale`]. Plain planes: the window is meaningless once a
/// synthetic border has been added and cut away.
pub type BDescaled = Descaled<Plane>;

/// Descale with a constant border inserted around the luma plane so the
/// kernel never reads past the picture edge.
///
/// `color` is a code value in the plane's format; `None` is black. With
/// all-zero `borders` this is [`descale`] with the windows dropped.
pub fn bdescale<B>(
    image: &WindowedImage<B>,
    args: &DescaleArgs,
    borders: Margins,
    color: Option<f64>,
    with_diff: bool,
) -> Result<BDescaled, Error>
where
    B: Raster + LumaPlane,
{
    if borders.is_zero() {
        let Descaled { down, diff } = descale(image, args, with_diff)?;
        return Ok(Descaled {
            down: down.into_buffer(),
            diff: diff.map(WindowedImage::into_buffer),
        });
    }

    let luma = image.buffer().luma()?;
    let plan = BorderPlan::compute(luma.width(), luma.height(), args, borders)?;
    debug!("bdescale borders {borders:?}: {plan:?}");

    let bordered = luma.padded(borders, color);
    let Descaled { down, diff } =
        descale_plane(&bordered, &plan.descale_args(args.kernel), with_diff)?;

    Ok(Descaled {
        down: down.crop(plan.crop)?,
        diff: diff.map(|d| d.crop(borders)).transpose()?,
    })
}
