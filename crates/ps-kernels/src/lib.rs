//! Resampling kernels and the matched primitive pairs built from them.
//!
//! Every [`Kernel`] yields two primitives evaluating the same weights:
//! - [`Resampler`]: separable convolution resize (the upscale direction);
//! - [`Descaler`]: the least-squares inverse of that resize.
//!
//! Source rectangles follow the zimg convention used across the workspace:
//! `Rect { x, y, w, h }` selects the continuous region of the *input* that
//! is mapped onto the whole output, with pixel `i` centered at `i + 0.5`.
//! For the descaler the rectangle is the one the matching resize received,
//! i.e. it lives in the descaled (output) coordinates.
//!
//! Reads outside the input are mirrored (half-sample symmetric).

mod descale;
mod kernel;
mod registry;
mod resize;
mod weights;

use ps_core::{Error, Image, Rect};

pub use descale::Descaler;
pub use kernel::Kernel;
pub use registry::{KernelParams, PrimitivePair, resolve, resolve_name};
pub use resize::Resampler;
pub use weights::{AxisWeights, Taps};

/// A named resize or descale operation on a float plane.
pub trait ResamplingPrimitive: Send + Sync {
    /// Produces a `width × height` plane from the region `src` of `plane`.
    fn execute(
        &self,
        plane: &Image<f32>,
        width: usize,
        height: usize,
        src: Rect,
    ) -> Result<Image<f32>, Error>;
}

pub(crate) fn validate_request(
    op: &'static str,
    plane: &Image<f32>,
    width: usize,
    height: usize,
    src: Rect,
) -> Result<(), Error> {
    if width == 0 || height == 0 {
        return Err(Error::validation(
            op,
            format!("target size must be non-zero, got {width}x{height}"),
        ));
    }
    if plane.width() == 0 || plane.height() == 0 {
        return Err(Error::validation(op, "input plane is empty"));
    }
    if !src.is_finite() || src.w <= 0.0 || src.h <= 0.0 {
        return Err(Error::validation(
            op,
            format!("source rectangle must be finite with positive extent, got {src:?}"),
        ));
    }
    Ok(())
}
