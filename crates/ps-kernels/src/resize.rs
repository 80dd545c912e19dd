use ps_core::{Error, Image, Rect};

use crate::kernel::Kernel;
use crate::weights::AxisWeights;
use crate::{ResamplingPrimitive, validate_request};

/// Separable kernel resampler (the "upscale" primitive).
///
/// Rows are filtered first, then columns. The source rectangle may be
/// fractional and may extend past the plane; samples outside are reflected.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resampler {
    kernel: Kernel,
}

impl Resampler {
    pub fn new(kernel: Kernel) -> Self {
        Self { kernel }
    }

    pub fn kernel(&self) -> Kernel {
        self.kernel
    }
}

impl ResamplingPrimitive for Resampler {
    fn execute(
        &self,
        plane: &Image<f32>,
        width: usize,
        height: usize,
        src: Rect,
    ) -> Result<Image<f32>, Error> {
        validate_request("resize", plane, width, height, src)?;

        let horizontal = AxisWeights::new(&self.kernel, plane.width(), width, src.x, src.w)?;
        let vertical = AxisWeights::new(&self.kernel, plane.height(), height, src.y, src.h)?;

        let rows = resample_rows(plane, &horizontal);
        Ok(resample_columns(&rows, &vertical))
    }
}

/// Applies `weights` along every row of `src`.
pub(crate) fn resample_rows(src: &Image<f32>, weights: &AxisWeights) -> Image<f32> {
    let mut dst = Image::new_fill(weights.dst_len(), src.height(), 0.0f32);
    for y in 0..src.height() {
        weights.apply(src.row(y), dst.row_mut(y));
    }
    dst
}

/// Applies `weights` along every column of `src`.
pub(crate) fn resample_columns(src: &Image<f32>, weights: &AxisWeights) -> Image<f32> {
    let w = src.width();
    let mut acc = vec![0.0f64; w];
    let mut dst = Image::new_fill(w, weights.dst_len(), 0.0f32);

    for (y, taps) in weights.rows().iter().enumerate() {
        acc.fill(0.0);
        for (k, &c) in taps.coeffs.iter().enumerate() {
            let row = src.row(taps.left + k);
            for (a, &s) in acc.iter_mut().zip(row) {
                *a += c * f64::from(s);
            }
        }
        for (d, &a) in dst.row_mut(y).iter_mut().zip(&acc) {
            *d = a as f32;
        }
    }
    dst
}
