use log::trace;
use ps_core::{Error, Image, Rect};

use crate::kernel::Kernel;
use crate::weights::AxisWeights;
use crate::{ResamplingPrimitive, validate_request};

/// Pivots below this fraction of the largest diagonal entry are treated as
/// zero.
const PIVOT_EPS: f64 = 1e-9;

/// Least-squares inverse of [`crate::Resampler`] (the "downscale" primitive).
///
/// For each axis, `A` is the matrix the matching resampler would apply to
/// bring a `width`-long line back to the input length with the same source
/// rectangle. Each input line `b` is replaced by the `x` minimising
/// `|A x - b|²`, found from `AᵀA x = Aᵀb` with a banded Cholesky factor
/// computed once per axis. Rows are solved first, then columns.
///
/// The source rectangle is expressed in the coordinates of the *output*,
/// exactly as the resampler that produced the input would have received it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Descaler {
    kernel: Kernel,
}

impl Descaler {
    pub fn new(kernel: Kernel) -> Self {
        Self { kernel }
    }

    pub fn kernel(&self) -> Kernel {
        self.kernel
    }
}

impl ResamplingPrimitive for Descaler {
    fn execute(
        &self,
        plane: &Image<f32>,
        width: usize,
        height: usize,
        src: Rect,
    ) -> Result<Image<f32>, Error> {
        validate_request("descale", plane, width, height, src)?;

        let horizontal = AxisSolver::new(&self.kernel, width, plane.width(), src.x, src.w)?;
        let vertical = AxisSolver::new(&self.kernel, height, plane.height(), src.y, src.h)?;
        trace!(
            "descale {}x{} -> {width}x{height}: bands {}/{}",
            plane.width(),
            plane.height(),
            horizontal.chol.bandwidth,
            vertical.chol.bandwidth
        );

        let rows = horizontal.solve_rows(plane);
        Ok(vertical.solve_rows(&rows.transposed()).transposed())
    }
}

/// One axis of the inverse: the upscale matrix and the factor of its normal
/// equations.
struct AxisSolver {
    upscale: AxisWeights,
    chol: BandedCholesky,
}

impl AxisSolver {
    fn new(
        kernel: &Kernel,
        small: usize,
        large: usize,
        src_left: f64,
        src_width: f64,
    ) -> Result<Self, Error> {
        let upscale = AxisWeights::new(kernel, small, large, src_left, src_width)?;
        let chol = BandedCholesky::normal_equations(&upscale)?;
        Ok(Self { upscale, chol })
    }

    fn solve_rows(&self, src: &Image<f32>) -> Image<f32> {
        let n = self.upscale.src_len();
        let mut dst = Image::new_fill(n, src.height(), 0.0f32);
        let mut rhs = vec![0.0f64; n];
        for y in 0..src.height() {
            self.project(src.row(y), &mut rhs);
            self.chol.solve_in_place(&mut rhs);
            for (d, &v) in dst.row_mut(y).iter_mut().zip(&rhs) {
                *d = v as f32;
            }
        }
        dst
    }

    /// `rhs = Aᵀ b`.
    fn project(&self, b: &[f32], rhs: &mut [f64]) {
        rhs.fill(0.0);
        for (taps, &v) in self.upscale.rows().iter().zip(b) {
            let v = f64::from(v);
            for (k, &c) in taps.coeffs.iter().enumerate() {
                rhs[taps.left + k] += c * v;
            }
        }
    }
}

/// Lower Cholesky factor `L` of a symmetric positive definite band matrix.
///
/// Entry `L[i][j]` for `i - bandwidth <= j <= i` lives at
/// `i * (bandwidth + 1) + (i - j)`.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct BandedCholesky {
    n: usize,
    bandwidth: usize,
    l: Vec<f64>,
}

impl BandedCholesky {
    /// Factors `AᵀA` for the matrix whose rows are `weights`.
    pub(crate) fn normal_equations(weights: &AxisWeights) -> Result<Self, Error> {
        let n = weights.src_len();
        let bandwidth = weights.max_taps().saturating_sub(1);
        let stride = bandwidth + 1;

        let mut band = vec![0.0f64; n * stride];
        for taps in weights.rows() {
            for (a, &ca) in taps.coeffs.iter().enumerate() {
                for (b, &cb) in taps.coeffs[..=a].iter().enumerate() {
                    band[(taps.left + a) * stride + (a - b)] += ca * cb;
                }
            }
        }

        Self::factor(n, bandwidth, band)
    }

    /// Factors the lower band `m` in place.
    pub(crate) fn factor(n: usize, bandwidth: usize, mut m: Vec<f64>) -> Result<Self, Error> {
        let stride = bandwidth + 1;
        debug_assert_eq!(m.len(), n * stride);

        let max_diag = (0..n).map(|i| m[i * stride]).fold(0.0f64, f64::max);
        let tol = max_diag * PIVOT_EPS;

        for i in 0..n {
            let j0 = i.saturating_sub(bandwidth);
            for j in j0..=i {
                let k0 = j0.max(j.saturating_sub(bandwidth));
                let mut sum = m[i * stride + (i - j)];
                for k in k0..j {
                    sum -= m[i * stride + (i - k)] * m[j * stride + (j - k)];
                }
                if i == j {
                    if !(sum > tol) {
                        return Err(Error::precondition(
                            "descale",
                            format!(
                                "normal equations are singular at row {i}; \
                                 the target is too large for this kernel and source span"
                            ),
                        ));
                    }
                    m[i * stride] = sum.sqrt();
                } else {
                    m[i * stride + (i - j)] = sum / m[j * stride];
                }
            }
        }

        Ok(Self {
            n,
            bandwidth,
            l: m,
        })
    }

    /// Solves `L Lᵀ x = r`, overwriting `r` with `x`.
    pub(crate) fn solve_in_place(&self, r: &mut [f64]) {
        let stride = self.bandwidth + 1;
        debug_assert_eq!(r.len(), self.n);

        for i in 0..self.n {
            let mut sum = r[i];
            for k in i.saturating_sub(self.bandwidth)..i {
                sum -= self.l[i * stride + (i - k)] * r[k];
            }
            r[i] = sum / self.l[i * stride];
        }

        for i in (0..self.n).rev() {
            let mut sum = r[i];
            for k in i + 1..self.n.min(i + self.bandwidth + 1) {
                sum -= self.l[k * stride + (k - i)] * r[k];
            }
            r[i] = sum / self.l[i * stride];
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{BandedCholesky, Descaler};
    use crate::resize::resample_rows;
    use crate::weights::AxisWeights;
    use crate::{Kernel, Resampler, ResamplingPrimitive};
    use ps_core::{Error, Image, Rect};

    fn upscale_rows(src: &Image<f32>, kernel: &Kernel, width: usize, rect: Rect) -> Image<f32> {
        let w = AxisWeights::new(kernel, src.width(), width, rect.x, rect.w)
            .expect("valid weights");
        resample_rows(src, &w)
    }

    fn pattern(width: usize, height: usize) -> Image<f32> {
        let data = (0..width * height)
            .map(|i| {
                let (x, y) = ((i % width) as f32, (i / width) as f32);
                0.5 + 0.3 * (0.7 * x).sin() * (0.45 * y).cos()
            })
            .collect();
        Image::from_vec(width, height, data).expect("valid image")
    }

    #[test]
    fn cholesky_solves_a_tridiagonal_system() {
        // [[4,1,0],[1,4,1],[0,1,4]] x = [5,6,5] -> x = [1,1,1]
        let band = vec![4.0, 0.0, 4.0, 1.0, 4.0, 1.0];
        let chol = BandedCholesky::factor(3, 1, band).expect("spd");
        let mut r = vec![5.0, 6.0, 5.0];
        chol.solve_in_place(&mut r);
        for v in r {
            assert!((v - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn descale_inverts_matching_upscale() {
        let kernels = [
            Kernel::Bilinear,
            Kernel::default(),
            Kernel::Lanczos { taps: 3 },
            Kernel::Spline36,
        ];
        let small = pattern(24, 18);
        for k in kernels {
            let rect = Rect::new(0.25, -0.125, 24.0, 18.0);
            let big = Resampler::new(k)
                .execute(&small, 37, 29, rect)
                .expect("upscale");
            let back = Descaler::new(k).execute(&big, 24, 18, rect).expect("descale");

            assert_eq!((back.width(), back.height()), (24, 18));
            for (a, b) in small.data().iter().zip(back.data()) {
                assert!((a - b).abs() < 1e-3, "{k:?}: {a} vs {b}");
            }
        }
    }

    #[test]
    fn horizontal_only_descale_recovers_rows() {
        let small = pattern(16, 4);
        let rect = Rect::full(16, 4);
        let big = upscale_rows(&small, &Kernel::Spline16, 27, rect);
        let back = Descaler::new(Kernel::Spline16)
            .execute(&big, 16, 4, rect)
            .expect("descale");
        for (a, b) in small.data().iter().zip(back.data()) {
            assert!((a - b).abs() < 1e-3);
        }
    }

    #[test]
    fn descale_to_a_larger_size_is_singular() {
        let img = pattern(8, 8);
        let err = Descaler::new(Kernel::Bilinear)
            .execute(&img, 16, 8, Rect::full(16, 8))
            .unwrap_err();
        assert!(matches!(err, Error::Precondition { .. }));
    }
}
