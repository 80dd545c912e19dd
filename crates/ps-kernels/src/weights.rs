use ps_core::{BorderMode, Error, map_index};

use crate::kernel::Kernel;

/// Normalised filter taps for one output sample.
#[derive(Debug, Clone, PartialEq)]
pub struct Taps {
    /// First input index the taps apply to.
    pub left: usize,
    pub coeffs: Vec<f64>,
}

/// One-axis resampling matrix.
///
/// Output sample `i` of `dst_len` is centered at input coordinate
/// `src_left + (i + 0.5) * src_width / dst_len` (pixel `j` spans
/// `[j, j + 1)`). When downscaling the kernel is stretched by
/// `src_width / dst_len`. Taps outside `[0, src_len)` are folded back with
/// half-sample symmetric reflection. Every row sums to one.
#[derive(Debug, Clone, PartialEq)]
pub struct AxisWeights {
    src_len: usize,
    rows: Vec<Taps>,
}

impl AxisWeights {
    pub fn new(
        kernel: &Kernel,
        src_len: usize,
        dst_len: usize,
        src_left: f64,
        src_width: f64,
    ) -> Result<Self, Error> {
        if src_len == 0 || dst_len == 0 {
            return Err(Error::validation(
                "resample",
                format!("empty axis: src_len={src_len}, dst_len={dst_len}"),
            ));
        }
        if !src_left.is_finite() || !src_width.is_finite() || src_width <= 0.0 {
            return Err(Error::validation(
                "resample",
                format!("invalid source span: left={src_left}, width={src_width}"),
            ));
        }

        let step = src_width / dst_len as f64;
        let filter_scale = step.max(1.0);
        let support = kernel.support() * filter_scale;
        let border = BorderMode::<f64>::Reflect;

        let mut rows = Vec::with_capacity(dst_len);
        let mut folded: Vec<(usize, f64)> = Vec::new();
        for i in 0..dst_len {
            let pos = src_left + (i as f64 + 0.5) * step;
            let lo = (pos - 0.5 - support).ceil() as isize;
            let hi = (pos - 0.5 + support).floor() as isize;

            folded.clear();
            let mut sum = 0.0;
            for j in lo..=hi {
                let w = kernel.weight((j as f64 + 0.5 - pos) / filter_scale);
                if w == 0.0 {
                    continue;
                }
                let idx = map_index(j, src_len, &border).ok_or(Error::OutOfBounds)?;
                folded.push((idx, w));
                sum += w;
            }

            rows.push(Self::collect_row(&folded, sum, pos, src_len));
        }

        Ok(Self { src_len, rows })
    }

    fn collect_row(folded: &[(usize, f64)], sum: f64, pos: f64, src_len: usize) -> Taps {
        if folded.is_empty() || sum.abs() < 1e-12 {
            // Degenerate footprint: nearest sample.
            let nearest = (pos.floor().max(0.0) as usize).min(src_len - 1);
            return Taps {
                left: nearest,
                coeffs: vec![1.0],
            };
        }

        let left = folded.iter().map(|&(i, _)| i).min().unwrap_or(0);
        let right = folded.iter().map(|&(i, _)| i).max().unwrap_or(left);
        let mut coeffs = vec![0.0; right - left + 1];
        for &(idx, w) in folded {
            coeffs[idx - left] += w / sum;
        }
        Taps { left, coeffs }
    }

    pub fn src_len(&self) -> usize {
        self.src_len
    }

    pub fn dst_len(&self) -> usize {
        self.rows.len()
    }

    pub fn rows(&self) -> &[Taps] {
        &self.rows
    }

    /// Widest row, in taps.
    pub fn max_taps(&self) -> usize {
        self.rows.iter().map(|r| r.coeffs.len()).max().unwrap_or(0)
    }

    /// Resamples one line. `src.len()` must be `src_len`, `dst.len()` must be
    /// `dst_len`.
    pub fn apply(&self, src: &[f32], dst: &mut [f32]) {
        debug_assert_eq!(src.len(), self.src_len);
        debug_assert_eq!(dst.len(), self.rows.len());

        for (out, taps) in dst.iter_mut().zip(&self.rows) {
            let window = &src[taps.left..taps.left + taps.coeffs.len()];
            let acc: f64 = window
                .iter()
                .zip(&taps.coeffs)
                .map(|(&s, &c)| f64::from(s) * c)
                .sum();
            *out = acc as f32;
        }
    }
}
