use core::f64::consts::PI;

use serde::{Deserialize, Serialize};

/// Continuous interpolation kernel families.
///
/// Each family yields one matched pair of primitives: a [`crate::Resampler`]
/// and a [`crate::Descaler`] evaluating the same `weight` function.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "name", rename_all = "lowercase")]
pub enum Kernel {
    Bilinear,
    /// Mitchell–Netravali cubic. `b = 0, c = 0.5` is Catmull-Rom.
    Bicubic { b: f64, c: f64 },
    Lanczos { taps: u32 },
    Spline16,
    Spline36,
    Spline64,
}

impl Default for Kernel {
    fn default() -> Self {
        Self::Bicubic { b: 0.0, c: 0.5 }
    }
}

impl Kernel {
    /// Half-width of the kernel at unit scale.
    pub fn support(&self) -> f64 {
        match self {
            Self::Bilinear => 1.0,
            Self::Bicubic { .. } | Self::Spline16 => 2.0,
            Self::Lanczos { taps } => f64::from(*taps),
            Self::Spline36 => 3.0,
            Self::Spline64 => 4.0,
        }
    }

    pub fn family(&self) -> &'static str {
        match self {
            Self::Bilinear => "bilinear",
            Self::Bicubic { .. } => "bicubic",
            Self::Lanczos { .. } => "lanczos",
            Self::Spline16 => "spline16",
            Self::Spline36 => "spline36",
            Self::Spline64 => "spline64",
        }
    }

    #[inline]
    pub fn weight(&self, x: f64) -> f64 {
        let x = x.abs();
        if x >= self.support() {
            return 0.0;
        }
        match self {
            Self::Bilinear => 1.0 - x,
            Self::Bicubic { b, c } => mitchell(x, *b, *c),
            Self::Lanczos { taps } => sinc(x) * sinc(x / f64::from(*taps)),
            Self::Spline16 => spline16(x),
            Self::Spline36 => spline36(x),
            Self::Spline64 => spline64(x),
        }
    }
}

#[inline]
fn mitchell(x: f64, b: f64, c: f64) -> f64 {
    if x < 1.0 {
        ((12.0 - 9.0 * b - 6.0 * c) * x * x * x + (-18.0 + 12.0 * b + 6.0 * c) * x * x
            + (6.0 - 2.0 * b))
            / 6.0
    } else {
        ((-b - 6.0 * c) * x * x * x
            + (6.0 * b + 30.0 * c) * x * x
            + (-12.0 * b - 48.0 * c) * x
            + (8.0 * b + 24.0 * c))
            / 6.0
    }
}

#[inline]
fn sinc(x: f64) -> f64 {
    if x.abs() < 1e-12 {
        1.0
    } else {
        let px = PI * x;
        px.sin() / px
    }
}

#[inline]
fn spline16(x: f64) -> f64 {
    if x < 1.0 {
        ((x - 9.0 / 5.0) * x - 1.0 / 5.0) * x + 1.0
    } else {
        let t = x - 1.0;
        ((-1.0 / 3.0 * t + 4.0 / 5.0) * t - 7.0 / 15.0) * t
    }
}

#[inline]
fn spline36(x: f64) -> f64 {
    if x < 1.0 {
        ((13.0 / 11.0 * x - 453.0 / 209.0) * x - 3.0 / 209.0) * x + 1.0
    } else if x < 2.0 {
        let t = x - 1.0;
        ((-6.0 / 11.0 * t + 270.0 / 209.0) * t - 156.0 / 209.0) * t
    } else {
        let t = x - 2.0;
        ((1.0 / 11.0 * t - 45.0 / 209.0) * t + 26.0 / 209.0) * t
    }
}

#[inline]
fn spline64(x: f64) -> f64 {
    if x < 1.0 {
        ((49.0 / 41.0 * x - 6387.0 / 2911.0) * x - 3.0 / 2911.0) * x + 1.0
    } else if x < 2.0 {
        let t = x - 1.0;
        ((-24.0 / 41.0 * t + 4032.0 / 2911.0) * t - 2328.0 / 2911.0) * t
    } else if x < 3.0 {
        let t = x - 2.0;
        ((6.0 / 41.0 * t - 1008.0 / 2911.0) * t + 582.0 / 2911.0) * t
    } else {
        let t = x - 3.0;
        ((-1.0 / 41.0 * t + 168.0 / 2911.0) * t - 97.0 / 2911.0) * t
    }
}

#[cfg(test)]
mod tests {
    use super::Kernel;

    const ALL: [Kernel; 6] = [
        Kernel::Bilinear,
        Kernel::Bicubic { b: 0.0, c: 0.5 },
        Kernel::Lanczos { taps: 3 },
        Kernel::Spline16,
        Kernel::Spline36,
        Kernel::Spline64,
    ];

    #[test]
    fn interpolating_kernels_hit_one_and_zero_at_integers() {
        for k in ALL {
            assert!((k.weight(0.0) - 1.0).abs() < 1e-12, "{k:?} at 0");
            for i in 1..=4 {
                assert!(k.weight(f64::from(i)).abs() < 1e-12, "{k:?} at {i}");
            }
        }
    }

    #[test]
    fn integer_shift_weights_sum_to_one() {
        for k in ALL {
            for frac in [0.0, 0.25, 0.5, 0.8] {
                let sum: f64 = (-5..=5).map(|i| k.weight(f64::from(i) + frac)).sum();
                // Lanczos is only approximately a partition of unity.
                assert!((sum - 1.0).abs() < 1e-2, "{k:?} shift {frac}: {sum}");
            }
        }
    }

    #[test]
    fn kernels_are_symmetric_and_continuous_at_knots() {
        for k in ALL {
            for x in [0.3, 1.2, 2.7] {
                assert!((k.weight(x) - k.weight(-x)).abs() < 1e-15);
            }
            for knot in [1.0, 2.0, 3.0] {
                let l = k.weight(knot - 1e-9);
                let r = k.weight(knot + 1e-9);
                assert!((l - r).abs() < 1e-6, "{k:?} jumps at {knot}");
            }
        }
    }

    #[test]
    fn b_spline_bicubic_is_not_interpolating() {
        let k = Kernel::Bicubic { b: 1.0, c: 0.0 };
        assert!((k.weight(0.0) - 4.0 / 6.0).abs() < 1e-12);
        assert!((k.weight(1.0) - 1.0 / 6.0).abs() < 1e-12);
    }
}
