use log::debug;
use ps_core::Error;
use serde::{Deserialize, Serialize};

use crate::ResamplingPrimitive;
use crate::descale::Descaler;
use crate::kernel::Kernel;
use crate::resize::Resampler;

/// Parameters consulted by the kernel families that take any.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KernelParams {
    pub b: f64,
    pub c: f64,
    pub taps: u32,
}

impl Default for KernelParams {
    fn default() -> Self {
        Self {
            b: 0.0,
            c: 0.5,
            taps: 3,
        }
    }
}

impl Kernel {
    /// Resolves a kernel by name.
    ///
    /// Matching is case-insensitive and ignores a leading `de`, so both
    /// `"Spline36"` and `"despline36"` select [`Kernel::Spline36`].
    pub fn parse(name: &str, params: &KernelParams) -> Result<Self, Error> {
        let lower = name.trim().to_ascii_lowercase();
        let family = lower.strip_prefix("de").unwrap_or(&lower);
        let kernel = match family {
            "bilinear" => Self::Bilinear,
            "bicubic" => Self::Bicubic {
                b: params.b,
                c: params.c,
            },
            "lanczos" => Self::Lanczos { taps: params.taps },
            "spline16" => Self::Spline16,
            "spline36" => Self::Spline36,
            "spline64" => Self::Spline64,
            _ => return Err(Error::UnknownKernel(name.to_owned())),
        };
        Ok(kernel)
    }
}

/// A downscale primitive and the upscale primitive it inverts.
pub struct PrimitivePair {
    pub kernel: Kernel,
    pub down: Box<dyn ResamplingPrimitive>,
    pub up: Box<dyn ResamplingPrimitive>,
}

impl std::fmt::Debug for PrimitivePair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrimitivePair")
            .field("kernel", &self.kernel)
            .finish_non_exhaustive()
    }
}

/// Builds the matched primitive pair for `kernel`.
pub fn resolve(kernel: Kernel) -> Result<PrimitivePair, Error> {
    match kernel {
        Kernel::Lanczos { taps: 0 } => {
            return Err(Error::validation("resolve", "lanczos needs at least one tap"));
        }
        Kernel::Bicubic { b, c } if !b.is_finite() || !c.is_finite() => {
            return Err(Error::validation(
                "resolve",
                format!("bicubic parameters must be finite, got b={b}, c={c}"),
            ));
        }
        _ => {}
    }

    debug!("resolved kernel {kernel:?}");
    Ok(PrimitivePair {
        kernel,
        down: Box::new(Descaler::new(kernel)),
        up: Box::new(Resampler::new(kernel)),
    })
}

/// [`Kernel::parse`] followed by [`resolve`].
pub fn resolve_name(name: &str, params: &KernelParams) -> Result<PrimitivePair, Error> {
    resolve(Kernel::parse(name, params)?)
}
