//! Window-tracking descale operations.
//!
//! A [`WindowedImage`] carries a buffer together with the sub-pixel region
//! of it that holds real picture content. Every transform here derives the
//! new window from the old one and its own parameters, so chains of
//! crop/transpose/descale never accumulate positional drift.
//!
//! Operations:
//! - [`descale`]: least-squares inverse of a kernel upscale, optionally with
//!   the rescale error;
//! - [`bdescale`]: the same with a constant border inserted first, for
//!   sources upscaled without mirrored edges;
//! - [`fdescale`]: descale by a ratio with parity-aware output size, for
//!   sources that were upscaled and then cropped symmetrically.

mod bdescale;
mod descale;
mod fdescale;
mod windowed;

pub use bdescale::{BDescaled, BorderPlan, bdescale};
pub use descale::{DescaleArgs, Descaled, descale};
pub use fdescale::{FDescaleArgs, RatioPlan, fdescale};
pub use windowed::{WindowPatch, WindowedImage};
