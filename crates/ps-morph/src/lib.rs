//! Neighbourhood filters on planes.
//!
//! All filters read a 3x3 neighbourhood with edge-clamped coordinates and
//! work on raw code values, so results keep the input plane's format.
//!
//! - [`repair`]: clamps one plane to a rank window of another;
//! - [`maximum`], [`minimum`], [`inflate`], [`deflate`], [`binarize`],
//!   [`prewitt`]: the building blocks of masks;
//! - [`descale_aa_mask`]: marks where a descale did not invert cleanly.

mod mask;
mod neighborhood;
mod repair;

pub use mask::{DescaleMaskConfig, descale_aa_mask};
pub use neighborhood::{binarize, deflate, inflate, maximum, minimum, prewitt, repeat};
pub use repair::repair;
