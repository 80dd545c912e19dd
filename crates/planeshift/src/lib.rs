//! Umbrella crate for the `planeshift` workspace.
//!
//! Re-exports the plane model, the kernel registry, the window-tracking
//! descale operations, line doubling and the neighbourhood filters.

pub use ps_core::*;
pub use ps_double::*;
pub use ps_kernels::*;
pub use ps_morph::*;
pub use ps_window::*;
