//! Foundational types for window-tracking resampling.
//!
//! ## Buffers
//! [`Image`] is an owned, row-major grid with `stride == width`. Crops and
//! pads copy into a new grid.
//!
//! ## Planes and Frames
//! A [`Plane`] is one channel of samples, either integer (`bits` in `8..=16`,
//! with a signal [`Range`]) or 32-bit float. A [`Frame`] groups planes under a
//! [`ColorFamily`]. The window engine only sees buffers through the
//! [`Raster`] and [`LumaPlane`] facades.
//!
//! ## Coordinates
//! Windows and source rectangles use the zimg convention: pixel `i` covers
//! `[i, i + 1)` and its center sits at `i + 0.5`. A [`Rect`] is expressed in
//! the pixel units of the buffer it belongs to.

mod border;
pub mod depth;
mod error;
mod frame;
mod geom;
mod image;
mod plane;

pub use border::{BorderMode, map_index};
pub use error::Error;
pub use frame::{ColorFamily, Frame};
pub use geom::{Margins, Rect};
pub use image::Image;
pub use plane::{LumaPlane, Plane, Range, Raster, SampleFormat, SampleType, apply_borders};
