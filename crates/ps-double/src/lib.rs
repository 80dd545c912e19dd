//! Vertical line doubling and its two-axis compositions.
//!
//! Doubling primitives are consumed through two traits:
//! - [`DoublingFilter`]: a fast estimator working from the plane alone;
//! - [`EdgeDirectedFilter`]: an edge-directed estimator that may check its
//!   output against a reference of the doubled size.
//!
//! [`CubicLineDoubler`] and [`EdgeLineAverage`] are reference
//! implementations of the two.
//!
//! Window rule for a height-doubling pass keeping `field`:
//! `sy' = 2 sy + 0.5 - field` and `sh' = 2 sh`, where `field` is `1` for
//! [`Field::Top`] and `0` for [`Field::Bottom`]. [`aa2x`] and [`ee2x`] apply
//! it once per axis through a transpose.

mod compose;
mod cubic;
mod edge;
mod filter;
mod interpolate;

pub use compose::{aa2x, ee2x};
pub use cubic::CubicLineDoubler;
pub use edge::{EdgeLineAverage, EdgeLineConfig};
pub use filter::{DoublingFilter, EdgeDirectedFilter, Field};
pub use interpolate::{Doubled, DoublingFilters, InterpolateArgs, interpolate};
