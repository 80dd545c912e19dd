use log::debug;
use ps_core::{Error, Plane};
use ps_window::{WindowPatch, WindowedImage};
use serde::{Deserialize, Serialize};

use crate::cubic::CubicLineDoubler;
use crate::filter::{DoublingFilter, EdgeDirectedFilter, Field};

/// The doubling primitives available to a pass. Unset slots are skipped.
#[derive(Clone, Copy, Default)]
pub struct DoublingFilters<'a> {
    pub fast: Option<&'a dyn DoublingFilter>,
    pub edge: Option<&'a dyn EdgeDirectedFilter>,
}

impl<'a> DoublingFilters<'a> {
    pub fn new(fast: &'a dyn DoublingFilter, edge: &'a dyn EdgeDirectedFilter) -> Self {
        Self {
            fast: Some(fast),
            edge: Some(edge),
        }
    }

    pub fn fast_only(fast: &'a dyn DoublingFilter) -> Self {
        Self {
            fast: Some(fast),
            edge: None,
        }
    }

    pub fn edge_only(edge: &'a dyn EdgeDirectedFilter) -> Self {
        Self {
            fast: None,
            edge: Some(edge),
        }
    }
}

impl std::fmt::Debug for DoublingFilters<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DoublingFilters")
            .field("fast", &self.fast.is_some())
            .field("edge", &self.edge.is_some())
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InterpolateArgs {
    pub field: Field,
    pub double_height: bool,
    /// Also return the fast estimate when both filters run.
    pub with_fast: bool,
}

impl Default for InterpolateArgs {
    fn default() -> Self {
        Self {
            field: Field::Top,
            double_height: true,
            with_fast: false,
        }
    }
}

/// Result of a doubling pass: the final estimate and, on request, the fast
/// estimate it was checked against.
#[derive(Debug, Clone, PartialEq)]
pub struct Doubled<T> {
    pub edge: T,
    pub fast: Option<T>,
}

/// Vertical doubling of a windowed plane.
///
/// With both filters, the fast estimate runs first and serves as the
/// consistency reference of the edge-directed one. With a single filter
/// that filter runs alone, and with none [`CubicLineDoubler`] is used.
/// `fast` in the result is only populated when both filters ran and
/// `with_fast` is set.
///
/// With `double_height` the window becomes `sy' = 2 sy + 0.5 - field`,
/// `sh' = 2 sh`; otherwise it is unchanged.
pub fn interpolate(
    image: &WindowedImage<Plane>,
    filters: DoublingFilters<'_>,
    args: &InterpolateArgs,
) -> Result<Doubled<WindowedImage<Plane>>, Error> {
    let win = image.window();
    let (sy, sh) = if args.double_height {
        (2.0 * win.y + 0.5 - args.field.value(), 2.0 * win.h)
    } else {
        (win.y, win.h)
    };
    debug!(
        "interpolate {:?} field, dh={}: sy {} -> {sy}, sh {} -> {sh}",
        args.field, args.double_height, win.y, win.h
    );

    let plane = image.buffer();
    let wrap = |p: Plane| {
        image.copy_with(WindowPatch::buffer(p).with_sy(sy).with_sh(sh))
    };

    match (filters.fast, filters.edge) {
        (Some(fast), Some(edge)) => {
            let quick = fast.double(plane, args.field, args.double_height)?;
            let checked =
                edge.double_checked(plane, args.field, args.double_height, Some(&quick))?;
            Ok(Doubled {
                edge: wrap(checked),
                fast: args.with_fast.then(|| wrap(quick)),
            })
        }
        (Some(fast), None) => Ok(Doubled {
            edge: wrap(fast.double(plane, args.field, args.double_height)?),
            fast: None,
        }),
        (None, Some(edge)) => Ok(Doubled {
            edge: wrap(edge.double_checked(plane, args.field, args.double_height, None)?),
            fast: None,
        }),
        (None, None) => Ok(Doubled {
            edge: wrap(CubicLineDoubler.double(plane, args.field, args.double_height)?),
            fast: None,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::{DoublingFilters, InterpolateArgs, interpolate};
    use crate::{CubicLineDoubler, EdgeDirectedFilter, EdgeLineAverage, Field};
    use ps_core::{Image, Plane, Range, Rect};
    use ps_window::WindowedImage;

    fn plane(width: usize, height: usize) -> Plane {
        let data = (0..width * height).map(|i| ((i * 7) % 180 + 30) as u8).collect();
        Plane::from_u8(&Image::from_vec(width, height, data).expect("valid image"), Range::Limited)
    }

    #[test]
    fn doubling_updates_the_vertical_window() {
        let img = WindowedImage::with_window(plane(8, 6), Rect::new(0.5, 1.0, 7.0, 5.0));

        let top = interpolate(&img, DoublingFilters::default(), &InterpolateArgs::default())
            .expect("doubled");
        assert_eq!(top.edge.window(), Rect::new(0.5, 1.5, 7.0, 10.0));
        assert_eq!((top.edge.width(), top.edge.height()), (8, 12));

        let bottom = interpolate(
            &img,
            DoublingFilters::default(),
            &InterpolateArgs {
                field: Field::Bottom,
                ..InterpolateArgs::default()
            },
        )
        .expect("doubled");
        assert_eq!(bottom.edge.window(), Rect::new(0.5, 2.5, 7.0, 10.0));
    }

    #[test]
    fn same_height_keeps_the_window() {
        let img = WindowedImage::with_window(plane(8, 6), Rect::new(0.5, 1.0, 7.0, 5.0));
        let out = interpolate(
            &img,
            DoublingFilters::default(),
            &InterpolateArgs {
                double_height: false,
                ..InterpolateArgs::default()
            },
        )
        .expect("re-estimated");
        assert_eq!(out.edge.window(), img.window());
        assert_eq!(out.edge.height(), 6);
    }

    #[test]
    fn kept_rows_follow_the_field_parity() {
        let src = plane(5, 4);
        let img = WindowedImage::new(src.clone());
        let original = src.samples_f32();
        for (field, parity) in [(Field::Top, 0), (Field::Bottom, 1)] {
            let out = interpolate(
                &img,
                DoublingFilters::default(),
                &InterpolateArgs {
                    field,
                    ..InterpolateArgs::default()
                },
            )
            .expect("doubled");
            let s = out.edge.buffer().samples_f32();
            for y in 0..4 {
                assert_eq!(s.row(2 * y + parity), original.row(y));
            }
        }
    }

    #[test]
    fn both_filters_return_fast_on_request() {
        let img = WindowedImage::new(plane(8, 4));
        let fast = CubicLineDoubler;
        let edge = EdgeLineAverage::default();
        let filters = DoublingFilters::new(&fast, &edge);

        let out = interpolate(
            &img,
            filters,
            &InterpolateArgs {
                with_fast: true,
                ..InterpolateArgs::default()
            },
        )
        .expect("doubled");
        let quick = out.fast.expect("fast requested");
        assert_eq!(quick.window(), out.edge.window());

        let alone = interpolate(&img, DoublingFilters::fast_only(&fast), &InterpolateArgs::default())
            .expect("doubled");
        assert_eq!(alone.edge.buffer(), quick.buffer());
        assert!(alone.fast.is_none());
    }

    #[test]
    fn edge_filter_alone_runs_without_a_fast_estimate() {
        let img = WindowedImage::with_window(plane(8, 6), Rect::new(0.5, 1.0, 7.0, 5.0));
        let edge = EdgeLineAverage::default();

        let out = interpolate(
            &img,
            DoublingFilters::edge_only(&edge),
            &InterpolateArgs {
                with_fast: true,
                ..InterpolateArgs::default()
            },
        )
        .expect("doubled");
        let expected = edge
            .double_checked(img.buffer(), Field::Top, true, None)
            .expect("doubled");
        assert_eq!(out.edge.buffer(), &expected);
        assert!(out.fast.is_none());
        assert_eq!(out.edge.window(), Rect::new(0.5, 1.5, 7.0, 10.0));
    }
}
