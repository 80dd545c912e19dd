use ps_core::{Error, Plane};
use ps_window::{WindowPatch, WindowedImage};

use crate::filter::Field;
use crate::interpolate::{Doubled, DoublingFilters, InterpolateArgs, interpolate};

/// Doubles both axes: vertical pass, transpose, vertical pass, transpose
/// back. The window follows the per-axis rule on each axis.
pub fn aa2x(
    image: &WindowedImage<Plane>,
    filters: DoublingFilters<'_>,
) -> Result<WindowedImage<Plane>, Error> {
    let args = InterpolateArgs::default();
    let first = interpolate(image, filters, &args)?.edge.into_transposed();
    let second = interpolate(&first, filters, &args)?.edge;
    Ok(second.into_transposed())
}

/// Two-axis doubling where the second edge-directed pass is checked against
/// a fast estimate of the *fast* intermediate.
///
/// Both filters are required. With `with_fast` the fast-only 2x result is
/// returned as well.
pub fn ee2x(
    image: &WindowedImage<Plane>,
    filters: DoublingFilters<'_>,
    with_fast: bool,
) -> Result<Doubled<WindowedImage<Plane>>, Error> {
    let (Some(fast), Some(edge)) = (filters.fast, filters.edge) else {
        let missing = match (filters.fast.is_none(), filters.edge.is_none()) {
            (true, true) => "fast and edge-directed filters",
            (true, false) => "fast filter",
            _ => "edge-directed filter",
        };
        return Err(Error::validation("ee2x", format!("missing {missing}")));
    };

    let first = interpolate(
        image,
        filters,
        &InterpolateArgs {
            with_fast: true,
            ..InterpolateArgs::default()
        },
    )?;
    let edge1 = first.edge.into_transposed();
    let fast1 = first
        .fast
        .ok_or_else(|| Error::precondition("ee2x", "first pass returned no fast estimate"))?
        .into_transposed();

    let fast2 = interpolate(
        &fast1,
        DoublingFilters::fast_only(fast),
        &InterpolateArgs::default(),
    )?
    .edge;
    let checked = edge.double_checked(edge1.buffer(), Field::Top, true, Some(fast2.buffer()))?;
    let edge2 = fast2.copy_with(WindowPatch::buffer(checked));

    Ok(Doubled {
        edge: edge2.into_transposed(),
        fast: with_fast.then(|| fast2.into_transposed()),
    })
}

#[cfg(test)]
mod tests {
    use super::{aa2x, ee2x};
    use crate::{CubicLineDoubler, DoublingFilters, EdgeLineAverage};
    use ps_core::{Error, Image, Plane, Rect};
    use ps_window::WindowedImage;

    fn plane(width: usize, height: usize) -> Plane {
        let data = (0..width * height)
            .map(|i| ((i % width) as f32 * 0.05 + (i / width) as f32 * 0.03).fract())
            .collect();
        Plane::Float(Image::from_vec(width, height, data).expect("valid image"))
    }

    #[test]
    fn aa2x_doubles_both_axes_and_windows() {
        let img = WindowedImage::with_window(plane(10, 6), Rect::new(1.0, 0.5, 8.0, 5.0));
        let out = aa2x(&img, DoublingFilters::default()).expect("doubled");

        assert_eq!((out.width(), out.height()), (20, 12));
        // Each axis: s' = 2 s - 0.5 for the top field.
        assert_eq!(out.window(), Rect::new(1.5, 0.5, 16.0, 10.0));
    }

    #[test]
    fn aa2x_keeps_original_samples_on_even_grid() {
        let src = plane(6, 4);
        let out = aa2x(&WindowedImage::new(src.clone()), DoublingFilters::default())
            .expect("doubled");
        let (Plane::Float(a), Plane::Float(b)) = (&src, out.buffer()) else {
            panic!("float stays float");
        };
        for y in 0..4 {
            for x in 0..6 {
                assert_eq!(a.get(x, y), b.get(2 * x, 2 * y));
            }
        }
    }

    #[test]
    fn ee2x_requires_both_filters() {
        let img = WindowedImage::new(plane(4, 4));
        let fast = CubicLineDoubler;
        let err = ee2x(&img, DoublingFilters::fast_only(&fast), false).unwrap_err();
        match err {
            Error::Validation { op, reason } => {
                assert_eq!(op, "ee2x");
                assert!(reason.contains("edge-directed"));
            }
            other => panic!("unexpected error {other:?}"),
        }
        assert!(ee2x(&img, DoublingFilters::default(), false).is_err());
    }

    #[test]
    fn ee2x_matches_aa2x_geometry_and_returns_fast() {
        let img = WindowedImage::with_window(plane(8, 6), Rect::new(0.0, 0.25, 8.0, 5.5));
        let fast = CubicLineDoubler;
        let edge = EdgeLineAverage::default();
        let filters = DoublingFilters::new(&fast, &edge);

        let out = ee2x(&img, filters, true).expect("doubled");
        let reference = aa2x(&img, filters).expect("doubled");
        assert_eq!(out.edge.window(), reference.window());
        assert_eq!((out.edge.width(), out.edge.height()), (16, 12));

        let quick = out.fast.expect("fast requested");
        let fast_only = aa2x(&img, DoublingFilters::fast_only(&fast)).expect("doubled");
        assert_eq!(quick, fast_only);
    }
}
