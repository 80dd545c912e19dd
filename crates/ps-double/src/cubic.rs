use ps_core::{Error, Plane};

use crate::filter::{DoublingFilter, Field, double_rows};

/// Fast line doubler: each missing line is a 4-tap cubic through the two
/// field lines on either side. Taps are `[-1, 9, 9, -1] / 16`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CubicLineDoubler;

impl DoublingFilter for CubicLineDoubler {
    fn double(&self, plane: &Plane, field: Field, double_height: bool) -> Result<Plane, Error> {
        double_rows("cubic doubler", plane, field, double_height, |lines, above, _, row| {
            let (a, b) = (lines.line(above - 1), lines.line(above));
            let (c, d) = (lines.line(above + 1), lines.line(above + 2));
            for (x, out) in row.iter_mut().enumerate() {
                *out = (9.0 * (b[x] + c[x]) - (a[x] + d[x])) / 16.0;
            }
        })
    }
}
