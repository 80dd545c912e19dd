use ps_core::{Error, Image, Plane};
use serde::{Deserialize, Serialize};

/// Which field of the input is kept as-is.
///
/// With height doubling, `Top` places input rows on even output rows and
/// `Bottom` on odd ones. At the same height, the rows of that parity are
/// kept and the others re-estimated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    #[default]
    Top,
    Bottom,
}

impl Field {
    /// `1` for `Top`, `0` for `Bottom`.
    pub fn value(self) -> f64 {
        match self {
            Self::Top => 1.0,
            Self::Bottom => 0.0,
        }
    }

    /// Output row parity of kept lines.
    pub(crate) fn parity(self) -> usize {
        match self {
            Self::Top => 0,
            Self::Bottom => 1,
        }
    }
}

/// A vertical line doubler that only looks at the plane itself.
pub trait DoublingFilter: Send + Sync {
    fn double(&self, plane: &Plane, field: Field, double_height: bool) -> Result<Plane, Error>;
}

/// A vertical line doubler that can validate its estimates against a
/// reference of the output size.
pub trait EdgeDirectedFilter: Send + Sync {
    fn double_checked(
        &self,
        plane: &Plane,
        field: Field,
        double_height: bool,
        reference: Option<&Plane>,
    ) -> Result<Plane, Error>;
}

/// The kept lines of one field, addressed by field index.
pub(crate) struct FieldLines<'a> {
    samples: &'a Image<f32>,
    rows: Vec<usize>,
}

impl FieldLines<'_> {
    /// Field line `k`, clamped to the available lines.
    pub(crate) fn line(&self, k: isize) -> &[f32] {
        let k = k.clamp(0, self.rows.len() as isize - 1) as usize;
        self.samples.row(self.rows[k])
    }
}

/// Output height of a doubling pass.
pub(crate) fn output_height(height: usize, double_height: bool) -> usize {
    if double_height { 2 * height } else { height }
}

/// Runs a doubling pass over raw samples.
///
/// Kept output rows are copied from the field. For every other output row
/// `m`, `fill` receives the field, the index of the field line directly
/// above `m` (may be `-1`), `m` itself, and the row to write.
pub(crate) fn double_rows(
    op: &'static str,
    plane: &Plane,
    field: Field,
    double_height: bool,
    mut fill: impl FnMut(&FieldLines<'_>, isize, usize, &mut [f32]),
) -> Result<Plane, Error> {
    let samples = plane.samples_f32();
    let (width, height) = (samples.width(), samples.height());
    let parity = field.parity();

    let rows: Vec<usize> = if double_height {
        (0..height).collect()
    } else {
        (parity..height).step_by(2).collect()
    };
    if rows.is_empty() {
        return Err(Error::precondition(
            op,
            format!("{width}x{height} plane has no {field:?} field lines"),
        ));
    }
    let lines = FieldLines {
        samples: &samples,
        rows,
    };

    let out_h = output_height(height, double_height);
    let mut out = Image::new_fill(width, out_h, 0.0f32);
    for m in 0..out_h {
        let row = out.row_mut(m);
        if m % 2 == parity {
            row.copy_from_slice(lines.line(((m - parity) / 2) as isize));
        } else {
            let above = (m as isize - 1 - parity as isize).div_euclid(2);
            fill(&lines, above, m, row);
        }
    }

    Ok(plane.with_samples_f32(out))
}
