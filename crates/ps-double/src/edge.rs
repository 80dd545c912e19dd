use ps_core::{Error, Plane};
use serde::{Deserialize, Serialize};

use crate::filter::{EdgeDirectedFilter, Field, double_rows, output_height};

/// Tuning of [`EdgeLineAverage`]. Sample thresholds are on the 8-bit scale
/// and follow the plane's depth.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EdgeLineConfig {
    /// Largest horizontal displacement searched, in pixels.
    pub radius: usize,
    /// Half-width of the matching window.
    pub window: usize,
    /// Cost added per pixel of displacement.
    pub alpha: f32,
    /// Reference deviation below which the edge estimate is kept.
    pub vthresh_lo: f32,
    /// Reference deviation above which the reference replaces the estimate.
    pub vthresh_hi: f32,
}

impl Default for EdgeLineConfig {
    fn default() -> Self {
        Self {
            radius: 4,
            window: 1,
            alpha: 2.0,
            vthresh_lo: 12.0,
            vthresh_hi: 24.0,
        }
    }
}

/// Edge-directed line averaging.
///
/// For every missing sample, the displacement `d` in `-radius..=radius`
/// minimising the window SAD between the line above (shifted by `+d`) and
/// the line below (shifted by `-d`) is chosen, and the two matched samples
/// are averaged. With a reference, estimates deviating from it are pulled
/// towards it: fully past `vthresh_hi`, linearly from `vthresh_lo`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EdgeLineAverage {
    config: EdgeLineConfig,
}

impl EdgeLineAverage {
    pub fn new(config: EdgeLineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EdgeLineConfig {
        &self.config
    }
}

impl EdgeDirectedFilter for EdgeLineAverage {
    fn double_checked(
        &self,
        plane: &Plane,
        field: Field,
        double_height: bool,
        reference: Option<&Plane>,
    ) -> Result<Plane, Error> {
        let out_h = output_height(plane.height(), double_height);
        let reference = match reference {
            Some(r) if r.width() != plane.width() || r.height() != out_h => {
                return Err(Error::precondition(
                    "edge doubler",
                    format!(
                        "reference is {}x{}, output is {}x{out_h}",
                        r.width(),
                        r.height(),
                        plane.width()
                    ),
                ));
            }
            Some(r) => Some(r.samples_f32()),
            None => None,
        };

        let cfg = self.config;
        let step = plane.eight_bit_step();
        let alpha = cfg.alpha * step;
        let (lo, hi) = (cfg.vthresh_lo * step, cfg.vthresh_hi * step);
        let radius = cfg.radius as isize;
        let half = cfg.window as isize;

        double_rows("edge doubler", plane, field, double_height, |lines, above, m, row| {
            let up = lines.line(above);
            let dn = lines.line(above + 1);
            let last = row.len() as isize - 1;
            let at = |line: &[f32], x: isize| line[x.clamp(0, last) as usize];

            let cost = |x: isize, d: isize| -> f32 {
                let sad: f32 = (-half..=half)
                    .map(|k| (at(up, x + d + k) - at(dn, x - d + k)).abs())
                    .sum();
                sad + alpha * d.unsigned_abs() as f32
            };

            for (xi, out) in row.iter_mut().enumerate() {
                let x = xi as isize;
                let mut best = (cost(x, 0), 0isize);
                for a in 1..=radius {
                    for d in [-a, a] {
                        let c = cost(x, d);
                        if c < best.0 {
                            best = (c, d);
                        }
                    }
                }
                let d = best.1;
                let mut v = 0.5 * (at(up, x + d) + at(dn, x - d));

                if let Some(r) = &reference {
                    let rv = r.row(m)[xi];
                    let dev = (v - rv).abs();
                    let t = if hi > lo {
                        ((dev - lo) / (hi - lo)).clamp(0.0, 1.0)
                    } else if dev > lo {
                        1.0
                    } else {
                        0.0
                    };
                    v += t * (rv - v);
                }
                *out = v;
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{EdgeLineAverage, EdgeLineConfig};
    use crate::{CubicLineDoubler, DoublingFilter, EdgeDirectedFilter, Field};
    use ps_core::{Error, Image, Plane, Range};

    /// Each row `y` is dark left of `2y` and bright from there on.
    fn diagonal_step(width: usize, height: usize) -> Plane {
        let data = (0..width * height)
            .map(|i| if i % width >= 2 * (i / width) { 200u8 } else { 0 })
            .collect();
        Plane::from_u8(&Image::from_vec(width, height, data).expect("valid image"), Range::Full)
    }

    #[test]
    fn diagonal_edges_stay_sharp() {
        let plane = diagonal_step(24, 8);
        let edge = EdgeLineAverage::default()
            .double_checked(&plane, Field::Top, true, None)
            .expect("doubled")
            .samples_f32();
        let cubic = CubicLineDoubler
            .double(&plane, Field::Top, true)
            .expect("doubled")
            .samples_f32();

        for k in 2..6 {
            let m = 2 * k + 1;
            assert!(edge.row(m).iter().all(|&v| v == 0.0 || v == 200.0), "row {m}");
            // The missing line's edge sits halfway: at 2k + 1.
            assert_eq!(edge.row(m)[2 * k], 0.0);
            assert_eq!(edge.row(m)[2 * k + 1], 200.0);
            assert!(cubic.row(m).iter().any(|&v| v > 0.0 && v < 200.0));
        }
    }

    #[test]
    fn reference_overrides_large_deviations() {
        let plane = Plane::from_u8(&Image::new_fill(6, 3, 0u8), Range::Full);
        let reference = Plane::from_u8(&Image::new_fill(6, 6, 100u8), Range::Full);
        let out = EdgeLineAverage::default()
            .double_checked(&plane, Field::Top, true, Some(&reference))
            .expect("doubled")
            .samples_f32();

        for m in 0..6 {
            let expected = if m % 2 == 0 { 0.0 } else { 100.0 };
            assert!(out.row(m).iter().all(|&v| v == expected), "row {m}");
        }
    }

    #[test]
    fn small_deviations_blend_linearly() {
        let plane = Plane::from_u8(&Image::new_fill(4, 2, 0u8), Range::Full);
        let reference = Plane::from_u8(&Image::new_fill(4, 4, 18u8), Range::Full);
        let out = EdgeLineAverage::new(EdgeLineConfig::default())
            .double_checked(&plane, Field::Top, true, Some(&reference))
            .expect("doubled")
            .samples_f32();
        // dev 18 is halfway between 12 and 24: 0 + 0.5 * 18 = 9.
        assert_eq!(out.row(1)[0], 9.0);
    }

    #[test]
    fn mismatched_reference_is_rejected() {
        let plane = Plane::from_u8(&Image::new_fill(4, 2, 0u8), Range::Full);
        let reference = Plane::from_u8(&Image::new_fill(4, 2, 0u8), Range::Full);
        let err = EdgeLineAverage::default()
            .double_checked(&plane, Field::Top, true, Some(&reference))
            .unwrap_err();
        assert!(matches!(err, Error::Precondition { .. }));
    }
}
