use log::debug;
use ps_core::{Error, Plane, SampleFormat};
use serde::{Deserialize, Serialize};

use crate::neighborhood::{binarize, deflate, inflate, maximum, prewitt, repeat};

/// Parameters of [`descale_aa_mask`]. Thresholds are on the 8-bit scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DescaleMaskConfig {
    /// Rescale error at or above which a pixel is considered not native.
    pub thr: f64,
    /// Edge strength at or below which the edge mask is cleared.
    pub thr_lo: f64,
    /// Edge strength at or above which the edge mask saturates.
    pub thr_hi: f64,
    pub expand: usize,
    pub inflate: usize,
    pub pexpand: usize,
    pub pinflate: usize,
    /// Return the binarized error mask even when a rescaled plane is given.
    pub show_credit: bool,
}

impl Default for DescaleMaskConfig {
    fn default() -> Self {
        Self {
            thr: 10.0,
            thr_lo: 4.0,
            thr_hi: 24.0,
            expand: 3,
            inflate: 3,
            pexpand: 0,
            pinflate: 0,
            show_credit: false,
        }
    }
}

/// Converts an 8-bit-scale threshold to `plane` units.
///
/// Integer planes use `floor(v * peak / 255)`. Float planes treat the value
/// as limited-range steps, `v / 219`.
fn scale_threshold(plane: &Plane, v: f64) -> f32 {
    match plane.format() {
        SampleFormat::Int { .. } => (v * f64::from(plane.peak()) / 255.0).floor() as f32,
        SampleFormat::Float => (v / 219.0) as f32,
    }
}

/// Builds the rescale-error mask from a descale diff plane.
///
/// The diff is grown with `expand` maxima and `inflate` inflations. Without
/// a `rescaled` plane, or with `show_credit`, that grown diff is binarized at
/// `thr`. Otherwise the result is a Prewitt edge mask of `rescaled` (grown by
/// `pexpand`/`pinflate`, cleared at `thr_lo`, saturated at `thr_hi`) kept only
/// where the grown diff stays below `thr`, then inflated and deflated once.
pub fn descale_aa_mask(
    diff: &Plane,
    rescaled: Option<&Plane>,
    config: &DescaleMaskConfig,
) -> Result<Plane, Error> {
    let thr = scale_threshold(diff, config.thr);
    let grown = repeat(&repeat(diff, config.expand, maximum), config.inflate, inflate);
    debug!("descale mask: thr {} -> {thr}", config.thr);

    let rescaled = match rescaled {
        Some(r) if !config.show_credit => r,
        _ => return Ok(binarize(&grown, thr)),
    };
    if rescaled.width() != diff.width() || rescaled.height() != diff.height() {
        return Err(Error::precondition(
            "descale_aa_mask",
            format!(
                "rescaled plane is {}x{}, diff is {}x{}",
                rescaled.width(),
                rescaled.height(),
                diff.width(),
                diff.height()
            ),
        ));
    }

    let lo = scale_threshold(rescaled, config.thr_lo);
    let hi = scale_threshold(rescaled, config.thr_hi);
    let peak = rescaled.peak();
    let edges = repeat(
        &repeat(&prewitt(rescaled), config.pexpand, maximum),
        config.pinflate,
        inflate,
    )
    .samples_f32()
    .map(|&v| {
        if v >= hi {
            peak
        } else if v <= lo {
            0.0
        } else {
            v
        }
    });

    // Edge strengths move to the diff plane's code range.
    let to_diff = diff.peak() / peak;
    let combined = grown
        .samples_f32()
        .zip_map(&edges, |d, e| if d >= thr { 0.0 } else { e * to_diff })?;

    Ok(deflate(&inflate(&diff.with_samples_f32(combined))))
}

#[cfg(test)]
mod tests {
    use super::{DescaleMaskConfig, descale_aa_mask, scale_threshold};
    use ps_core::{Image, Plane, Range};

    fn plane(width: usize, height: usize, data: Vec<u8>, range: Range) -> Plane {
        Plane::from_u8(&Image::from_vec(width, height, data).expect("valid image"), range)
    }

    #[test]
    fn thresholds_follow_depth() {
        let ten = Plane::new_int(10, Range::Full, Image::new_fill(1, 1, 0u16)).expect("valid plane");
        assert_eq!(scale_threshold(&ten, 10.0), 40.0);
        let float = Plane::Float(Image::new_fill(1, 1, 0.0));
        assert_eq!(scale_threshold(&float, 219.0), 1.0);
    }

    #[test]
    fn credit_mask_grows_error_spots() {
        let mut data = vec![0u8; 81];
        data[40] = 30;
        let diff = plane(9, 9, data, Range::Full);
        let config = DescaleMaskConfig {
            expand: 1,
            inflate: 0,
            ..DescaleMaskConfig::default()
        };

        let mask = descale_aa_mask(&diff, None, &config).expect("mask").samples_f32();
        let set = mask.data().iter().filter(|&&v| v == 255.0).count();
        assert_eq!(set, 9);
        assert!(mask.data().iter().all(|&v| v == 0.0 || v == 255.0));
    }

    #[test]
    fn edge_mask_is_suppressed_where_error_is_high() {
        // Vertical step edge across the whole plane.
        let rescaled = plane(
            12,
            8,
            (0..96).map(|i| if i % 12 < 6 { 16 } else { 200 }).collect(),
            Range::Limited,
        );
        let quiet = plane(12, 8, vec![0; 96], Range::Full);
        let mut loud_data = vec![0u8; 96];
        for y in 0..8 {
            loud_data[y * 12 + 5] = 80;
            loud_data[y * 12 + 6] = 80;
        }
        let loud = plane(12, 8, loud_data, Range::Full);
        // Widen the edge band so the final inflate/deflate leaves its core at peak.
        let config = DescaleMaskConfig {
            pexpand: 2,
            ..DescaleMaskConfig::default()
        };

        let kept = descale_aa_mask(&quiet, Some(&rescaled), &config)
            .expect("mask")
            .samples_f32();
        assert_eq!(kept.row(4)[6], 255.0);
        assert_eq!(kept.row(4)[0], 0.0);

        let dropped = descale_aa_mask(&loud, Some(&rescaled), &config)
            .expect("mask")
            .samples_f32();
        assert!(dropped.data().iter().all(|&v| v == 0.0));

        let credit = DescaleMaskConfig {
            show_credit: true,
            ..config
        };
        let binary = descale_aa_mask(&quiet, Some(&rescaled), &credit).expect("mask");
        assert!(binary.samples_f32().data().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn mismatched_rescaled_plane_is_rejected() {
        let diff = plane(4, 4, vec![0; 16], Range::Full);
        let rescaled = plane(4, 2, vec![0; 8], Range::Limited);
        assert!(descale_aa_mask(&diff, Some(&rescaled), &DescaleMaskConfig::default()).is_err());
    }

    #[test]
    fn config_reads_partial_json() {
        let c: DescaleMaskConfig = serde_json::from_str(r#"{"thr": 6, "expand": 2}"#).expect("valid json");
        assert_eq!(c.thr, 6.0);
        assert_eq!(c.expand, 2);
        assert_eq!(c.inflate, 3);
    }
}
