use ps_core::{Error, Image, Plane};

use crate::neighborhood::{OFFSETS, clamped};

/// Clamps `clip` to a rank window of `repair_clip`'s 3x3 neighbourhood.
///
/// - `0` returns `clip` unchanged;
/// - `1..=4`: the 8 neighbours plus the centre are sorted and `clip` is
///   clamped to `[mode-th smallest, mode-th largest]`;
/// - `11..=14`: with `m = mode - 10`, the 8 neighbours alone are sorted and
///   the `m`-th smallest/largest bounds are widened to include the centre;
/// - a negative mode swaps the two planes.
///
/// With `pixel` strictly between 0 and 1 in magnitude, the neighbours are
/// first pulled towards the centre, emulating a sub-pixel neighbourhood:
/// axial ones to `a·p + c·q`, diagonal ones to `d·p² + (h + v)·p·q + c·q²`,
/// with `p = |pixel|` and `q = 1 - p`.
pub fn repair(clip: &Plane, repair_clip: &Plane, mode: i32, pixel: Option<f64>) -> Result<Plane, Error> {
    if mode == 0 {
        return Ok(clip.clone());
    }
    if !matches!(mode.unsigned_abs(), 1..=4 | 11..=14) {
        return Err(Error::validation(
            "repair",
            format!("mode {mode} is not one of 1-4 or 11-14"),
        ));
    }
    if mode < 0 {
        return repair(repair_clip, clip, -mode, pixel);
    }
    let subpixel = match pixel.map(f64::abs) {
        Some(p) if !p.is_finite() => {
            return Err(Error::validation("repair", format!("pixel must be finite, got {p}")));
        }
        Some(p) if p > 1.0 => {
            return Err(Error::validation(
                "repair",
                format!("cannot shift by more than one pixel, got {p}"),
            ));
        }
        Some(p) if p != 1.0 => Some(p as f32),
        _ => None,
    };
    if clip.width() != repair_clip.width()
        || clip.height() != repair_clip.height()
        || clip.format() != repair_clip.format()
    {
        return Err(Error::precondition(
            "repair",
            "clip and repair clip differ in size or format",
        ));
    }

    let src = clip.samples_f32();
    let rep = repair_clip.samples_f32();
    let mode = mode as usize;

    let mut out = Image::new_fill(src.width(), src.height(), 0.0f32);
    let mut sorted = [0.0f32; 9];
    for y in 0..src.height() {
        for x in 0..src.width() {
            let centre = rep.row(y)[x];
            let mut n = OFFSETS.map(|(dx, dy)| clamped(&rep, x, y, dx, dy));
            if let Some(p) = subpixel {
                shift_towards_centre(&mut n, centre, p);
            }

            let (lo, hi) = if mode <= 4 {
                sorted[..8].copy_from_slice(&n);
                sorted[8] = centre;
                sorted.sort_by(f32::total_cmp);
                (sorted[mode - 1], sorted[9 - mode])
            } else {
                let m = mode - 10;
                let ring = &mut sorted[..8];
                ring.copy_from_slice(&n);
                ring.sort_by(f32::total_cmp);
                (ring[m - 1].min(centre), ring[8 - m].max(centre))
            };
            // NaN bounds pass the sample through instead of panicking.
            out.row_mut(y)[x] = src.row(y)[x].max(lo).min(hi);
        }
    }

    Ok(clip.with_samples_f32(out))
}

/// `n` in [`OFFSETS`] order: tl, t, tr, l, r, bl, b, br.
fn shift_towards_centre(n: &mut [f32; 8], c: f32, p: f32) {
    let q = 1.0 - p;
    let [tl, t, tr, l, r, bl, b, br] = *n;
    let diag = |d: f32, h: f32, v: f32| d * p * p + (h + v) * p * q + c * q * q;
    let axial = |a: f32| a * p + c * q;
    *n = [
        diag(tl, l, t),
        axial(t),
        diag(tr, r, t),
        axial(l),
        axial(r),
        diag(bl, l, b),
        axial(b),
        diag(br, r, b),
    ];
}
