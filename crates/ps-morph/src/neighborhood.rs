use ps_core::{BorderMode, Image, Plane, map_index};

/// Offsets of the 8-neighbourhood, row by row, centre excluded.
pub(crate) const OFFSETS: [(isize, isize); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// Sample at `(x + dx, y + dy)` with edge-clamped coordinates.
#[inline]
pub(crate) fn clamped(img: &Image<f32>, x: usize, y: usize, dx: isize, dy: isize) -> f32 {
    let mode = BorderMode::<f32>::Clamp;
    let nx = map_index(x as isize + dx, img.width(), &mode).unwrap_or(x);
    let ny = map_index(y as isize + dy, img.height(), &mode).unwrap_or(y);
    img.row(ny)[nx]
}

/// Applies `f(centre, neighbours)` at every pixel.
pub(crate) fn map3x3(img: &Image<f32>, f: impl Fn(f32, &[f32; 8]) -> f32) -> Image<f32> {
    let mut out = Image::new_fill(img.width(), img.height(), 0.0f32);
    for y in 0..img.height() {
        for x in 0..img.width() {
            let n = OFFSETS.map(|(dx, dy)| clamped(img, x, y, dx, dy));
            out.row_mut(y)[x] = f(img.row(y)[x], &n);
        }
    }
    out
}

fn on_samples(plane: &Plane, f: impl Fn(f32, &[f32; 8]) -> f32) -> Plane {
    plane.with_samples_f32(map3x3(&plane.samples_f32(), f))
}

fn mean8(n: &[f32; 8]) -> f32 {
    n.iter().sum::<f32>() / 8.0
}

/// 3x3 maximum.
pub fn maximum(plane: &Plane) -> Plane {
    on_samples(plane, |c, n| n.iter().fold(c, |a, &b| a.max(b)))
}

/// 3x3 minimum.
pub fn minimum(plane: &Plane) -> Plane {
    on_samples(plane, |c, n| n.iter().fold(c, |a, &b| a.min(b)))
}

/// Raises each sample to the mean of its 8 neighbours when that is larger.
pub fn inflate(plane: &Plane) -> Plane {
    on_samples(plane, |c, n| c.max(mean8(n)))
}

/// Lowers each sample to the mean of its 8 neighbours when that is smaller.
pub fn deflate(plane: &Plane) -> Plane {
    on_samples(plane, |c, n| c.min(mean8(n)))
}

/// Samples at or above `threshold` become the plane's peak, others zero.
pub fn binarize(plane: &Plane, threshold: f32) -> Plane {
    let peak = plane.peak();
    let samples = plane.samples_f32();
    plane.with_samples_f32(samples.map(|&v| if v >= threshold { peak } else { 0.0 }))
}

/// Prewitt gradient magnitude, clamped to the plane's range.
pub fn prewitt(plane: &Plane) -> Plane {
    let peak = plane.peak();
    on_samples(plane, |_, n| {
        let [tl, t, tr, l, r, bl, b, br] = *n;
        let gx = (tr + r + br) - (tl + l + bl);
        let gy = (bl + b + br) - (tl + t + tr);
        (gx * gx + gy * gy).sqrt().min(peak)
    })
}

/// Applies `op` `times` times.
pub fn repeat(plane: &Plane, times: usize, op: fn(&Plane) -> Plane) -> Plane {
    let mut out = plane.clone();
    for _ in 0..times {
        out = op(&out);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::{binarize, deflate, inflate, maximum, minimum, prewitt, repeat};
    use ps_core::{Image, Plane, Range};

    fn plane(width: usize, height: usize, data: Vec<u8>) -> Plane {
        Plane::from_u8(&Image::from_vec(width, height, data).expect("valid image"), Range::Full)
    }

    fn values(p: &Plane) -> Vec<f32> {
        p.samples_f32().into_vec()
    }

    #[test]
    fn maximum_spreads_a_single_peak() {
        let mut data = vec![0u8; 25];
        data[12] = 90;
        let out = maximum(&plane(5, 5, data));
        let v = values(&out);
        for y in 0..5 {
            for x in 0..5 {
                let inside = (1..=3).contains(&x) && (1..=3).contains(&y);
                assert_eq!(v[y * 5 + x], if inside { 90.0 } else { 0.0 });
            }
        }
    }

    #[test]
    fn repeated_maximum_reaches_the_edges_by_clamping() {
        let mut data = vec![0u8; 25];
        data[0] = 7;
        let out = repeat(&plane(5, 5, data), 4, maximum);
        assert!(values(&out).iter().all(|&v| v == 7.0));
    }

    #[test]
    fn minimum_removes_a_speck() {
        let mut data = vec![50u8; 9];
        data[4] = 200;
        assert!(values(&minimum(&plane(3, 3, data))).iter().all(|&v| v == 50.0));
    }

    #[test]
    fn inflate_only_raises_and_deflate_only_lowers() {
        let mut data = vec![80u8; 9];
        data[4] = 0;
        let p = plane(3, 3, data);
        assert_eq!(values(&inflate(&p))[4], 80.0);
        assert_eq!(values(&deflate(&p))[4], 0.0);

        let mut data = vec![0u8; 9];
        data[4] = 80;
        let p = plane(3, 3, data);
        assert_eq!(values(&inflate(&p))[4], 80.0);
        assert_eq!(values(&deflate(&p))[4], 0.0);
    }

    #[test]
    fn binarize_uses_greater_or_equal() {
        let out = binarize(&plane(3, 1, vec![9, 10, 11]), 10.0);
        assert_eq!(values(&out), [0.0, 255.0, 255.0]);
    }

    #[test]
    fn prewitt_is_zero_on_flat_and_strong_on_steps() {
        assert!(values(&prewitt(&plane(3, 3, vec![40; 9]))).iter().all(|&v| v == 0.0));

        let step = plane(4, 3, vec![0, 0, 30, 30, 0, 0, 30, 30, 0, 0, 30, 30]);
        let v = values(&prewitt(&step));
        // Across the step: three columns of 30 on the right minus zero.
        assert_eq!(v[4 + 1], 90.0);
        assert_eq!(v[4 + 2], 90.0);
    }
}
