/// Smooth normalised luma, roughly within `[0.2, 0.8]`.
pub fn smooth_f32(width: usize, height: usize) -> Vec<f32> {
    assert!(width > 0 && height > 0, "image dimensions must be positive");

    let mut img = vec![0.0f32; width * height];
    for y in 0..height {
        for x in 0..width {
            let (fx, fy) = (x as f32, y as f32);
            img[y * width + x] = 0.5 + 0.2 * (fx / 6.0).sin() * (fy / 9.0).cos() + 0.1 * (fx / 17.0).cos();
        }
    }
    img
}

/// One-pixel checkerboard of limited-range black and white, the finest
/// detail an 8-bit plane can carry.
pub fn fine_checker_u8(width: usize, height: usize) -> Vec<u8> {
    assert!(width > 0 && height > 0, "image dimensions must be positive");

    let mut img = vec![0u8; width * height];
    for y in 0..height {
        for x in 0..width {
            img[y * width + x] = if (x + y) & 1 == 0 { 16 } else { 235 };
        }
    }
    img
}
