use serde::{Deserialize, Serialize};

/// Continuous rectangle in the pixel units of some buffer.
///
/// Used both for windows (`sx, sy, sw, sh`) and for the source rectangles
/// passed to resampling primitives (`src_left, src_top, src_width,
/// src_height`).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    /// Full extent of a `width × height` buffer.
    pub fn full(width: usize, height: usize) -> Self {
        Self::new(0.0, 0.0, width as f64, height as f64)
    }

    /// Swaps the horizontal and vertical components.
    pub fn transposed(self) -> Self {
        Self::new(self.y, self.x, self.h, self.w)
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.w.is_finite() && self.h.is_finite()
    }
}

/// Integer pixel margins, used for crops and inserted borders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Margins {
    pub left: usize,
    pub right: usize,
    pub top: usize,
    pub bottom: usize,
}

impl Margins {
    pub const fn new(left: usize, right: usize, top: usize, bottom: usize) -> Self {
        Self {
            left,
            right,
            top,
            bottom,
        }
    }

    pub const fn uniform(n: usize) -> Self {
        Self::new(n, n, n, n)
    }

    pub const fn is_zero(&self) -> bool {
        self.left == 0 && self.right == 0 && self.top == 0 && self.bottom == 0
    }

    pub const fn horizontal(&self) -> usize {
        self.left + self.right
    }

    pub const fn vertical(&self) -> usize {
        self.top + self.bottom
    }

    pub const fn transposed(self) -> Self {
        Self::new(self.top, self.bottom, self.left, self.right)
    }
}

#[cfg(test)]
mod tests {
    use super::{Margins, Rect};

    #[test]
    fn rect_transpose_swaps_axes() {
        let r = Rect::new(0.25, -1.5, 384.0, 216.0);
        assert_eq!(r.transposed(), Rect::new(-1.5, 0.25, 216.0, 384.0));
        assert_eq!(r.transposed().transposed(), r);
    }

    #[test]
    fn margins_sums_and_zero() {
        let m = Margins::new(1, 2, 3, 4);
        assert_eq!(m.horizontal(), 3);
        assert_eq!(m.vertical(), 7);
        assert!(!m.is_zero());
        assert!(Margins::default().is_zero());
        assert_eq!(m.transposed(), Margins::new(3, 4, 1, 2));
    }
}
