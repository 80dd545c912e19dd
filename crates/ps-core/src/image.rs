use crate::border::{BorderMode, map_index};
use crate::geom::Margins;
use crate::Error;

/// Owned row-major sample grid.
#[derive(Debug, Clone, PartialEq)]
pub struct Image<T> {
    width: usize,
    height: usize,
    data: Vec<T>,
}

impl<T> Image<T> {
    pub fn from_vec(width: usize, height: usize, data: Vec<T>) -> Result<Self, Error> {
        let expected = width.checked_mul(height).ok_or(Error::SizeMismatch {
            expected: usize::MAX,
            actual: data.len(),
        })?;

        if data.len() != expected {
            return Err(Error::SizeMismatch {
                expected,
                actual: data.len(),
            });
        }

        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn data(&self) -> &[T] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [T] {
        &mut self.data
    }

    pub fn into_vec(self) -> Vec<T> {
        self.data
    }

    pub fn row(&self, y: usize) -> &[T] {
        assert!(y < self.height, "row index out of bounds");
        let start = y * self.width;
        &self.data[start..start + self.width]
    }

    pub fn row_mut(&mut self, y: usize) -> &mut [T] {
        assert!(y < self.height, "row index out of bounds");
        let start = y * self.width;
        &mut self.data[start..start + self.width]
    }

    pub fn get(&self, x: usize, y: usize) -> Option<&T> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.data.get(y * self.width + x)
    }

    pub fn same_size<U>(&self, other: &Image<U>) -> bool {
        self.width == other.width && self.height == other.height
    }

    pub fn map<U>(&self, f: impl FnMut(&T) -> U) -> Image<U> {
        Image {
            width: self.width,
            height: self.height,
            data: self.data.iter().map(f).collect(),
        }
    }
}

impl<T: Copy> Image<T> {
    pub fn new_fill(width: usize, height: usize, value: T) -> Self {
        let len = width.checked_mul(height).expect("image size overflow");
        Self {
            width,
            height,
            data: vec![value; len],
        }
    }

    /// Matrix transpose: sample `(x, y)` moves to `(y, x)`.
    pub fn transposed(&self) -> Self {
        let (w, h) = (self.width, self.height);
        let mut data = Vec::with_capacity(w * h);
        for x in 0..w {
            for y in 0..h {
                data.push(self.data[y * w + x]);
            }
        }
        Self {
            width: h,
            height: w,
            data,
        }
    }

    /// Removes `m` from the edges. Margins that consume the whole image are
    /// rejected.
    pub fn cropped(&self, m: Margins) -> Result<Self, Error> {
        if m.horizontal() >= self.width || m.vertical() >= self.height {
            return Err(Error::OutOfBounds);
        }
        let (w, h) = (self.width - m.horizontal(), self.height - m.vertical());
        let mut data = Vec::with_capacity(w * h);
        for y in m.top..m.top + h {
            data.extend_from_slice(&self.row(y)[m.left..m.left + w]);
        }
        Ok(Self {
            width: w,
            height: h,
            data,
        })
    }

    /// Grows the image by `m`, filling new samples according to `border`.
    pub fn padded(&self, m: Margins, border: &BorderMode<T>) -> Self {
        let out_w = self.width + m.horizontal();
        let out_h = self.height + m.vertical();
        if self.width == 0 || self.height == 0 {
            if let BorderMode::Constant(v) = border {
                return Self::new_fill(out_w, out_h, *v);
            }
            panic!("cannot pad an empty image with a non-constant border");
        }

        let mut data = Vec::with_capacity(out_w * out_h);
        for oy in 0..out_h {
            let sy = map_index(oy as isize - m.top as isize, self.height, border);
            for ox in 0..out_w {
                let sx = map_index(ox as isize - m.left as isize, self.width, border);
                let v = match (sx, sy, border) {
                    (Some(sx), Some(sy), _) => self.data[sy * self.width + sx],
                    (_, _, BorderMode::Constant(c)) => *c,
                    _ => unreachable!("non-constant borders map every index"),
                };
                data.push(v);
            }
        }
        Self {
            width: out_w,
            height: out_h,
            data,
        }
    }

    /// Combines two equally sized images sample by sample.
    pub fn zip_map<U: Copy, V>(
        &self,
        other: &Image<U>,
        mut f: impl FnMut(T, U) -> V,
    ) -> Result<Image<V>, Error> {
        if !self.same_size(other) {
            return Err(Error::SizeMismatch {
                expected: self.data.len(),
                actual: other.data.len(),
            });
        }
        Ok(Image {
            width: self.width,
            height: self.height,
            data: self
                .data
                .iter()
                .zip(other.data.iter())
                .map(|(&a, &b)| f(a, b))
                .collect(),
        })
    }
}
