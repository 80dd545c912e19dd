use ps_core::{Error, Margins, Raster, Rect};

/// A buffer paired with its effective source window.
///
/// The window `(sx, sy, sw, sh)` is expressed in the buffer's own pixel
/// coordinates: it is exactly the `src_left/src_top/src_width/src_height`
/// a resize of this buffer would need to address the effective region.
/// A fresh value covers the whole buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowedImage<B> {
    buffer: B,
    window: Rect,
}

/// Field substitutions for [`WindowedImage::copy_with`]. `None` inherits.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowPatch<B> {
    pub buffer: Option<B>,
    pub sx: Option<f64>,
    pub sy: Option<f64>,
    pub sw: Option<f64>,
    pub sh: Option<f64>,
}

impl<B> Default for WindowPatch<B> {
    fn default() -> Self {
        Self {
            buffer: None,
            sx: None,
            sy: None,
            sw: None,
            sh: None,
        }
    }
}

impl<B> WindowPatch<B> {
    pub fn buffer(buffer: B) -> Self {
        Self {
            buffer: Some(buffer),
            ..Self::default()
        }
    }

    pub fn with_sy(mut self, sy: f64) -> Self {
        self.sy = Some(sy);
        self
    }

    pub fn with_sh(mut self, sh: f64) -> Self {
        self.sh = Some(sh);
        self
    }
}

impl<B: Raster> WindowedImage<B> {
    pub fn new(buffer: B) -> Self {
        let window = Rect::full(buffer.width(), buffer.height());
        Self { buffer, window }
    }

    pub fn with_window(buffer: B, window: Rect) -> Self {
        Self { buffer, window }
    }

    pub fn buffer(&self) -> &B {
        &self.buffer
    }

    pub fn into_buffer(self) -> B {
        self.buffer
    }

    pub fn window(&self) -> Rect {
        self.window
    }

    pub fn width(&self) -> usize {
        self.buffer.width()
    }

    pub fn height(&self) -> usize {
        self.buffer.height()
    }

    /// Copies `self`, substituting the fields present in `patch`.
    pub fn copy_with(&self, patch: WindowPatch<B>) -> Self
    where
        B: Clone,
    {
        let w = self.window;
        Self {
            buffer: patch.buffer.unwrap_or_else(|| self.buffer.clone()),
            window: Rect::new(
                patch.sx.unwrap_or(w.x),
                patch.sy.unwrap_or(w.y),
                patch.sw.unwrap_or(w.w),
                patch.sh.unwrap_or(w.h),
            ),
        }
    }

    /// Transposes the buffer and swaps the window axes.
    pub fn transpose(&self) -> Self {
        Self {
            buffer: self.buffer.transpose(),
            window: self.window.transposed(),
        }
    }

    /// Consuming form of [`Self::transpose`].
    pub fn into_transposed(self) -> Self {
        self.transpose()
    }

    /// Removes pixel margins and shifts the window offset accordingly.
    ///
    /// All-zero margins return `self` without touching the buffer.
    pub fn crop(self, margins: Margins) -> Result<Self, Error> {
        if margins.is_zero() {
            return Ok(self);
        }
        let buffer = self.buffer.crop(margins)?;
        let w = self.window;
        Ok(Self {
            buffer,
            window: Rect::new(
                w.x - margins.left as f64,
                w.y - margins.top as f64,
                w.w,
                w.h,
            ),
        })
    }

    /// Swaps in a buffer of exactly twice the resolution, produced outside
    /// the engine, and scales the window by two.
    pub fn double_replace(self, larger: B) -> Result<Self, Error> {
        let (w, h) = (self.width(), self.height());
        if larger.width() != 2 * w || larger.height() != 2 * h {
            return Err(Error::precondition(
                "double_replace",
                format!(
                    "expected a {}x{} buffer, got {}x{}",
                    2 * w,
                    2 * h,
                    larger.width(),
                    larger.height()
                ),
            ));
        }
        let r = self.window;
        Ok(Self {
            buffer: larger,
            window: Rect::new(2.0 * r.x, 2.0 * r.y, 2.0 * r.w, 2.0 * r.h),
        })
    }

    /// Runs a size-preserving buffer function and keeps the window.
    pub fn map_buffer(self, f: impl FnOnce(B) -> Result<B, Error>) -> Result<Self, Error> {
        let (w, h) = (self.width(), self.height());
        let buffer = f(self.buffer)?;
        if buffer.width() != w || buffer.height() != h {
            return Err(Error::precondition(
                "map_buffer",
                format!(
                    "buffer changed size from {w}x{h} to {}x{}",
                    buffer.width(),
                    buffer.height()
                ),
            ));
        }
        Ok(Self {
            buffer,
            window: self.window,
        })
    }
}
