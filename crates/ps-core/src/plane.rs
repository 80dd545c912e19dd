use serde::{Deserialize, Serialize};

use crate::border::BorderMode;
use crate::geom::Margins;
use crate::image::Image;
use crate::Error;

/// Signal range of integer samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Range {
    /// Black at `16 << (bits - 8)`, white at `235 << (bits - 8)`.
    #[default]
    Limited,
    /// Black at `0`, white at `2^bits - 1`.
    Full,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleType {
    Integer,
    Float,
}

/// Target description for depth conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SampleFormat {
    Int { bits: u8, range: Range },
    Float,
}

impl SampleFormat {
    pub fn bits(&self) -> u8 {
        match self {
            Self::Int { bits, .. } => *bits,
            Self::Float => 32,
        }
    }

    pub fn sample_type(&self) -> SampleType {
        match self {
            Self::Int { .. } => SampleType::Integer,
            Self::Float => SampleType::Float,
        }
    }
}

/// One channel of samples.
///
/// Integer planes of any depth in `8..=16` are stored as `u16`.
#[derive(Debug, Clone, PartialEq)]
pub enum Plane {
    Int {
        bits: u8,
        range: Range,
        image: Image<u16>,
    },
    Float(Image<f32>),
}

impl Plane {
    pub fn new_int(bits: u8, range: Range, image: Image<u16>) -> Result<Self, Error> {
        if !(8..=16).contains(&bits) {
            return Err(Error::precondition(
                "Plane::new_int",
                format!("unsupported bit depth {bits}"),
            ));
        }
        let peak = int_peak(bits);
        if image.data().iter().any(|&v| u32::from(v) > peak) {
            return Err(Error::precondition(
                "Plane::new_int",
                format!("sample exceeds {bits}-bit peak {peak}"),
            ));
        }
        Ok(Self::Int { bits, range, image })
    }

    pub fn from_u8(image: &Image<u8>, range: Range) -> Self {
        Self::Int {
            bits: 8,
            range,
            image: image.map(|&v| u16::from(v)),
        }
    }

    pub fn width(&self) -> usize {
        match self {
            Self::Int { image, .. } => image.width(),
            Self::Float(image) => image.width(),
        }
    }

    pub fn height(&self) -> usize {
        match self {
            Self::Int { image, .. } => image.height(),
            Self::Float(image) => image.height(),
        }
    }

    pub fn format(&self) -> SampleFormat {
        match self {
            Self::Int { bits, range, .. } => SampleFormat::Int {
                bits: *bits,
                range: *range,
            },
            Self::Float(_) => SampleFormat::Float,
        }
    }

    pub fn bits(&self) -> u8 {
        self.format().bits()
    }

    pub fn sample_type(&self) -> SampleType {
        self.format().sample_type()
    }

    /// Largest representable code value (`1.0` for float).
    pub fn peak(&self) -> f32 {
        match self {
            Self::Int { bits, .. } => int_peak(*bits) as f32,
            Self::Float(_) => 1.0,
        }
    }

    /// Code value of black for this plane's format.
    pub fn black(&self) -> f32 {
        match self {
            Self::Int {
                bits,
                range: Range::Limited,
                ..
            } => (16u32 << eight_bit_shift(*bits)) as f32,
            _ => 0.0,
        }
    }

    /// Size of one 8-bit code step in this plane's sample units.
    ///
    /// Integer planes scale by `2^(bits - 8)`. Float planes hold normalised
    /// luma, where one limited-range step is `1 / 219`.
    pub fn eight_bit_step(&self) -> f32 {
        match self {
            Self::Int { bits, .. } => (1u32 << eight_bit_shift(*bits)) as f32,
            Self::Float(_) => 1.0 / 219.0,
        }
    }

    /// Raw code values widened to `f32` without normalisation.
    pub fn samples_f32(&self) -> Image<f32> {
        match self {
            Self::Int { image, .. } => image.map(|&v| f32::from(v)),
            Self::Float(image) => image.clone(),
        }
    }

    /// Builds a plane of this plane's format from raw code values, rounding
    /// and clamping for integer formats.
    pub fn with_samples_f32(&self, samples: Image<f32>) -> Plane {
        match self {
            Self::Int { bits, range, .. } => {
                let peak = int_peak(*bits) as f32;
                Self::Int {
                    bits: *bits,
                    range: *range,
                    image: samples.map(|&v| v.round().clamp(0.0, peak) as u16),
                }
            }
            Self::Float(_) => Self::Float(samples),
        }
    }

    /// Grows the plane by `m` constant samples. `color` is a code value;
    /// `None` fills with black.
    pub fn padded(&self, m: Margins, color: Option<f64>) -> Plane {
        let fill = color.map(|c| c as f32).unwrap_or_else(|| self.black());
        match self {
            Self::Int { bits, range, image } => {
                let peak = int_peak(*bits) as f32;
                let v = fill.round().clamp(0.0, peak) as u16;
                Self::Int {
                    bits: *bits,
                    range: *range,
                    image: image.padded(m, &BorderMode::Constant(v)),
                }
            }
            Self::Float(image) => Self::Float(image.padded(m, &BorderMode::Constant(fill))),
        }
    }
}

pub(crate) fn int_peak(bits: u8) -> u32 {
    (1u32 << bits) - 1
}

/// Shift from 8-bit code values to `bits`. Depths below 8 are treated as 8.
pub(crate) fn eight_bit_shift(bits: u8) -> u8 {
    bits.saturating_sub(8)
}

/// The buffer operations the window engine relies on.
///
/// Implementors must keep `transpose` an involution and make `crop` remove
/// exactly the requested margins.
pub trait Raster: Sized {
    fn width(&self) -> usize;
    fn height(&self) -> usize;
    fn transpose(&self) -> Self;
    fn crop(&self, margins: Margins) -> Result<Self, Error>;
}

/// Access to the luma (first) plane of a buffer.
pub trait LumaPlane {
    fn luma(&self) -> Result<&Plane, Error>;
}

impl<T: Copy> Raster for Image<T> {
    fn width(&self) -> usize {
        Image::width(self)
    }

    fn height(&self) -> usize {
        Image::height(self)
    }

    fn transpose(&self) -> Self {
        self.transposed()
    }

    fn crop(&self, margins: Margins) -> Result<Self, Error> {
        self.cropped(margins)
    }
}

impl Raster for Plane {
    fn width(&self) -> usize {
        Plane::width(self)
    }

    fn height(&self) -> usize {
        Plane::height(self)
    }

    fn transpose(&self) -> Self {
        match self {
            Self::Int { bits, range, image } => Self::Int {
                bits: *bits,
                range: *range,
                image: image.transposed(),
            },
            Self::Float(image) => Self::Float(image.transposed()),
        }
    }

    fn crop(&self, margins: Margins) -> Result<Self, Error> {
        Ok(match self {
            Self::Int { bits, range, image } => Self::Int {
                bits: *bits,
                range: *range,
                image: image.cropped(margins)?,
            },
            Self::Float(image) => Self::Float(image.cropped(margins)?),
        })
    }
}

impl LumaPlane for Plane {
    fn luma(&self) -> Result<&Plane, Error> {
        Ok(self)
    }
}

/// Crops `margins` off the plane and fills the same margins back with a
/// constant, keeping the plane's dimensions.
pub fn apply_borders(plane: &Plane, margins: Margins, color: Option<f64>) -> Result<Plane, Error> {
    if margins.is_zero() {
        return Ok(plane.clone());
    }
    Ok(plane.crop(margins)?.padded(margins, color))
}

#[cfg(test)]
mod tests {
    use super::{Plane, Range, Raster, SampleFormat, apply_borders};
    use crate::{Image, Margins};

    fn plane8(width: usize, height: usize, data: Vec<u8>) -> Plane {
        let img = Image::from_vec(width, height, data).expect("valid image");
        Plane::from_u8(&img, Range::Limited)
    }

    #[test]
    fn new_int_validates_depth_and_peak() {
        let img = Image::from_vec(2, 1, vec![0u16, 1023]).expect("valid image");
        assert!(Plane::new_int(10, Range::Full, img.clone()).is_ok());
        assert!(Plane::new_int(9, Range::Full, img.clone()).is_err());
        assert!(Plane::new_int(17, Range::Full, img).is_err());
    }

    #[test]
    fn black_follows_range_and_depth() {
        let limited = plane8(1, 1, vec![0]);
        assert_eq!(limited.black(), 16.0);

        let img = Image::from_vec(1, 1, vec![0u16]).expect("valid image");
        let ten = Plane::new_int(10, Range::Limited, img.clone()).expect("valid plane");
        assert_eq!(ten.black(), 64.0);
        assert_eq!(ten.peak(), 1023.0);

        let full = Plane::new_int(10, Range::Full, img).expect("valid plane");
        assert_eq!(full.black(), 0.0);
        assert_eq!(full.format(), SampleFormat::Int { bits: 10, range: Range::Full });
    }

    #[test]
    fn shallow_depth_built_by_hand_does_not_underflow() {
        let shallow = Plane::Int {
            bits: 4,
            range: Range::Limited,
            image: Image::new_fill(1, 1, 0u16),
        };
        assert_eq!(shallow.black(), 16.0);
        assert_eq!(shallow.eight_bit_step(), 1.0);
        assert_eq!(shallow.peak(), 15.0);
        let f = crate::depth::to_float(&shallow);
        assert_eq!(f.data(), &[-16.0 / 219.0]);
    }

    #[test]
    fn eight_bit_step_scales_with_depth() {
        let img = Image::from_vec(1, 1, vec![0u16]).expect("valid image");
        let ten = Plane::new_int(10, Range::Full, img).expect("valid plane");
        assert_eq!(ten.eight_bit_step(), 4.0);
        assert_eq!(plane8(1, 1, vec![0]).eight_bit_step(), 1.0);
        let float = Plane::Float(Image::new_fill(1, 1, 0.0));
        assert_eq!(float.eight_bit_step(), 1.0 / 219.0);
    }

    #[test]
    fn with_samples_rounds_and_clamps() {
        let p = plane8(3, 1, vec![0, 0, 0]);
        let s = Image::from_vec(3, 1, vec![-3.0f32, 127.5, 300.0]).expect("valid image");
        let out = p.with_samples_f32(s);
        assert_eq!(out.samples_f32().data(), &[0.0, 128.0, 255.0]);
    }

    #[test]
    fn plane_transpose_and_crop_keep_format() {
        let p = plane8(3, 2, vec![1, 2, 3, 4, 5, 6]);
        let t = p.transpose();
        assert_eq!((t.width(), t.height()), (2, 3));
        assert_eq!(t.format(), p.format());
        assert_eq!(t.transpose(), p);

        let c = p.crop(Margins::new(1, 1, 0, 1)).expect("valid crop");
        assert_eq!(c.samples_f32().data(), &[2.0]);
    }

    #[test]
    fn apply_borders_blanks_edges_with_black() {
        let p = plane8(3, 3, vec![100; 9]);
        let out = apply_borders(&p, Margins::new(1, 0, 0, 1), None).expect("valid borders");

        assert_eq!((out.width(), out.height()), (3, 3));
        assert_eq!(
            out.samples_f32().data(),
            &[16.0, 100.0, 100.0, 16.0, 100.0, 100.0, 16.0, 16.0, 16.0]
        );
    }
}
