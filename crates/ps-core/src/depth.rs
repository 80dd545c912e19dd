//! Bit-depth and range conversion between integer and float planes.
//!
//! Float samples are normalised luma: black is `0.0`, white is `1.0`.
//! Integer samples map to that scale through their [`Range`]:
//! - limited: `16 << (bits - 8)` is black, `235 << (bits - 8)` is white;
//! - full: `0` is black, `2^bits - 1` is white.
//!
//! Float to integer conversion rounds to nearest and clamps to the code range.

use crate::image::Image;
use crate::plane::{Plane, Range, SampleFormat, eight_bit_shift, int_peak};
use crate::Error;

/// `(offset, span)` such that `code = offset + span * normalised`.
fn code_scale(bits: u8, range: Range) -> (f32, f32) {
    match range {
        Range::Limited => {
            let step = (1u32 << eight_bit_shift(bits)) as f32;
            (16.0 * step, 219.0 * step)
        }
        Range::Full => (0.0, int_peak(bits) as f32),
    }
}

/// Normalised float samples of `plane`.
pub fn to_float(plane: &Plane) -> Image<f32> {
    to_float_as(plane, None)
}

/// Like [`to_float`], interpreting integer samples with `range_in` instead of
/// the plane's declared range when given.
pub fn to_float_as(plane: &Plane, range_in: Option<Range>) -> Image<f32> {
    match plane {
        Plane::Int { bits, range, image } => {
            let (offset, span) = code_scale(*bits, range_in.unwrap_or(*range));
            image.map(|&v| (f32::from(v) - offset) / span)
        }
        Plane::Float(image) => image.clone(),
    }
}

/// Converts normalised float samples to `target`.
pub fn from_float(image: &Image<f32>, target: SampleFormat) -> Result<Plane, Error> {
    match target {
        SampleFormat::Float => Ok(Plane::Float(image.clone())),
        SampleFormat::Int { bits, range } => {
            check_bits(bits)?;
            let (offset, span) = code_scale(bits, range);
            let peak = int_peak(bits) as f32;
            Ok(Plane::Int {
                bits,
                range,
                image: image.map(|&v| (offset + span * v).round().clamp(0.0, peak) as u16),
            })
        }
    }
}

/// Converts a plane of normalised *differences* (no black offset) to a
/// full-range integer plane.
///
/// A difference of one code step under `scale_range` becomes one full-range
/// code, so error magnitudes stay comparable with the source's code values.
pub fn from_float_delta(image: &Image<f32>, bits: u8, scale_range: Range) -> Result<Plane, Error> {
    check_bits(bits)?;
    let (_, span) = code_scale(bits, scale_range);
    let peak = int_peak(bits) as f32;
    Ok(Plane::Int {
        bits,
        range: Range::Full,
        image: image.map(|&v| (span * v).round().clamp(0.0, peak) as u16),
    })
}

/// General depth conversion: `plane` → `target`, optionally overriding the
/// input range.
pub fn convert(plane: &Plane, target: SampleFormat, range_in: Option<Range>) -> Result<Plane, Error> {
    if range_in.is_none() && plane.format() == target {
        return Ok(plane.clone());
    }
    from_float(&to_float_as(plane, range_in), target)
}

fn check_bits(bits: u8) -> Result<(), Error> {
    if (8..=16).contains(&bits) {
        Ok(())
    } else {
        Err(Error::precondition(
            "depth",
            format!("unsupported integer bit depth {bits}"),
        ))
    }
}
