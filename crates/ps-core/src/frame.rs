use serde::{Deserialize, Serialize};

use crate::geom::Margins;
use crate::plane::{LumaPlane, Plane, Raster};
use crate::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorFamily {
    Gray,
    Yuv,
    Rgb,
}

impl ColorFamily {
    pub fn num_planes(self) -> usize {
        match self {
            Self::Gray => 1,
            Self::Yuv | Self::Rgb => 3,
        }
    }
}

/// A set of planes sharing one geometry.
///
/// Planes after the first may be subsampled by a power-of-two factor per
/// axis. All planes share the first plane's sample format.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    family: ColorFamily,
    planes: Vec<Plane>,
}

impl Frame {
    pub fn new(family: ColorFamily, planes: Vec<Plane>) -> Result<Self, Error> {
        if planes.len() != family.num_planes() {
            return Err(Error::precondition(
                "Frame::new",
                format!(
                    "{family:?} needs {} planes, got {}",
                    family.num_planes(),
                    planes.len()
                ),
            ));
        }

        let base = &planes[0];
        for (i, p) in planes.iter().enumerate().skip(1) {
            if p.format() != base.format() {
                return Err(Error::precondition(
                    "Frame::new",
                    format!("plane {i} format differs from plane 0"),
                ));
            }
            if family == ColorFamily::Rgb && (p.width(), p.height()) != (base.width(), base.height())
            {
                return Err(Error::precondition("Frame::new", "RGB planes cannot be subsampled"));
            }
            subsampling(base.width(), p.width())
                .and_then(|_| subsampling(base.height(), p.height()))
                .ok_or_else(|| {
                    Error::precondition(
                        "Frame::new",
                        format!("plane {i} is not a power-of-two subsampling of plane 0"),
                    )
                })?;
        }

        Ok(Self { family, planes })
    }

    pub fn gray(plane: Plane) -> Self {
        Self {
            family: ColorFamily::Gray,
            planes: vec![plane],
        }
    }

    pub fn family(&self) -> ColorFamily {
        self.family
    }

    pub fn num_planes(&self) -> usize {
        self.planes.len()
    }

    pub fn plane(&self, i: usize) -> Option<&Plane> {
        self.planes.get(i)
    }

    pub fn planes(&self) -> &[Plane] {
        &self.planes
    }

    pub fn into_planes(self) -> Vec<Plane> {
        self.planes
    }
}

/// `log2(full / sub)` when `sub` is `full` divided by a power of two.
fn subsampling(full: usize, sub: usize) -> Option<u32> {
    if sub == 0 {
        return (full == 0).then_some(0);
    }
    if !full.is_multiple_of(sub) {
        return None;
    }
    let ratio = full / sub;
    ratio.is_power_of_two().then(|| ratio.trailing_zeros())
}

impl Raster for Frame {
    fn width(&self) -> usize {
        self.planes[0].width()
    }

    fn height(&self) -> usize {
        self.planes[0].height()
    }

    fn transpose(&self) -> Self {
        Self {
            family: self.family,
            planes: self.planes.iter().map(Raster::transpose).collect(),
        }
    }

    fn crop(&self, margins: Margins) -> Result<Self, Error> {
        let (w, h) = (self.width(), self.height());
        let mut planes = Vec::with_capacity(self.planes.len());
        for p in &self.planes {
            let sw = subsampling(w, p.width()).unwrap_or(0);
            let sh = subsampling(h, p.height()).unwrap_or(0);
            let scaled = scale_margins(margins, sw, sh).ok_or_else(|| {
                Error::precondition(
                    "Frame::crop",
                    format!("margins {margins:?} are not aligned to chroma subsampling"),
                )
            })?;
            planes.push(p.crop(scaled)?);
        }
        Ok(Self {
            family: self.family,
            planes,
        })
    }
}

fn scale_margins(m: Margins, sw: u32, sh: u32) -> Option<Margins> {
    let div = |v: usize, s: u32| -> Option<usize> {
        let step = 1usize << s;
        v.is_multiple_of(step).then_some(v >> s)
    };
    Some(Margins::new(
        div(m.left, sw)?,
        div(m.right, sw)?,
        div(m.top, sh)?,
        div(m.bottom, sh)?,
    ))
}

impl LumaPlane for Frame {
    fn luma(&self) -> Result<&Plane, Error> {
        match self.family {
            ColorFamily::Gray | ColorFamily::Yuv => Ok(&self.planes[0]),
            ColorFamily::Rgb => Err(Error::precondition(
                "luma",
                "RGB frames have no luma plane; convert to YUV or GRAY first",
            )),
        }
    }
}
