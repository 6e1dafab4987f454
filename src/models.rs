use serde::Serialize;

use crate::error::{Error, Result};

/// A corner point as reported by the text detector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// A detected text unit: four corners of a possibly rotated quadrilateral.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Quad(pub [Point; 4]);

impl Quad {
    pub fn new(points: [Point; 4]) -> Self {
        Self(points)
    }

    /// Build a quad from raw coordinate pairs, failing unless exactly four are given.
    pub fn from_pairs(pairs: &[[f32; 2]]) -> Result<Self> {
        let points: [Point; 4] = pairs
            .iter()
            .map(|[x, y]| Point::new(*x, *y))
            .collect::<Vec<_>>()
            .try_into()
            .map_err(|_| Error::MalformedBox {
                points: pairs.len(),
            })?;
        Ok(Self(points))
    }

    pub fn points(&self) -> &[Point; 4] {
        &self.0
    }

    /// Shift every corner down by `dy` pixels.
    pub fn offset_y(&self, dy: f32) -> Self {
        Self(self.0.map(|p| Point::new(p.x, p.y + dy)))
    }
}

/// Axis-aligned rectangle in integer pixel coordinates.
///
/// `right` and `bottom` are exclusive when the rectangle is used as a crop
/// box, so `width()` is the crop width. Filled backgrounds are drawn through
/// them inclusively (see [`crate::render::paint_background`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Rect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Rect {
    pub fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub fn width(&self) -> i32 {
        self.right - self.left
    }

    pub fn height(&self) -> i32 {
        self.bottom - self.top
    }

    /// Vertical midpoint, rounded toward the top.
    pub fn vertical_center(&self) -> i32 {
        self.top + (self.bottom - self.top).div_euclid(2)
    }

    pub fn expand(&self, margin: i32) -> Self {
        Self::new(
            self.left - margin,
            self.top - margin,
            self.right + margin,
            self.bottom + margin,
        )
    }
}

/// One box placed in reading order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LineRecord {
    /// Position of the box in the detector's output.
    pub index: usize,
    pub rect: Rect,
    /// Vertical center, possibly snapped onto the line it belongs to.
    pub center: i32,
}

impl LineRecord {
    pub fn left(&self) -> i32 {
        self.rect.left
    }

    pub fn top(&self) -> i32 {
        self.rect.top
    }

    pub fn right(&self) -> i32 {
        self.rect.right
    }

    pub fn bottom(&self) -> i32 {
        self.rect.bottom
    }
}

/// Where the subtitle band starts inside a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SubtitleRegion {
    pub width: u32,
    pub height: u32,
    /// First row of the subtitle band.
    pub top: u32,
}

impl SubtitleRegion {
    /// Rows covered by the band (from `top` to the bottom of the frame).
    pub fn band_height(&self) -> u32 {
        self.height.saturating_sub(self.top)
    }

    /// True when the scan ran off the bottom without finding subtitle pixels.
    pub fn is_empty(&self, band_height: u32) -> bool {
        self.top + band_height >= self.height
    }
}

/// A box together with the text recognized inside it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecognizedBox {
    pub record: LineRecord,
    pub text: String,
}

/// Everything recovered from one frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameText {
    pub region: SubtitleRegion,
    /// Boxes in reading order, in frame coordinates.
    pub boxes: Vec<RecognizedBox>,
    /// Corrected text, one visual line per `\n`.
    pub text: String,
}
