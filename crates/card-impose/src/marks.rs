//! Crop marks for card trim boxes
//!
//! Each corner of a trim rectangle gets an L-shaped mark: one horizontal and
//! one vertical segment starting at the corner and running along the edge.

use crate::constants::{CROP_MARK_LENGTH_MM, CROP_MARK_STROKE_MM};
use crate::layout::Rect;
use crate::render::PageRenderer;
use crate::types::Result;

/// Appearance of crop marks
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CropMarkStyle {
    /// Length of each segment in mm
    pub length_mm: f32,
    /// Stroke width in mm
    pub stroke_mm: f32,
}

impl Default for CropMarkStyle {
    fn default() -> Self {
        Self {
            length_mm: CROP_MARK_LENGTH_MM,
            stroke_mm: CROP_MARK_STROKE_MM,
        }
    }
}

/// A straight line in sheet space (mm, origin top-left)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineSegment {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

impl LineSegment {
    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    pub fn length(&self) -> f32 {
        (self.x2 - self.x1).hypot(self.y2 - self.y1)
    }
}

/// The eight segments marking the corners of `trim`
pub fn crop_mark_segments(trim: &Rect, length: f32) -> [LineSegment; 8] {
    let (left, top) = (trim.x, trim.y);
    let (right, bottom) = (trim.right(), trim.bottom());

    [
        // Top-left
        LineSegment::new(left, top, left + length, top),
        LineSegment::new(left, top, left, top + length),
        // Top-right
        LineSegment::new(right, top, right - length, top),
        LineSegment::new(right, top, right, top + length),
        // Bottom-left
        LineSegment::new(left, bottom, left + length, bottom),
        LineSegment::new(left, bottom, left, bottom - length),
        // Bottom-right
        LineSegment::new(right, bottom, right - length, bottom),
        LineSegment::new(right, bottom, right, bottom - length),
    ]
}

/// Draw crop marks around `trim` on the current page
pub fn draw_crop_marks<R: PageRenderer + ?Sized>(
    renderer: &mut R,
    trim: &Rect,
    style: &CropMarkStyle,
) -> Result<()> {
    for segment in crop_mark_segments(trim, style.length_mm) {
        renderer.draw_line(&segment, style.stroke_mm)?;
    }
    Ok(())
}
