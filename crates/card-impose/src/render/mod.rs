//! Page rendering for imposition
//!
//! The composer drives a [`PageRenderer`]: it opens pages, places images and
//! strokes lines, all in sheet millimeters with a top-left origin. The PDF
//! implementation converts to points with a bottom-left origin.

mod pdf;
mod xobject;

pub use pdf::{PdfRenderer, save_pdf};
pub use xobject::create_image_xobject;

use crate::layout::Rect;
use crate::marks::LineSegment;
use crate::preprocess::RenderedAsset;
use crate::types::{Result, SheetSide};

/// Drawing primitives the composer needs from an output format
pub trait PageRenderer {
    /// Finished document type
    type Output;

    /// Start a new page; pages are appended in call order
    fn begin_page(&mut self, side: SheetSide) -> Result<()>;

    /// Draw `asset` stretched over `rect`
    fn draw_image(&mut self, asset: &RenderedAsset, rect: &Rect) -> Result<()>;

    /// Stroke a straight line `stroke_mm` wide
    fn draw_line(&mut self, line: &LineSegment, stroke_mm: f32) -> Result<()>;

    /// Close the current page
    fn end_page(&mut self) -> Result<()>;

    /// Pages emitted so far
    fn page_count(&self) -> usize;

    /// Consume the renderer and return the finished document
    fn finish(self) -> Result<Self::Output>
    where
        Self: Sized;
}
