//! Shared constants for card imposition
//!
//! This module centralizes magic numbers and constants used throughout
//! the imposition process.

// =============================================================================
// Unit Conversion
// =============================================================================

/// Millimeters per inch
pub const MM_PER_INCH: f32 = 25.4;

/// Points per millimeter (1 inch = 72 points, 1 inch = 25.4mm)
pub const POINTS_PER_MM: f32 = 72.0 / MM_PER_INCH; // ≈ 2.83465

/// Convert millimeters to points
#[inline]
pub fn mm_to_pt(mm: f32) -> f32 {
    mm * POINTS_PER_MM
}

/// Convert millimeters to whole pixels at the given density.
///
/// Truncates toward zero and never returns less than one pixel.
#[inline]
pub fn mm_to_px(mm: f32, dpi: u32) -> u32 {
    let px = (mm / MM_PER_INCH * dpi as f32).floor();
    if px.is_finite() && px >= 1.0 {
        px as u32
    } else {
        1
    }
}

// =============================================================================
// Sheet
// =============================================================================

/// Target sheet width (A4 portrait)
pub const SHEET_WIDTH_MM: f32 = 210.0;

/// Target sheet height (A4 portrait)
pub const SHEET_HEIGHT_MM: f32 = 297.0;

// =============================================================================
// Cards
// =============================================================================

pub const DEFAULT_CARD_WIDTH_MM: f32 = 59.0;
pub const DEFAULT_CARD_HEIGHT_MM: f32 = 86.0;
pub const DEFAULT_GAP_MM: f32 = 5.0;
pub const DEFAULT_DPI: u32 = 1200;

/// Accepted card image extensions (compared case-insensitively)
pub const IMAGE_EXTENSIONS: [&str; 6] = ["png", "jpg", "jpeg", "bmp", "tiff", "tif"];

// =============================================================================
// Printer's Marks
// =============================================================================

/// Length of each crop mark segment (mm)
pub const CROP_MARK_LENGTH_MM: f32 = 3.0;

/// Stroke width of crop marks (mm)
pub const CROP_MARK_STROKE_MM: f32 = 0.1;

// =============================================================================
// Progress
// =============================================================================

/// Share of the progress range taken by preprocessing
pub const PREPROCESS_PROGRESS_END: f32 = 50.0;

/// Checkpoint reported right before the document is written
pub const SAVING_PROGRESS: f32 = 95.0;

pub const COMPLETE_PROGRESS: f32 = 100.0;
