use crate::compose::ComposeOptions;
use crate::constants::*;
use crate::layout::SheetGeometry;
use crate::marks::CropMarkStyle;
use crate::preprocess::{PixelBox, default_workers};
use crate::types::*;
use std::path::{Path, PathBuf};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Everything one imposition run needs, resolved up front
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RunOptions {
    // Input and output
    pub image_folder: PathBuf,
    pub output_path: PathBuf,
    pub back_image: Option<PathBuf>,

    // Card geometry
    pub dpi: u32,
    pub card_width_mm: f32,
    pub card_height_mm: f32,
    pub gap_mm: f32,

    // Printer's marks
    pub show_crop_marks: bool,
    pub crop_marks: CropMarkStyle,
    pub trim_inset_mm: f32,

    /// Preprocessing workers; 0 uses the available parallelism
    pub workers: usize,

    /// Emit a mirrored back page before every front page
    pub include_back: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            image_folder: PathBuf::new(),
            output_path: PathBuf::from("cards.pdf"),
            back_image: None,
            dpi: DEFAULT_DPI,
            card_width_mm: DEFAULT_CARD_WIDTH_MM,
            card_height_mm: DEFAULT_CARD_HEIGHT_MM,
            gap_mm: DEFAULT_GAP_MM,
            show_crop_marks: true,
            crop_marks: CropMarkStyle::default(),
            trim_inset_mm: 0.0,
            workers: 0,
            include_back: true,
        }
    }
}

impl RunOptions {
    /// Validate the options.
    ///
    /// Duplex mode without a usable back image is reported as
    /// [`CardImposeError::MissingBackAsset`] so it can be told apart from a
    /// plain configuration mistake.
    pub fn validate(&self) -> Result<()> {
        if !(self.card_width_mm > 0.0 && self.card_height_mm > 0.0) {
            return Err(CardImposeError::Config(format!(
                "Card size must be positive, got {}x{} mm",
                self.card_width_mm, self.card_height_mm
            )));
        }
        if !(self.gap_mm >= 0.0) {
            return Err(CardImposeError::Config(format!(
                "Gap must not be negative, got {} mm",
                self.gap_mm
            )));
        }
        if self.dpi == 0 {
            return Err(CardImposeError::Config("DPI must be at least 1".to_string()));
        }
        if !(self.trim_inset_mm >= 0.0) {
            return Err(CardImposeError::Config(format!(
                "Trim inset must not be negative, got {} mm",
                self.trim_inset_mm
            )));
        }
        let smallest_side = self.card_width_mm.min(self.card_height_mm);
        if self.trim_inset_mm * 2.0 >= smallest_side {
            return Err(CardImposeError::Config(format!(
                "Trim inset {} mm leaves nothing of a {}x{} mm card",
                self.trim_inset_mm, self.card_width_mm, self.card_height_mm
            )));
        }
        if self.show_crop_marks
            && !(self.crop_marks.length_mm > 0.0 && self.crop_marks.stroke_mm > 0.0)
        {
            return Err(CardImposeError::Config(
                "Crop mark length and stroke must be positive".to_string(),
            ));
        }

        if self.include_back && self.back_image().is_none() {
            return Err(CardImposeError::MissingBackAsset);
        }

        Ok(())
    }

    /// Back image path, treating an empty path as absent
    pub fn back_image(&self) -> Option<&Path> {
        self.back_image
            .as_deref()
            .filter(|path| !path.as_os_str().is_empty())
    }

    pub fn mode(&self) -> ComposeMode {
        ComposeMode::from_include_back(self.include_back)
    }

    /// Card grid on the fixed target sheet
    pub fn geometry(&self) -> SheetGeometry {
        SheetGeometry::new(
            SHEET_WIDTH_MM,
            SHEET_HEIGHT_MM,
            self.card_width_mm,
            self.card_height_mm,
            self.gap_mm,
        )
    }

    /// Pixel box card images are scaled into
    pub fn target_pixels(&self) -> PixelBox {
        PixelBox::new(
            mm_to_px(self.card_width_mm, self.dpi),
            mm_to_px(self.card_height_mm, self.dpi),
        )
    }

    pub fn effective_workers(&self) -> usize {
        if self.workers == 0 {
            default_workers()
        } else {
            self.workers
        }
    }

    pub fn compose_options(&self) -> ComposeOptions {
        ComposeOptions {
            show_crop_marks: self.show_crop_marks,
            crop_marks: self.crop_marks,
            trim_inset_mm: self.trim_inset_mm,
        }
    }
}

/// Derived layout information for a preview display
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SheetInfo {
    pub columns: usize,
    pub rows: usize,
    pub cards_per_page: usize,
    pub target_pixels: PixelBox,
    pub duplex: bool,
}

impl SheetInfo {
    pub fn summary(&self) -> String {
        format!(
            "{}x{} = {} cards per page, {}x{} px per card, {}",
            self.columns,
            self.rows,
            self.cards_per_page,
            self.target_pixels.width,
            self.target_pixels.height,
            if self.duplex { "duplex" } else { "front only" }
        )
    }
}

/// Describe the sheet a set of options produces, without touching any files
pub fn describe(options: &RunOptions) -> SheetInfo {
    let geometry = options.geometry();
    SheetInfo {
        columns: geometry.columns,
        rows: geometry.rows,
        cards_per_page: geometry.slots_per_page(),
        target_pixels: options.target_pixels(),
        duplex: options.include_back,
    }
}
