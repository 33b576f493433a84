use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CardImposeError {
    #[error("no images found")]
    NoImagesFound,
    #[error("all {count} images failed to decode")]
    AllImagesFailed { count: usize },
    #[error("Cannot decode image {}: {source}", .path.display())]
    ImageDecode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("Duplex printing requires a back image")]
    MissingBackAsset,
    #[error("Cannot write output {}: {source}", .path.display())]
    OutputWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Temporary asset error: {0}")]
    TempResource(std::io::Error),
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("Task join error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
    #[error("Run cancelled")]
    Cancelled,
    #[error("Worker pool error: {0}")]
    WorkerPool(String),
}

impl CardImposeError {
    /// Whether this error ends the whole run.
    ///
    /// Decode and temp-file failures are recoverable when they concern a single
    /// card image; the batch records them and carries on.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            CardImposeError::ImageDecode { .. } | CardImposeError::TempResource(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, CardImposeError>;

/// Which physical side of the printed sheet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SheetSide {
    /// Card faces
    Front,
    /// Shared back image, mirrored for duplex printing
    Back,
}

/// Composition mode, fixed for the whole run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ComposeMode {
    /// Front pages only
    Simplex,
    /// Back page followed by front page for every sheet
    Duplex,
}

impl ComposeMode {
    pub fn from_include_back(include_back: bool) -> Self {
        if include_back {
            ComposeMode::Duplex
        } else {
            ComposeMode::Simplex
        }
    }

    /// Output pages emitted per sheet
    pub fn pages_per_sheet(self) -> usize {
        match self {
            ComposeMode::Simplex => 1,
            ComposeMode::Duplex => 2,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ComposeMode::Simplex => "front only",
            ComposeMode::Duplex => "duplex",
        }
    }
}

/// A card image found in the input folder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceImage {
    /// Position in the sorted input listing
    pub index: usize,
    pub path: PathBuf,
}

/// A card image that could not be turned into an asset
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SkippedImage {
    pub index: usize,
    pub path: PathBuf,
    pub reason: String,
}

/// Statistics about a planned run
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ImpositionStatistics {
    /// Number of card images to place
    pub card_count: usize,
    /// Card slots available on one sheet
    pub slots_per_page: usize,
    /// Number of physical sheets
    pub sheets: usize,
    /// Output page count (doubled in duplex mode)
    pub output_pages: usize,
    /// Unused slots on the last sheet
    pub empty_slots: usize,
}

/// Summary of a finished run
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RunReport {
    pub output_path: PathBuf,
    pub mode: ComposeMode,
    pub pages: usize,
    pub cards_placed: usize,
    pub images_found: usize,
    pub skipped: Vec<SkippedImage>,
}

impl RunReport {
    /// Human-readable success message
    pub fn message(&self) -> String {
        let mut message = format!(
            "PDF created ({}): {} pages, {} cards",
            self.mode.label(),
            self.pages,
            self.cards_placed
        );
        if !self.skipped.is_empty() {
            message.push_str(&format!(
                "; {} of {} images skipped",
                self.skipped.len(),
                self.images_found
            ));
        }
        message
    }
}

/// Result of the top-level entry point: never an error, always a verdict
#[derive(Debug, Clone, PartialEq)]
pub struct RunOutcome {
    pub success: bool,
    pub message: String,
    pub report: Option<RunReport>,
}

impl RunOutcome {
    pub fn succeeded(report: RunReport) -> Self {
        Self {
            success: true,
            message: report.message(),
            report: Some(report),
        }
    }

    pub fn failed(error: &CardImposeError) -> Self {
        Self {
            success: false,
            message: error.to_string(),
            report: None,
        }
    }
}
