mod cancel;
pub mod compose;
pub mod constants;
mod engine;
pub mod layout;
pub mod marks;
mod options;
pub mod preprocess;
mod progress;
pub mod render;
mod stats;
mod types;

pub use cancel::CancelToken;
pub use compose::{ComposeOptions, CompositionSummary, compose_sheets};
pub use engine::{impose_cards, run};
pub use layout::{PagePlan, SheetGeometry, SlotPosition, plan_pages, plan_slots};
pub use marks::{CropMarkStyle, draw_crop_marks};
pub use options::*;
pub use preprocess::{PixelBox, RenderedAsset, list_image_files, preprocess_batch, preprocess_image};
pub use progress::{NoProgress, Progress, ProgressSink};
pub use render::{PageRenderer, PdfRenderer, save_pdf};
pub use stats::calculate_statistics;
pub use types::*;
