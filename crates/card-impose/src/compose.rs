//! Sheet composition
//!
//! Turns the ordered list of prepared card assets into pages. Assets are
//! chunked one sheet at a time; in duplex mode every sheet gets a mirrored
//! back page before its front page so the shared back image sits behind each
//! card once the sheet is flipped left to right.

use crate::cancel::CancelToken;
use crate::layout::{SheetGeometry, plan_pages};
use crate::marks::{CropMarkStyle, draw_crop_marks};
use crate::preprocess::RenderedAsset;
use crate::render::PageRenderer;
use crate::types::{CardImposeError, ComposeMode, Result, SheetSide};

/// Drawing options for the composer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ComposeOptions {
    pub show_crop_marks: bool,
    pub crop_marks: CropMarkStyle,
    /// Distance from the card edge to the trim box; 0 puts marks on the card edge
    pub trim_inset_mm: f32,
}

impl Default for ComposeOptions {
    fn default() -> Self {
        Self {
            show_crop_marks: true,
            crop_marks: CropMarkStyle::default(),
            trim_inset_mm: 0.0,
        }
    }
}

/// What the composer emitted
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompositionSummary {
    /// Side of every emitted page, in emission order
    pub pages: Vec<SheetSide>,
    /// Card faces drawn on front pages
    pub cards_placed: usize,
}

impl CompositionSummary {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }
}

/// Draw every prepared asset onto `renderer`.
///
/// `slots` is indexed by input position; empty entries (skipped images) are
/// dropped before chunking. Each asset is released as soon as its front
/// page has been drawn, and everything still held is dropped if composition
/// stops early. `on_page` receives `(pages_done, total_pages)` after each page.
#[allow(clippy::too_many_arguments)]
pub fn compose_sheets<R: PageRenderer + ?Sized>(
    renderer: &mut R,
    slots: Vec<Option<RenderedAsset>>,
    geometry: &SheetGeometry,
    options: &ComposeOptions,
    back_asset: Option<&RenderedAsset>,
    mode: ComposeMode,
    cancel: &CancelToken,
    on_page: &mut dyn FnMut(usize, usize),
) -> Result<CompositionSummary> {
    let back_asset = match (mode, back_asset) {
        (ComposeMode::Duplex, None) => return Err(CardImposeError::MissingBackAsset),
        (_, back) => back,
    };

    let assets: Vec<RenderedAsset> = slots.into_iter().flatten().collect();
    let slot_positions = geometry.slot_positions();
    let plan = plan_pages(assets.len(), slot_positions.len(), mode);
    let total_pages = plan.len();

    log::info!(
        "Composing {} cards on {} pages ({})",
        assets.len(),
        total_pages,
        mode.label()
    );

    let mut remaining = assets.into_iter();
    let mut summary = CompositionSummary::default();

    for page in &plan {
        cancel.check()?;
        renderer.begin_page(page.side)?;

        match (page.side, back_asset) {
            (SheetSide::Back, Some(back)) => {
                for slot in &slot_positions[..page.occupied()] {
                    let rect = geometry.card_rect(geometry.mirrored(*slot));
                    renderer.draw_image(back, &rect)?;
                }
            }
            (SheetSide::Back, None) => return Err(CardImposeError::MissingBackAsset),
            (SheetSide::Front, _) => {
                for slot in &slot_positions[..page.occupied()] {
                    let Some(asset) = remaining.next() else {
                        break;
                    };
                    let rect = geometry.card_rect(*slot);
                    let drawn = renderer.draw_image(&asset, &rect);
                    asset.release();
                    drawn?;

                    if options.show_crop_marks {
                        let trim = rect.inset(options.trim_inset_mm);
                        draw_crop_marks(renderer, &trim, &options.crop_marks)?;
                    }
                    summary.cards_placed += 1;
                }
            }
        }

        renderer.end_page()?;
        summary.pages.push(page.side);
        log::debug!(
            "Sheet {} {:?} page done ({} cards)",
            page.sheet + 1,
            page.side,
            page.occupied()
        );
        on_page(summary.pages.len(), total_pages);
    }

    Ok(summary)
}
