//! Page planning
//!
//! Splits the ordered asset list into per-sheet chunks and decides the order
//! in which output pages are emitted.

use crate::types::{ComposeMode, SheetSide};
use std::ops::Range;

/// One output page to be emitted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PagePlan {
    /// Which side of the sheet this page prints
    pub side: SheetSide,
    /// Index of the sheet (chunk) this page belongs to
    pub sheet: usize,
    /// Asset indices placed on this sheet, in slot order
    pub assets: Range<usize>,
}

impl PagePlan {
    /// Number of occupied slots
    pub fn occupied(&self) -> usize {
        self.assets.len()
    }
}

/// Number of sheets needed for `asset_count` cards
pub fn sheet_count(asset_count: usize, slots_per_page: usize) -> usize {
    if slots_per_page == 0 {
        return 0;
    }
    asset_count.div_ceil(slots_per_page)
}

/// Build the ordered page list.
///
/// Sheet `i` holds assets `[i * S, (i + 1) * S)`. In duplex mode every sheet
/// yields its back page first, then its front page.
pub fn plan_pages(asset_count: usize, slots_per_page: usize, mode: ComposeMode) -> Vec<PagePlan> {
    let sheets = sheet_count(asset_count, slots_per_page);
    let mut pages = Vec::with_capacity(sheets * mode.pages_per_sheet());

    for sheet in 0..sheets {
        let start = sheet * slots_per_page;
        let end = (start + slots_per_page).min(asset_count);

        if mode == ComposeMode::Duplex {
            pages.push(PagePlan {
                side: SheetSide::Back,
                sheet,
                assets: start..end,
            });
        }
        pages.push(PagePlan {
            side: SheetSide::Front,
            sheet,
            assets: start..end,
        });
    }

    pages
}
