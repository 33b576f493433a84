use crate::layout::{SheetGeometry, sheet_count};
use crate::types::*;

/// Calculate statistics for imposing `image_count` cards
pub fn calculate_statistics(
    image_count: usize,
    geometry: &SheetGeometry,
    include_back: bool,
) -> ImpositionStatistics {
    let slots_per_page = geometry.slots_per_page();
    let sheets = sheet_count(image_count, slots_per_page);
    let output_pages = sheets * ComposeMode::from_include_back(include_back).pages_per_sheet();

    // Only the last sheet can be partially filled
    let empty_slots = sheets * slots_per_page - image_count;

    ImpositionStatistics {
        card_count: image_count,
        slots_per_page,
        sheets,
        output_pages,
        empty_slots,
    }
}
