//! Card grid calculation
//!
//! Fits as many card slots as possible on one sheet, separated by a fixed
//! gap, and centers the resulting grid on the sheet.

use super::{GridPosition, Rect, SlotPosition};

// =============================================================================
// Sheet Geometry
// =============================================================================

/// Card grid for one sheet, computed once per run
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SheetGeometry {
    pub page_width: f32,
    pub page_height: f32,
    pub card_width: f32,
    pub card_height: f32,
    pub gap: f32,
    /// Number of card columns (always at least 1)
    pub columns: usize,
    /// Number of card rows (always at least 1)
    pub rows: usize,
    /// Width of the card grid including inner gaps
    pub grid_width: f32,
    /// Height of the card grid including inner gaps
    pub grid_height: f32,
    /// Left edge of the grid
    pub offset_x: f32,
    /// Top edge of the grid
    pub offset_y: f32,
}

impl SheetGeometry {
    /// Lay out cards on a sheet.
    ///
    /// When a single card does not fit, the grid still holds one slot and its
    /// offset goes negative; card sizes are not adjusted.
    pub fn new(page_width: f32, page_height: f32, card_width: f32, card_height: f32, gap: f32) -> Self {
        let columns = fit_count(page_width, card_width, gap);
        let rows = fit_count(page_height, card_height, gap);

        let grid_width = columns as f32 * card_width + (columns - 1) as f32 * gap;
        let grid_height = rows as f32 * card_height + (rows - 1) as f32 * gap;

        Self {
            page_width,
            page_height,
            card_width,
            card_height,
            gap,
            columns,
            rows,
            grid_width,
            grid_height,
            offset_x: (page_width - grid_width) / 2.0,
            offset_y: (page_height - grid_height) / 2.0,
        }
    }

    /// Number of card slots on one sheet
    pub fn slots_per_page(&self) -> usize {
        self.columns * self.rows
    }

    /// Grid position of the slot at `index` in row-major order
    pub fn grid_position(&self, index: usize) -> GridPosition {
        GridPosition::new(index / self.columns, index % self.columns)
    }

    /// Origin of the slot at a grid position
    pub fn slot_at(&self, pos: GridPosition) -> SlotPosition {
        SlotPosition::new(
            self.offset_x + pos.col as f32 * (self.card_width + self.gap),
            self.offset_y + pos.row as f32 * (self.card_height + self.gap),
        )
    }

    /// All slot origins, row-major, top row first, left to right
    pub fn slot_positions(&self) -> Vec<SlotPosition> {
        (0..self.slots_per_page())
            .map(|index| self.slot_at(self.grid_position(index)))
            .collect()
    }

    /// Where the back of the card at `slot` must be printed.
    ///
    /// The sheet is flipped about its vertical centerline for the second
    /// side, so x is mirrored and y is kept.
    pub fn mirrored(&self, slot: SlotPosition) -> SlotPosition {
        SlotPosition::new(self.page_width - slot.x - self.card_width, slot.y)
    }

    /// Card rectangle with its origin at `slot`
    pub fn card_rect(&self, slot: SlotPosition) -> Rect {
        Rect::new(slot.x, slot.y, self.card_width, self.card_height)
    }
}

/// Cards of `card` length that fit along `page` with `gap` between them
fn fit_count(page: f32, card: f32, gap: f32) -> usize {
    let count = ((page + gap) / (card + gap)).floor();
    if count.is_finite() && count >= 1.0 {
        count as usize
    } else {
        1
    }
}

/// Convenience wrapper returning the slot list directly
pub fn plan_slots(
    page_width: f32,
    page_height: f32,
    card_width: f32,
    card_height: f32,
    gap: f32,
) -> Vec<SlotPosition> {
    SheetGeometry::new(page_width, page_height, card_width, card_height, gap).slot_positions()
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-4;

    #[test]
    fn test_a4_standard_cards() {
        let geometry = SheetGeometry::new(210.0, 297.0, 59.0, 86.0, 5.0);

        assert_eq!(geometry.columns, 3);
        assert_eq!(geometry.rows, 3);
        assert_eq!(geometry.slots_per_page(), 9);
        assert!((geometry.grid_width - 187.0).abs() < EPS);
        assert!((geometry.grid_height - 268.0).abs() < EPS);
        assert!((geometry.offset_x - 11.5).abs() < EPS);
        assert!((geometry.offset_y - 14.5).abs() < EPS);
    }

    #[test]
    fn test_slots_row_major() {
        let geometry = SheetGeometry::new(210.0, 297.0, 59.0, 86.0, 5.0);
        let slots = geometry.slot_positions();

        assert_eq!(slots.len(), 9);
        assert!((slots[0].x - 11.5).abs() < EPS);
        assert!((slots[0].y - 14.5).abs() < EPS);
        // Second slot is to the right on the same row
        assert!((slots[1].x - 75.5).abs() < EPS);
        assert!((slots[1].y - slots[0].y).abs() < EPS);
        // Fourth slot starts the second row
        assert!((slots[3].x - slots[0].x).abs() < EPS);
        assert!((slots[3].y - 105.5).abs() < EPS);
    }

    #[test]
    fn test_oversized_card_single_slot() {
        let geometry = SheetGeometry::new(210.0, 297.0, 300.0, 400.0, 5.0);

        assert_eq!(geometry.columns, 1);
        assert_eq!(geometry.rows, 1);
        assert!(geometry.offset_x < 0.0);
        assert!(geometry.offset_y < 0.0);
        assert_eq!(geometry.slot_positions().len(), 1);
    }

    #[test]
    fn test_mirrored_slot() {
        let geometry = SheetGeometry::new(210.0, 297.0, 59.0, 86.0, 5.0);
        let slots = geometry.slot_positions();

        // Left column lands in the right column after the flip
        let back = geometry.mirrored(slots[0]);
        assert!((back.x - slots[2].x).abs() < EPS);
        assert!((back.y - slots[0].y).abs() < EPS);

        // Center column stays in place
        let back = geometry.mirrored(slots[4]);
        assert!((back.x - slots[4].x).abs() < EPS);
    }

    #[test]
    fn test_zero_gap() {
        let geometry = SheetGeometry::new(100.0, 100.0, 25.0, 50.0, 0.0);
        assert_eq!(geometry.columns, 4);
        assert_eq!(geometry.rows, 2);
        assert!(geometry.offset_x.abs() < EPS);
    }

    #[test]
    fn test_grid_position() {
        let geometry = SheetGeometry::new(210.0, 297.0, 59.0, 86.0, 5.0);
        assert_eq!(geometry.grid_position(0), GridPosition::new(0, 0));
        assert_eq!(geometry.grid_position(5), GridPosition::new(1, 2));
        assert_eq!(geometry.grid_position(6), GridPosition::new(2, 0));
    }
}
