//! Layout calculation modules for imposition
//!
//! This module handles the geometric side of imposition:
//! - Grid layout (columns, rows, centering)
//! - Slot positions and their duplex mirror images
//! - Page planning (which assets go on which page, in what order)

mod grid;
mod plan;
mod types;

pub use grid::*;
pub use plan::*;
pub use types::*;
