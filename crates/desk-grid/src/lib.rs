//! Cell occupancy and span allocation for desk screens
//!
//! A desk is a fixed number of screens, each a `width × height` grid of
//! cells. Items claim rectangular spans of cells. This crate holds the
//! per-screen occupancy model and the search that finds room for a new span.

mod allocator;
mod metrics;
mod occupancy;
mod span;

pub use allocator::*;
pub use metrics::*;
pub use occupancy::*;
pub use span::*;

pub mod prelude {
    pub use crate::allocator::{find_all_vacant, find_cell_for_span, AllocationExhausted, CellInfo};
    pub use crate::occupancy::{GridError, OccupancyGrid, SavedOccupancy};
    pub use crate::span::{CellSpan, GridSize, ScreenIndex};
}
