//! Span search over occupancy grids.
//!
//! Placements are found in reading order: rows are scanned top to bottom and
//! cells within a row left to right, so screens fill up the way text does.
//! When several screens are searched they are visited in ascending index
//! order with the same tie-break inside each one.

use crate::occupancy::{GridError, OccupancyGrid, SavedOccupancy};
use crate::span::{CellSpan, ScreenIndex};

/// No screen had room for the requested span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AllocationExhausted {
    pub span_x: usize,
    pub span_y: usize,
}

impl std::fmt::Display for AllocationExhausted {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "no room for a {}x{} span on any screen", self.span_x, self.span_y)
    }
}

impl std::error::Error for AllocationExhausted {}

/// Returns the top-left cell of the first free `span_x × span_y` rectangle
/// in `grid`, scanning rows first.
pub fn find_cell_for_span(grid: &OccupancyGrid, span_x: usize, span_y: usize) -> Option<(usize, usize)> {
    let size = grid.size();
    if span_x == 0 || span_y == 0 || span_x > size.width || span_y > size.height {
        return None;
    }
    for y in 0..=size.height - span_y {
        for x in 0..=size.width - span_x {
            if grid.is_region_free(x, y, span_x, span_y) {
                return Some((x, y));
            }
        }
    }
    None
}

/// Search state for a pending placement.
///
/// Holds the grids of the screens to search, in search order, along with the
/// cell the placement was aimed at. A `CellInfo` for a single screen comes
/// from [`CellInfo::for_screen`]; one spanning the whole desk comes from
/// [`find_all_vacant`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CellInfo {
    pub screen: ScreenIndex,
    pub cell_x: usize,
    pub cell_y: usize,
    pub span_x: usize,
    pub span_y: usize,
    grids: Vec<OccupancyGrid>,
}

impl CellInfo {
    pub fn for_screen(grid: OccupancyGrid) -> Self {
        Self {
            screen: grid.screen(),
            cell_x: 0,
            cell_y: 0,
            span_x: 1,
            span_y: 1,
            grids: vec![grid],
        }
    }

    /// Re-derives the grid that existed when a placement was interrupted.
    pub fn from_saved(saved: &SavedOccupancy) -> Result<Self, GridError> {
        Ok(Self::for_screen(saved.to_grid()?))
    }

    /// Records the cell and span the placement was aimed at.
    pub fn with_cell(mut self, cell_x: usize, cell_y: usize, span_x: usize, span_y: usize) -> Self {
        self.cell_x = cell_x;
        self.cell_y = cell_y;
        self.span_x = span_x;
        self.span_y = span_y;
        self
    }

    pub fn screens(&self) -> impl Iterator<Item = ScreenIndex> + '_ {
        self.grids.iter().map(OccupancyGrid::screen)
    }

    pub fn grid(&self, screen: ScreenIndex) -> Option<&OccupancyGrid> {
        self.grids.iter().find(|grid| grid.screen() == screen)
    }

    /// First free placement across the held grids, in search order.
    pub fn find_cell_for_span(&self, span_x: usize, span_y: usize) -> Option<CellSpan> {
        self.grids.iter().find_map(|grid| {
            find_cell_for_span(grid, span_x, span_y)
                .map(|(x, y)| CellSpan::new(grid.screen(), x, y, span_x, span_y))
        })
    }

    /// Claims `span` so later searches on this `CellInfo` skip it.
    pub fn mark_occupied(&mut self, span: &CellSpan) -> Result<(), GridError> {
        let screens = self.grids.len();
        let grid = self
            .grids
            .iter_mut()
            .find(|grid| grid.screen() == span.screen)
            .ok_or(GridError::ScreenOutOfRange {
                screen: span.screen,
                screens,
            })?;
        grid.mark_occupied(span)
    }
}

/// Widens a search to every screen.
///
/// Grids are visited in ascending screen order regardless of the order they
/// are passed in. When `saved` is given, its mask replaces the live grid of
/// its screen; this is only meant for restoring one interrupted placement.
pub fn find_all_vacant(
    screens: &[OccupancyGrid],
    saved: Option<&SavedOccupancy>,
) -> Result<CellInfo, GridError> {
    let mut grids = screens.to_vec();
    grids.sort_by_key(OccupancyGrid::screen);

    if let Some(saved) = saved {
        let slot = grids
            .iter_mut()
            .find(|grid| grid.screen() == saved.screen)
            .ok_or(GridError::ScreenOutOfRange {
                screen: saved.screen,
                screens: screens.len(),
            })?;
        *slot = saved.to_grid()?;
    }

    Ok(CellInfo {
        screen: grids.first().map(OccupancyGrid::screen).unwrap_or_default(),
        cell_x: 0,
        cell_y: 0,
        span_x: 1,
        span_y: 1,
        grids,
    })
}

#[cfg(test)]
#[path = "tests/allocator_tests.rs"]
mod tests;
