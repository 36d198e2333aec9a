//! Per-screen occupancy model.

use crate::span::{CellSpan, GridSize, ScreenIndex};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GridError {
    SpanOutOfBounds { span: CellSpan, size: GridSize },
    MaskSizeMismatch { expected: usize, actual: usize },
    ScreenOutOfRange { screen: ScreenIndex, screens: usize },
}

impl std::fmt::Display for GridError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GridError::SpanOutOfBounds { span, size } => write!(
                f,
                "span {}x{} at ({}, {}) does not fit a {}x{} grid",
                span.span_x, span.span_y, span.x, span.y, size.width, size.height
            ),
            GridError::MaskSizeMismatch { expected, actual } => {
                write!(f, "occupancy mask has {actual} cells; expected {expected}")
            }
            GridError::ScreenOutOfRange { screen, screens } => {
                write!(f, "screen {screen} out of range; desk has {screens} screens")
            }
        }
    }
}

impl std::error::Error for GridError {}

/// Row-major matrix of claimed cells for one screen.
///
/// A cell is `true` once some placed item's span covers it. Grids are built
/// fresh for each allocation query and thrown away afterwards.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OccupancyGrid {
    screen: ScreenIndex,
    size: GridSize,
    cells: Vec<bool>,
}

impl OccupancyGrid {
    /// An empty grid.
    pub fn new(screen: ScreenIndex, size: GridSize) -> Self {
        Self {
            screen,
            size,
            cells: vec![false; size.cell_count()],
        }
    }

    /// Builds the grid for `screen` from the spans of already placed items.
    /// Spans that belong to other screens are ignored.
    pub fn build<'a>(
        screen: ScreenIndex,
        size: GridSize,
        placed: impl IntoIterator<Item = &'a CellSpan>,
    ) -> Result<Self, GridError> {
        let mut grid = Self::new(screen, size);
        for span in placed.into_iter().filter(|span| span.screen == screen) {
            grid.mark_occupied(span)?;
        }
        Ok(grid)
    }

    /// Rebuilds a grid from a row-major mask of `size.cell_count()` cells.
    pub fn from_mask(screen: ScreenIndex, size: GridSize, mask: &[bool]) -> Result<Self, GridError> {
        if size.width.checked_mul(size.height) != Some(mask.len()) {
            return Err(GridError::MaskSizeMismatch {
                expected: size.cell_count(),
                actual: mask.len(),
            });
        }
        Ok(Self {
            screen,
            size,
            cells: mask.to_vec(),
        })
    }

    pub fn screen(&self) -> ScreenIndex {
        self.screen
    }

    pub fn size(&self) -> GridSize {
        self.size
    }

    /// Claims every cell of `span`. The span's screen index is not checked.
    pub fn mark_occupied(&mut self, span: &CellSpan) -> Result<(), GridError> {
        if !span.fits(self.size) {
            return Err(GridError::SpanOutOfBounds {
                span: *span,
                size: self.size,
            });
        }
        for (x, y) in span.cells() {
            let index = self.index(x, y);
            self.cells[index] = true;
        }
        Ok(())
    }

    /// Returns true if the cell exists and is unclaimed.
    pub fn is_free(&self, x: usize, y: usize) -> bool {
        self.size.contains(x, y) && !self.cells[self.index(x, y)]
    }

    /// Returns true if the whole `span_x × span_y` rectangle at `(x, y)` is
    /// inside the grid and unclaimed.
    pub fn is_region_free(&self, x: usize, y: usize, span_x: usize, span_y: usize) -> bool {
        CellSpan::new(self.screen, x, y, span_x, span_y).fits(self.size)
            && (y..y + span_y).all(|row| (x..x + span_x).all(|col| !self.cells[self.index(col, row)]))
    }

    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|cell| **cell).count()
    }

    pub fn is_full(&self) -> bool {
        self.cells.iter().all(|cell| *cell)
    }

    /// The row-major occupancy mask.
    pub fn as_mask(&self) -> &[bool] {
        &self.cells
    }

    fn index(&self, x: usize, y: usize) -> usize {
        y * self.size.width + x
    }
}

/// Occupancy of one screen captured when a placement was interrupted, so the
/// exact grid can be re-derived later instead of recomputed from contents
/// that may since have changed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SavedOccupancy {
    pub screen: ScreenIndex,
    pub count_x: usize,
    pub count_y: usize,
    pub occupied: Vec<bool>,
}

impl SavedOccupancy {
    pub fn capture(grid: &OccupancyGrid) -> Self {
        Self {
            screen: grid.screen,
            count_x: grid.size.width,
            count_y: grid.size.height,
            occupied: grid.cells.clone(),
        }
    }

    pub fn to_grid(&self) -> Result<OccupancyGrid, GridError> {
        OccupancyGrid::from_mask(
            self.screen,
            GridSize::new(self.count_x, self.count_y),
            &self.occupied,
        )
    }
}

#[cfg(test)]
#[path = "tests/occupancy_tests.rs"]
mod tests;
