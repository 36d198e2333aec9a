//! Grid dimensions and cell spans.

/// Index of a screen on the desk, counted from zero.
pub type ScreenIndex = usize;

/// Number of columns and rows on a single screen.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GridSize {
    pub width: usize,
    pub height: usize,
}

impl GridSize {
    pub const fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    /// Total number of cells on one screen, saturating at `usize::MAX`.
    pub fn cell_count(&self) -> usize {
        self.width.saturating_mul(self.height)
    }

    /// Returns true if `(x, y)` names a cell of this grid.
    pub fn contains(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height
    }
}

impl Default for GridSize {
    fn default() -> Self {
        Self::new(4, 4)
    }
}

/// A rectangular run of cells on one screen.
///
/// `(x, y)` is the top-left cell. A well-formed span has both extents of at
/// least one and lies entirely inside the grid of its screen; see
/// [`CellSpan::fits`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CellSpan {
    pub screen: ScreenIndex,
    pub x: usize,
    pub y: usize,
    pub span_x: usize,
    pub span_y: usize,
}

impl CellSpan {
    pub const fn new(screen: ScreenIndex, x: usize, y: usize, span_x: usize, span_y: usize) -> Self {
        Self {
            screen,
            x,
            y,
            span_x,
            span_y,
        }
    }

    /// A single cell.
    pub const fn single(screen: ScreenIndex, x: usize, y: usize) -> Self {
        Self::new(screen, x, y, 1, 1)
    }

    /// Returns true if the span is non-empty and lies inside `size`.
    pub fn fits(&self, size: GridSize) -> bool {
        if self.span_x == 0 || self.span_y == 0 {
            return false;
        }
        let right = self.x.checked_add(self.span_x);
        let bottom = self.y.checked_add(self.span_y);
        matches!((right, bottom), (Some(r), Some(b)) if r <= size.width && b <= size.height)
    }

    /// Cells covered by the span in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize)> {
        let (x, y, span_x, span_y) = (self.x, self.y, self.span_x, self.span_y);
        (y..y + span_y).flat_map(move |row| (x..x + span_x).map(move |col| (col, row)))
    }

    /// Returns true if both spans sit on the same screen and share a cell.
    pub fn overlaps(&self, other: &CellSpan) -> bool {
        self.screen == other.screen
            && self.x < other.x + other.span_x
            && other.x < self.x + self.span_x
            && self.y < other.y + other.span_y
            && other.y < self.y + self.span_y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fits_rejects_empty_and_overhanging_spans() {
        let size = GridSize::new(4, 4);
        assert!(CellSpan::new(0, 2, 2, 2, 2).fits(size));
        assert!(!CellSpan::new(0, 3, 0, 2, 1).fits(size));
        assert!(!CellSpan::new(0, 0, 0, 0, 1).fits(size));
        assert!(!CellSpan::new(0, usize::MAX, 0, 2, 1).fits(size));
    }

    #[test]
    fn cells_walk_rows_first() {
        let span = CellSpan::new(0, 1, 1, 2, 2);
        let cells: Vec<_> = span.cells().collect();
        assert_eq!(cells, vec![(1, 1), (2, 1), (1, 2), (2, 2)]);
    }

    #[test]
    fn overlap_requires_same_screen() {
        let a = CellSpan::new(0, 0, 0, 2, 2);
        let b = CellSpan::new(0, 1, 1, 1, 1);
        let c = CellSpan::new(1, 1, 1, 1, 1);
        let d = CellSpan::new(0, 2, 0, 1, 1);
        assert!(a.overlaps(&b));
        assert!(!a.overlaps(&c));
        assert!(!a.overlaps(&d));
    }
}
