//! Pixel to cell conversion.

/// Cell dimensions of a screen, in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GridMetrics {
    pub cell_width: u32,
    pub cell_height: u32,
}

impl GridMetrics {
    pub const fn new(cell_width: u32, cell_height: u32) -> Self {
        Self {
            cell_width,
            cell_height,
        }
    }

    /// Number of cells needed to show something at least `width × height`
    /// pixels large. Both sides are measured against the smaller cell side,
    /// and the result is never below one cell.
    pub fn rect_to_cell(&self, width: u32, height: u32) -> (usize, usize) {
        let smaller = self.cell_width.min(self.cell_height).max(1);
        let span_x = width.saturating_add(smaller) / smaller;
        let span_y = height.saturating_add(smaller) / smaller;
        (span_x.max(1) as usize, span_y.max(1) as usize)
    }
}

impl Default for GridMetrics {
    fn default() -> Self {
        Self::new(80, 100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rect_to_cell_rounds_against_smaller_side() {
        let metrics = GridMetrics::new(80, 100);
        assert_eq!(metrics.rect_to_cell(0, 0), (1, 1));
        assert_eq!(metrics.rect_to_cell(79, 79), (1, 1));
        assert_eq!(metrics.rect_to_cell(80, 150), (2, 2));
        assert_eq!(metrics.rect_to_cell(294, 72), (4, 1));
    }

    #[test]
    fn zero_sized_cells_do_not_divide_by_zero() {
        let metrics = GridMetrics::new(0, 0);
        assert_eq!(metrics.rect_to_cell(2, 0), (3, 1));
    }
}
