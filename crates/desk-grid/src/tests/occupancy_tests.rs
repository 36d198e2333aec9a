use super::*;

fn size() -> GridSize {
    GridSize::new(4, 3)
}

#[test]
fn build_marks_only_spans_on_its_screen() {
    let placed = [
        CellSpan::new(0, 0, 0, 2, 1),
        CellSpan::new(1, 3, 2, 1, 1),
        CellSpan::single(0, 3, 2),
    ];
    let grid = OccupancyGrid::build(0, size(), &placed).expect("valid spans");

    assert_eq!(grid.occupied_count(), 3);
    assert!(!grid.is_free(0, 0));
    assert!(!grid.is_free(1, 0));
    assert!(!grid.is_free(3, 2));
    assert!(grid.is_free(2, 0));
}

#[test]
fn out_of_bounds_span_is_rejected_without_partial_marks() {
    let mut grid = OccupancyGrid::new(0, size());
    let err = grid
        .mark_occupied(&CellSpan::new(0, 3, 0, 2, 1))
        .expect_err("span overhangs the right edge");

    assert!(matches!(err, GridError::SpanOutOfBounds { .. }));
    assert_eq!(grid.occupied_count(), 0);
}

#[test]
fn is_free_is_false_outside_the_grid() {
    let grid = OccupancyGrid::new(0, size());
    assert!(grid.is_free(3, 2));
    assert!(!grid.is_free(4, 0));
    assert!(!grid.is_free(0, 3));
}

#[test]
fn region_check_covers_every_cell() {
    let mut grid = OccupancyGrid::new(0, size());
    grid.mark_occupied(&CellSpan::single(0, 2, 1)).unwrap();

    assert!(grid.is_region_free(0, 0, 2, 2));
    assert!(!grid.is_region_free(1, 0, 2, 2));
    assert!(!grid.is_region_free(3, 0, 2, 1), "overhang is never free");
    assert!(!grid.is_region_free(0, 0, 0, 1), "empty spans are never free");
}

#[test]
fn mask_round_trip_preserves_cells() {
    let mut grid = OccupancyGrid::new(2, size());
    grid.mark_occupied(&CellSpan::new(2, 1, 1, 2, 2)).unwrap();

    let saved = SavedOccupancy::capture(&grid);
    assert_eq!(saved.screen, 2);
    assert_eq!((saved.count_x, saved.count_y), (4, 3));

    let restored = saved.to_grid().expect("mask matches counts");
    assert_eq!(restored, grid);
}

#[test]
fn oversized_counts_are_rejected_without_overflow() {
    let saved = SavedOccupancy {
        screen: 0,
        count_x: usize::MAX / 2,
        count_y: 4,
        occupied: vec![false; 16],
    };
    assert_eq!(
        saved.to_grid(),
        Err(GridError::MaskSizeMismatch {
            expected: usize::MAX,
            actual: 16
        })
    );
    assert_eq!(GridSize::new(usize::MAX, 2).cell_count(), usize::MAX);
}

#[test]
fn mask_with_wrong_length_is_rejected() {
    let saved = SavedOccupancy {
        screen: 0,
        count_x: 4,
        count_y: 4,
        occupied: vec![false; 12],
    };
    assert_eq!(
        saved.to_grid(),
        Err(GridError::MaskSizeMismatch {
            expected: 16,
            actual: 12
        })
    );
}
