use super::*;
use crate::span::GridSize;
use proptest::prelude::*;

fn grid_with(screen: ScreenIndex, size: GridSize, claimed: &[(usize, usize)]) -> OccupancyGrid {
    let spans: Vec<_> = claimed
        .iter()
        .map(|&(x, y)| CellSpan::single(screen, x, y))
        .collect();
    OccupancyGrid::build(screen, size, &spans).expect("claimed cells are in bounds")
}

#[test]
fn empty_grid_places_at_origin() {
    let grid = OccupancyGrid::new(0, GridSize::new(4, 4));
    assert_eq!(find_cell_for_span(&grid, 2, 2), Some((0, 0)));
}

#[test]
fn row_major_tie_break_prefers_upper_row() {
    // Free cells at (3, 0) and (0, 1); (3, 0) is in the upper row.
    let size = GridSize::new(4, 2);
    let grid = grid_with(0, size, &[(0, 0), (1, 0), (2, 0), (1, 1), (2, 1), (3, 1)]);
    assert_eq!(find_cell_for_span(&grid, 1, 1), Some((3, 0)));
}

#[test]
fn span_larger_than_grid_finds_nothing() {
    let grid = OccupancyGrid::new(0, GridSize::new(4, 4));
    assert_eq!(find_cell_for_span(&grid, 5, 1), None);
    assert_eq!(find_cell_for_span(&grid, 1, 5), None);
    assert_eq!(find_cell_for_span(&grid, 0, 1), None);
}

#[test]
fn l_shaped_free_area_has_no_room_for_two_by_two() {
    // Free cells: the left column plus the two cells right of its foot.
    let size = GridSize::new(4, 4);
    let free = [(0, 0), (0, 1), (0, 2), (0, 3), (1, 3), (2, 3)];
    let claimed: Vec<_> = (0..4)
        .flat_map(|y| (0..4).map(move |x| (x, y)))
        .filter(|cell| !free.contains(cell))
        .collect();
    let grid = grid_with(0, size, &claimed);

    assert_eq!(size.cell_count() - grid.occupied_count(), 6);
    assert_eq!(find_cell_for_span(&grid, 2, 2), None);

    let other = OccupancyGrid::new(1, size);
    let all = find_all_vacant(&[grid, other], None).expect("live grids only");
    assert_eq!(all.find_cell_for_span(2, 2), Some(CellSpan::new(1, 0, 0, 2, 2)));
}

#[test]
fn find_all_vacant_visits_screens_in_ascending_order() {
    let size = GridSize::new(2, 2);
    let screen2 = OccupancyGrid::new(2, size);
    let screen0 = grid_with(0, size, &[(0, 0), (1, 0), (0, 1), (1, 1)]);
    let screen1 = grid_with(1, size, &[(0, 0)]);

    let info = find_all_vacant(&[screen2, screen0, screen1], None).unwrap();
    assert_eq!(info.screens().collect::<Vec<_>>(), vec![0, 1, 2]);
    assert_eq!(info.find_cell_for_span(1, 1), Some(CellSpan::single(1, 1, 0)));
    assert_eq!(info.find_cell_for_span(2, 1), Some(CellSpan::new(1, 0, 1, 2, 1)));
    assert_eq!(info.find_cell_for_span(2, 2), Some(CellSpan::new(2, 0, 0, 2, 2)));
}

#[test]
fn saved_mask_overrides_only_its_screen() {
    let size = GridSize::new(2, 1);
    let live0 = OccupancyGrid::new(0, size);
    let live1 = OccupancyGrid::new(1, size);
    let saved = SavedOccupancy {
        screen: 0,
        count_x: 2,
        count_y: 1,
        occupied: vec![true, false],
    };

    let info = find_all_vacant(&[live0, live1], Some(&saved)).unwrap();
    assert!(!info.grid(0).unwrap().is_free(0, 0));
    assert!(info.grid(1).unwrap().is_free(0, 0));
    assert_eq!(info.find_cell_for_span(2, 1), Some(CellSpan::new(1, 0, 0, 2, 1)));
}

#[test]
fn saved_mask_for_unknown_screen_is_an_error() {
    let saved = SavedOccupancy {
        screen: 7,
        count_x: 1,
        count_y: 1,
        occupied: vec![false],
    };
    let grid = OccupancyGrid::new(0, GridSize::new(1, 1));
    assert_eq!(
        find_all_vacant(&[grid], Some(&saved)),
        Err(GridError::ScreenOutOfRange {
            screen: 7,
            screens: 1
        })
    );
}

#[test]
fn claiming_on_cell_info_moves_next_search() {
    let mut info = CellInfo::for_screen(OccupancyGrid::new(0, GridSize::new(3, 1)));
    let first = info.find_cell_for_span(1, 1).unwrap();
    info.mark_occupied(&first).unwrap();
    assert_eq!(info.find_cell_for_span(1, 1), Some(CellSpan::single(0, 1, 0)));

    let elsewhere = CellSpan::single(4, 0, 0);
    assert!(matches!(
        info.mark_occupied(&elsewhere),
        Err(GridError::ScreenOutOfRange { screen: 4, .. })
    ));
}

#[test]
fn from_saved_keeps_the_aimed_cell() {
    let saved = SavedOccupancy {
        screen: 3,
        count_x: 2,
        count_y: 2,
        occupied: vec![true, false, false, false],
    };
    let info = CellInfo::from_saved(&saved).unwrap().with_cell(1, 0, 1, 1);
    assert_eq!(info.screen, 3);
    assert_eq!((info.cell_x, info.cell_y), (1, 0));
    assert_eq!(info.find_cell_for_span(1, 1), Some(CellSpan::single(3, 1, 0)));
}

fn brute_force(grid: &OccupancyGrid, span_x: usize, span_y: usize) -> Vec<(usize, usize)> {
    let size = grid.size();
    let mut found = Vec::new();
    for y in 0..size.height {
        for x in 0..size.width {
            if grid.is_region_free(x, y, span_x, span_y) {
                found.push((x, y));
            }
        }
    }
    found
}

proptest! {
    #[test]
    fn result_is_free_and_first_in_reading_order(
        width in 1usize..7,
        height in 1usize..7,
        span_x in 1usize..4,
        span_y in 1usize..4,
        bits in proptest::collection::vec(any::<bool>(), 36),
    ) {
        let size = GridSize::new(width, height);
        let mask: Vec<bool> = bits.into_iter().take(size.cell_count()).collect();
        let grid = OccupancyGrid::from_mask(0, size, &mask).unwrap();

        let candidates = brute_force(&grid, span_x, span_y);
        match find_cell_for_span(&grid, span_x, span_y) {
            Some((x, y)) => {
                prop_assert!(grid.is_region_free(x, y, span_x, span_y));
                prop_assert_eq!(candidates.first().copied(), Some((x, y)));
            }
            None => prop_assert!(candidates.is_empty()),
        }
    }
}
