use stepwise_space::{Cell, Grid4, Heuristic, SpaceError, NEIGHBOUR_OFFSETS};

#[test]
fn neighbour_offsets_are_north_south_west_east() {
    assert_eq!(NEIGHBOUR_OFFSETS, [(-1, 0), (1, 0), (0, -1), (0, 1)]);
}

#[test]
fn blocked_cells_are_addressable_but_not_open() {
    let mut g = Grid4::new(3, 3).unwrap();
    g.set_blocked(Cell::new(1, 1), true).unwrap();
    assert!(g.contains(Cell::new(1, 1)));
    assert!(g.is_blocked(Cell::new(1, 1)));
    assert!(!g.is_open(Cell::new(1, 1)));
    assert!(!g.open_neighbours(Cell::new(0, 1)).contains(&Cell::new(1, 1)));

    g.set_blocked(Cell::new(1, 1), false).unwrap();
    assert!(g.is_open(Cell::new(1, 1)));
}

#[test]
fn out_of_bounds_cells_are_neither_open_nor_blocked() {
    let g = Grid4::new(2, 2).unwrap();
    let outside = Cell::new(5, 5);
    assert!(!g.is_open(outside));
    assert!(!g.is_blocked(outside));
    assert!(matches!(
        g.check_bounds(outside),
        Err(SpaceError::CellOutOfBounds { .. })
    ));
}

#[test]
fn only_manhattan_is_tight() {
    assert!(Heuristic::Manhattan.is_tight_for_4_connected());
    assert!(!Heuristic::Euclidean.is_tight_for_4_connected());
    assert!(!Heuristic::Chebyshev.is_tight_for_4_connected());
}

#[test]
fn error_messages_are_descriptive() {
    assert_eq!(
        SpaceError::EmptySpace.to_string(),
        "grid must have at least one cell"
    );
    let err = Grid4::new(2, 2)
        .unwrap()
        .check_bounds(Cell::new(2, 0))
        .unwrap_err();
    assert_eq!(err.to_string(), "cell (2, 0) out of bounds: [0, 2) x [0, 2)");
}
