//! Gravity tests - falling and refilling

use gem_grid::core::{gravity, Grid, TokenFactory};
use gem_grid::types::{Coord, Kind, Token};

/// Spawns kinds in order, remembering where each spawn landed
#[derive(Default)]
struct Recording {
    next: u8,
    spawned_at: Vec<(i32, i32)>,
}

impl TokenFactory for Recording {
    fn new_token(&mut self, row: i32, col: i32) -> Token {
        self.spawned_at.push((row, col));
        let kind = Kind(3 + self.next % 3);
        self.next += 1;
        Token::new(kind)
    }
}

fn column(grid: &Grid, col: i32) -> String {
    (0..grid.size() as i32)
        .map(|row| match grid.get(row, col) {
            Some(token) => token.kind.map_or('*', |k| k.letter()),
            None => '.',
        })
        .collect()
}

#[test]
fn test_gap_closes_preserving_order() {
    let mut grid = Grid::from_layout(&[
        "AAAAA", "BBBBB", ".....", "CCCCC", "DDDDD",
    ])
    .unwrap();
    let ids_above: Vec<_> = (0..2).map(|row| grid.id_at(row, 2).unwrap()).collect();

    let mut factory = Recording::default();
    let mut steps = 0;
    while !gravity::step(&mut grid, &mut factory).is_empty() {
        steps += 1;
        assert!(steps <= 5, "gravity never settled");
    }

    assert!(grid.is_full());
    for col in 0..5 {
        assert_eq!(&column(&grid, col)[1..], "ABCD");
    }
    // the same tokens, one row lower
    assert_eq!(grid.locate(ids_above[0]), Some(Coord::new(1, 2)));
    assert_eq!(grid.locate(ids_above[1]), Some(Coord::new(2, 2)));
    assert_eq!(steps, 1);
}

#[test]
fn test_spawns_only_enter_the_top_row() {
    let mut grid = Grid::from_layout(&["...", "...", "A.."]).unwrap();
    let mut factory = Recording::default();
    let spawned = gravity::settle(&mut grid, &mut factory);

    assert_eq!(spawned, 3);
    assert_eq!(factory.spawned_at.len(), 8);
    assert!(factory.spawned_at.iter().all(|&(row, _)| row == 0));
    assert_eq!(grid.get(2, 0).and_then(|t| t.kind), Some(Kind(0)));
}

#[test]
fn test_step_reports_moved_and_spawned() {
    let mut grid = Grid::from_layout(&["A.", "B."]).unwrap();
    // pull B out of the bottom row
    grid.take(Coord::new(1, 0));
    let a = grid.id_at(0, 0).unwrap();

    let moved = gravity::step(&mut grid, &mut Recording::default());
    assert!(moved.contains(&a));
    // column 0: A fell and one token spawned; column 1: one spawn
    assert_eq!(moved.len(), 3);
}
