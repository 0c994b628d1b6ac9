//! Gravity - moves tokens down into gaps and spawns new ones at the top
//!
//! One [`step`] moves every token above a gap down by exactly one cell. The sequencer
//! calls it once per idle evaluation and animates each step, so a deep gap takes
//! several falls to close.

use std::collections::BTreeSet;

use crate::grid::Grid;
use crate::rng::TokenFactory;
use crate::types::{Coord, TokenId};

/// Advance every column by one slot of movement
///
/// Columns are scanned bottom-up: an empty cell pulls the token directly above it,
/// and an empty top cell is filled from the factory. Returns every token that moved or
/// was spawned; an empty set means the grid is full.
pub fn step<F: TokenFactory + ?Sized>(grid: &mut Grid, factory: &mut F) -> BTreeSet<TokenId> {
    let size = grid.size() as i32;
    let mut moved = BTreeSet::new();
    for col in 0..size {
        for row in (0..size).rev() {
            if grid.id_at(row, col).is_some() {
                continue;
            }
            let here = Coord::new(row, col);
            if row > 0 {
                if let Some(id) = grid.shift(Coord::new(row - 1, col), here) {
                    moved.insert(id);
                }
            } else {
                let token = factory.new_token(0, col);
                moved.insert(grid.insert(here, token));
            }
        }
    }
    if !moved.is_empty() {
        log::trace!("gravity step moved {} tokens", moved.len());
    }
    moved
}

/// Repeat [`step`] until nothing moves; returns the number of steps taken
pub fn settle<F: TokenFactory + ?Sized>(grid: &mut Grid, factory: &mut F) -> usize {
    let mut steps = 0;
    while !step(grid, factory).is_empty() {
        steps += 1;
    }
    steps
}
