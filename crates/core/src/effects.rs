//! Effect resolution - turns a detection pass into the set of tokens to remove
//!
//! Where a row match crosses a column match the crossing token becomes an area blast,
//! so it detonates when the matched tokens disappear.

use std::collections::BTreeSet;

use crate::grid::Grid;
use crate::matcher::Matches;
use crate::types::{Coord, Effect, TokenId};

/// Crossing cells of every (row match, column match) pair, in rows x columns order
pub fn intersections(matches: &Matches) -> impl Iterator<Item = Coord> + '_ {
    matches.rows.iter().flat_map(move |row_match| {
        matches
            .columns
            .iter()
            .filter_map(move |col_match| row_match.intersection(col_match))
    })
}

/// Assign area blasts at intersections, then collect every matched token
pub fn resolve(grid: &mut Grid, matches: &Matches) -> BTreeSet<TokenId> {
    for cross in intersections(matches) {
        log::debug!("area blast at ({}, {})", cross.row, cross.col);
        grid.set_effect(cross, Effect::AreaBlast);
    }
    matches
        .iter()
        .flat_map(|m| m.cells())
        .filter_map(|cell| grid.id_at(cell.row, cell.col))
        .collect()
}
