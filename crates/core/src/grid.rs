//! Grid module - owns the square grid of tokens
//!
//! The grid is a `size x size` array where each cell is empty or holds exactly one token.
//! Uses a flat vector in row-major order (`row * size + col`).
//! Coordinates: row 0 is the top row, column 0 the leftmost column.
//!
//! Reads are soft-guarded: asking for a cell outside the grid returns `None` instead of
//! failing, because gesture mapping and detonations routinely probe off-grid neighbours.

use std::collections::BTreeSet;
use std::fmt;

use arrayvec::ArrayVec;
use thiserror::Error;

use crate::rng::{RandomSource, TokenFactory};
use crate::types::{Activity, Coord, Effect, Kind, Token, TokenId, AREA_RADIUS};

/// Cells in a full area-blast neighbourhood
const AREA_CELLS: usize = ((2 * AREA_RADIUS + 1) * (2 * AREA_RADIUS + 1)) as usize;

/// Grid mutation failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GridError {
    #[error("cell ({row}, {col}) is outside the grid")]
    OutOfBounds { row: i32, col: i32 },
    #[error("cell ({row}, {col}) already holds a token")]
    Occupied { row: i32, col: i32 },
    #[error("layout row {row}: {reason}")]
    InvalidLayout { row: usize, reason: &'static str },
    #[error("token for ({row}, {col}) has no kind but is not a wildcard")]
    KindlessToken { row: i32, col: i32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct Slot {
    id: TokenId,
    token: Token,
}

/// The game grid - `size x size` cells using flat vector storage
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Grid {
    size: usize,
    /// Row-major cells (row * size + col)
    cells: Vec<Option<Slot>>,
    next_id: u32,
}

impl Grid {
    /// Create a new empty grid
    pub fn new(size: usize) -> Self {
        Self {
            size,
            cells: vec![None; size * size],
            next_id: 0,
        }
    }

    /// Create a grid with every cell populated by the factory (row-major order)
    pub fn filled<F: TokenFactory + ?Sized>(size: usize, factory: &mut F) -> Self {
        let mut grid = Self::new(size);
        for row in 0..size as i32 {
            for col in 0..size as i32 {
                let token = factory.new_token(row, col);
                grid.insert(Coord::new(row, col), token);
            }
        }
        grid
    }

    /// Build a grid from text rows: `A`..`Z` are kinds 0..25, `*` a wildcard, `.` empty
    ///
    /// # Examples
    ///
    /// ```
    /// use gem_grid_core::Grid;
    /// use gem_grid_core::types::Kind;
    ///
    /// let grid = Grid::from_layout(&["AB", "*."]).unwrap();
    /// assert_eq!(grid.get(0, 1).and_then(|t| t.kind), Some(Kind(1)));
    /// assert!(grid.get(1, 0).unwrap().is_wildcard());
    /// assert!(grid.get(1, 1).is_none());
    /// ```
    pub fn from_layout(rows: &[&str]) -> Result<Self, GridError> {
        if rows.is_empty() {
            return Err(GridError::InvalidLayout {
                row: 0,
                reason: "layout has no rows",
            });
        }
        let size = rows.len();
        let mut grid = Self::new(size);
        for (row, line) in rows.iter().enumerate() {
            if line.chars().count() != size {
                return Err(GridError::InvalidLayout {
                    row,
                    reason: "row length does not match the number of rows",
                });
            }
            for (col, c) in line.chars().enumerate() {
                let token = match c {
                    '.' => continue,
                    '*' => Token::wildcard(),
                    _ => match Kind::from_letter(c) {
                        Some(kind) => Token::new(kind),
                        None => {
                            return Err(GridError::InvalidLayout {
                                row,
                                reason: "unknown cell character",
                            })
                        }
                    },
                };
                grid.insert(Coord::new(row as i32, col as i32), token);
            }
        }
        Ok(grid)
    }

    /// Calculate flat index from (row, col) coordinates
    #[inline(always)]
    fn index(&self, row: i32, col: i32) -> Option<usize> {
        let size = self.size as i32;
        if row < 0 || row >= size || col < 0 || col >= size {
            return None;
        }
        Some(row as usize * self.size + col as usize)
    }

    fn coord_of(&self, idx: usize) -> Coord {
        Coord::new((idx / self.size) as i32, (idx % self.size) as i32)
    }

    /// Edge length of the grid
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn is_in_bounds(&self, row: i32, col: i32) -> bool {
        self.index(row, col).is_some()
    }

    pub fn contains(&self, coord: Coord) -> bool {
        self.is_in_bounds(coord.row, coord.col)
    }

    /// Get token at (row, col)
    /// Returns None if the cell is empty or out of bounds
    pub fn get(&self, row: i32, col: i32) -> Option<&Token> {
        let idx = self.index(row, col)?;
        self.cells[idx].as_ref().map(|slot| &slot.token)
    }

    pub fn at(&self, coord: Coord) -> Option<&Token> {
        self.get(coord.row, coord.col)
    }

    /// Identity of the token at (row, col)
    pub fn id_at(&self, row: i32, col: i32) -> Option<TokenId> {
        let idx = self.index(row, col)?;
        self.cells[idx].as_ref().map(|slot| slot.id)
    }

    /// Find where a token currently sits
    pub fn locate(&self, id: TokenId) -> Option<Coord> {
        self.cells
            .iter()
            .position(|cell| cell.is_some_and(|slot| slot.id == id))
            .map(|idx| self.coord_of(idx))
    }

    /// Token by identity
    pub fn token(&self, id: TokenId) -> Option<&Token> {
        self.cells
            .iter()
            .flatten()
            .find(|slot| slot.id == id)
            .map(|slot| &slot.token)
    }

    /// Occupied cells in row-major order
    pub fn iter(&self) -> impl Iterator<Item = (Coord, TokenId, &Token)> + '_ {
        self.cells.iter().enumerate().filter_map(move |(idx, cell)| {
            cell.as_ref()
                .map(|slot| (self.coord_of(idx), slot.id, &slot.token))
        })
    }

    /// Every token currently on the grid
    pub fn token_ids(&self) -> BTreeSet<TokenId> {
        self.cells.iter().flatten().map(|slot| slot.id).collect()
    }

    /// Number of occupied cells
    pub fn len(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(|cell| cell.is_none())
    }

    pub fn is_full(&self) -> bool {
        self.cells.iter().all(|cell| cell.is_some())
    }

    /// Put a token into an empty cell, assigning it a fresh identity
    pub fn place(&mut self, coord: Coord, token: Token) -> Result<TokenId, GridError> {
        let idx = self
            .index(coord.row, coord.col)
            .ok_or(GridError::OutOfBounds {
                row: coord.row,
                col: coord.col,
            })?;
        if self.cells[idx].is_some() {
            return Err(GridError::Occupied {
                row: coord.row,
                col: coord.col,
            });
        }
        if !token.is_consistent() {
            return Err(GridError::KindlessToken {
                row: coord.row,
                col: coord.col,
            });
        }
        let id = self.allocate_id();
        self.cells[idx] = Some(Slot { id, token });
        Ok(id)
    }

    /// Internal placement into a cell the caller knows is empty
    pub(crate) fn insert(&mut self, coord: Coord, token: Token) -> TokenId {
        match self.place(coord, token) {
            Ok(id) => id,
            Err(err) => panic!("grid invariant violated: {err}"),
        }
    }

    fn allocate_id(&mut self) -> TokenId {
        let id = TokenId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        id
    }

    /// Remove and return the token at `coord`
    pub fn take(&mut self, coord: Coord) -> Option<(TokenId, Token)> {
        let idx = self.index(coord.row, coord.col)?;
        self.cells[idx].take().map(|slot| (slot.id, slot.token))
    }

    /// Move a token (keeping its identity) into an empty cell
    ///
    /// Returns the moved token's id, or `None` when `from` was empty.
    pub(crate) fn shift(&mut self, from: Coord, to: Coord) -> Option<TokenId> {
        let from_idx = self.index(from.row, from.col)?;
        let to_idx = self.index(to.row, to.col)?;
        let slot = self.cells[from_idx].take()?;
        assert!(
            self.cells[to_idx].is_none(),
            "grid invariant violated: cell ({}, {}) already holds a token",
            to.row,
            to.col
        );
        self.cells[to_idx] = Some(slot);
        Some(slot.id)
    }

    /// Exchange the contents of two cells
    ///
    /// No adjacency or legality check; out-of-bounds coordinates are ignored.
    pub fn swap(&mut self, a: Coord, b: Coord) {
        if let (Some(ia), Some(ib)) = (self.index(a.row, a.col), self.index(b.row, b.col)) {
            self.cells.swap(ia, ib);
        }
    }

    /// Assign an effect to the token at `coord`
    /// Returns false if the cell is empty or out of bounds
    ///
    /// Panics when asked to give a wildcard any other effect.
    pub fn set_effect(&mut self, coord: Coord, effect: Effect) -> bool {
        let Some(idx) = self.index(coord.row, coord.col) else {
            return false;
        };
        match self.cells[idx].as_mut() {
            Some(slot) => {
                slot.token = slot.token.with_effect(effect);
                true
            }
            None => false,
        }
    }

    /// Set the activity of every token in `ids`
    pub fn mark(&mut self, ids: &BTreeSet<TokenId>, activity: Activity) {
        for slot in self.cells.iter_mut().flatten() {
            if ids.contains(&slot.id) {
                slot.token.activity = activity;
            }
        }
    }

    pub fn has_wildcard(&self) -> bool {
        self.cells
            .iter()
            .flatten()
            .any(|slot| slot.token.is_wildcard())
    }

    /// Remove every token
    pub fn clear(&mut self) {
        for cell in &mut self.cells {
            *cell = None;
        }
    }

    /// In-bounds cells within the area-blast radius of `center` (including it)
    pub fn neighborhood(&self, center: Coord) -> ArrayVec<Coord, AREA_CELLS> {
        let mut out = ArrayVec::new();
        for d_row in -AREA_RADIUS..=AREA_RADIUS {
            for d_col in -AREA_RADIUS..=AREA_RADIUS {
                let coord = center.offset(d_row, d_col);
                if self.contains(coord) {
                    out.push(coord);
                }
            }
        }
        out
    }

    /// Remove every token in `tokens` and gather what their effects detonate
    ///
    /// All listed tokens leave the grid first; then each removed token's effect collects
    /// the idle tokens still on the grid:
    /// - row clear: its row
    /// - column clear: its column
    /// - area blast: its 3x3 neighbourhood
    /// - wildcard: every token of a kind drawn from `rng` now
    ///
    /// Returns the union of collected tokens.
    pub fn remove_and_collect_chain<R: RandomSource + ?Sized>(
        &mut self,
        tokens: &BTreeSet<TokenId>,
        kinds_count: u8,
        rng: &mut R,
    ) -> BTreeSet<TokenId> {
        let mut removed = Vec::with_capacity(tokens.len());
        for idx in 0..self.cells.len() {
            let hit = self.cells[idx].is_some_and(|slot| tokens.contains(&slot.id));
            if hit {
                if let Some(slot) = self.cells[idx].take() {
                    removed.push((self.coord_of(idx), slot.token));
                }
            }
        }

        let mut chained = BTreeSet::new();
        let size = self.size as i32;
        for (coord, token) in &removed {
            match token.effect {
                Effect::None => {}
                Effect::RowClear => {
                    for col in 0..size {
                        self.collect_idle(Coord::new(coord.row, col), &mut chained);
                    }
                }
                Effect::ColumnClear => {
                    for row in 0..size {
                        self.collect_idle(Coord::new(row, coord.col), &mut chained);
                    }
                }
                Effect::AreaBlast => {
                    for near in self.neighborhood(*coord) {
                        self.collect_idle(near, &mut chained);
                    }
                }
                Effect::Wildcard => {
                    if kinds_count == 0 {
                        continue;
                    }
                    let target = Kind(rng.next_range(kinds_count as u32) as u8);
                    log::debug!(
                        "wildcard at ({}, {}) targets kind {}",
                        coord.row,
                        coord.col,
                        target.letter()
                    );
                    for slot in self.cells.iter().flatten() {
                        if slot.token.matchable_kind() == Some(target) {
                            chained.insert(slot.id);
                        }
                    }
                }
            }
        }

        log::debug!(
            "removed {} tokens, {} chained by effects",
            removed.len(),
            chained.len()
        );
        chained
    }

    fn collect_idle(&self, coord: Coord, out: &mut BTreeSet<TokenId>) {
        let Some(idx) = self.index(coord.row, coord.col) else {
            return;
        };
        if let Some(slot) = &self.cells[idx] {
            if slot.token.is_idle() {
                out.insert(slot.id);
            }
        }
    }
}

impl fmt::Display for Grid {
    /// Same notation as [`Grid::from_layout`], one line per row
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..self.size as i32 {
            if row > 0 {
                writeln!(f)?;
            }
            for col in 0..self.size as i32 {
                let c = match self.get(row, col) {
                    None => '.',
                    Some(token) => match token.kind {
                        Some(kind) => kind.letter(),
                        None => '*',
                    },
                };
                write!(f, "{c}")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::SimpleRng;

    #[test]
    fn test_grid_index_calculation() {
        let grid = Grid::new(8);
        assert_eq!(grid.index(0, 0), Some(0));
        assert_eq!(grid.index(0, 7), Some(7));
        assert_eq!(grid.index(1, 0), Some(8));
        assert_eq!(grid.index(7, 7), Some(63));
        assert_eq!(grid.index(-1, 0), None);
        assert_eq!(grid.index(0, 8), None);
        assert_eq!(grid.index(8, 0), None);
    }

    #[test]
    fn test_place_assigns_fresh_ids() {
        let mut grid = Grid::new(3);
        let a = grid.place(Coord::new(0, 0), Token::new(Kind(0))).unwrap();
        let b = grid.place(Coord::new(0, 1), Token::new(Kind(0))).unwrap();
        assert_ne!(a, b);
        assert_eq!(grid.id_at(0, 0), Some(a));
        assert_eq!(grid.locate(b), Some(Coord::new(0, 1)));
    }

    #[test]
    fn test_place_rejects_occupied_and_out_of_bounds() {
        let mut grid = Grid::new(3);
        grid.place(Coord::new(1, 1), Token::new(Kind(0))).unwrap();
        assert_eq!(
            grid.place(Coord::new(1, 1), Token::new(Kind(1))),
            Err(GridError::Occupied { row: 1, col: 1 })
        );
        assert_eq!(
            grid.place(Coord::new(3, 0), Token::new(Kind(1))),
            Err(GridError::OutOfBounds { row: 3, col: 0 })
        );
    }

    #[test]
    #[should_panic(expected = "already holds a token")]
    fn test_shift_into_occupied_cell_panics() {
        let mut grid = Grid::from_layout(&["AB", ".."]).unwrap();
        grid.shift(Coord::new(0, 0), Coord::new(0, 1));
    }

    #[test]
    #[should_panic(expected = "kindless token cannot carry")]
    fn test_set_effect_on_wildcard_panics() {
        let mut grid = Grid::from_layout(&["*A", "AB"]).unwrap();
        grid.set_effect(Coord::new(0, 0), Effect::RowClear);
    }

    #[test]
    fn test_place_rejects_kindless_effect_token() {
        let mut grid = Grid::new(3);
        let broken = Token {
            kind: None,
            effect: Effect::RowClear,
            activity: Activity::Idle,
        };
        assert_eq!(
            grid.place(Coord::new(1, 1), broken),
            Err(GridError::KindlessToken { row: 1, col: 1 })
        );
        assert!(grid.is_empty());
    }

    #[test]
    fn test_layout_roundtrip_display() {
        let rows = ["AB*", "C.A", "BBB"];
        let grid = Grid::from_layout(&rows).unwrap();
        assert_eq!(grid.to_string(), rows.join("\n"));
    }

    #[test]
    fn test_layout_rejects_ragged_rows() {
        let err = Grid::from_layout(&["AB", "A"]).unwrap_err();
        assert!(matches!(err, GridError::InvalidLayout { row: 1, .. }));
    }

    #[test]
    fn test_neighborhood_is_clamped() {
        let grid = Grid::new(4);
        assert_eq!(grid.neighborhood(Coord::new(0, 0)).len(), 4);
        assert_eq!(grid.neighborhood(Coord::new(0, 2)).len(), 6);
        assert_eq!(grid.neighborhood(Coord::new(1, 1)).len(), 9);
    }

    #[test]
    fn test_area_blast_collects_neighbours_only() {
        let mut grid = Grid::from_layout(&["ABCD", "BCDA", "CDAB", "DABC"]).unwrap();
        grid.set_effect(Coord::new(1, 1), Effect::AreaBlast);
        let center = grid.id_at(1, 1).unwrap();

        let mut rng = SimpleRng::new(1);
        let chained = grid.remove_and_collect_chain(&BTreeSet::from([center]), 4, &mut rng);

        assert!(grid.get(1, 1).is_none());
        assert_eq!(chained.len(), 8);
        for (coord, id, _) in grid.iter() {
            assert_eq!(chained.contains(&id), coord.distance(Coord::new(1, 1)) <= 1);
        }
    }

    #[test]
    fn test_chain_skips_busy_tokens() {
        let mut grid = Grid::from_layout(&["AAA", "BBB", "CCC"]).unwrap();
        grid.set_effect(Coord::new(1, 0), Effect::ColumnClear);
        let busy = BTreeSet::from([grid.id_at(0, 0).unwrap()]);
        grid.mark(&busy, Activity::Falling);

        let trigger = BTreeSet::from([grid.id_at(1, 0).unwrap()]);
        let chained = grid.remove_and_collect_chain(&trigger, 3, &mut SimpleRng::new(1));

        assert_eq!(chained, BTreeSet::from([grid.id_at(2, 0).unwrap()]));
    }

    #[test]
    fn test_wildcard_collects_a_single_kind() {
        let mut grid = Grid::from_layout(&["*AB", "CAB", "CAB"]).unwrap();
        let wild = BTreeSet::from([grid.id_at(0, 0).unwrap()]);

        let chained = grid.remove_and_collect_chain(&wild, 3, &mut SimpleRng::new(42));

        assert!(!chained.is_empty());
        let kinds: BTreeSet<Option<Kind>> = chained
            .iter()
            .map(|id| grid.token(*id).unwrap().kind)
            .collect();
        assert_eq!(kinds.len(), 1, "wildcard must target exactly one kind");
        let target = kinds.into_iter().next().flatten().unwrap();
        let expected = grid
            .iter()
            .filter(|(_, _, t)| t.kind == Some(target))
            .count();
        assert_eq!(chained.len(), expected);
    }

    #[test]
    fn test_swap_ignores_out_of_bounds() {
        let mut grid = Grid::from_layout(&["AB", "CD"]).unwrap();
        let before = grid.clone();
        grid.swap(Coord::new(0, 0), Coord::new(0, 5));
        assert_eq!(grid, before);

        grid.swap(Coord::new(0, 0), Coord::new(1, 1));
        assert_eq!(grid.to_string(), "DB\nCA");
    }
}
