//! Match detection - finds maximal runs of equal idle tokens
//!
//! Detection reads the grid through [`KindView`], so the same scan answers both
//! "what matches now" (on a [`Grid`]) and "what would match after this swap"
//! (on a [`SwappedView`]) without touching the grid.

use std::collections::BTreeSet;

use crate::grid::Grid;
use crate::types::{Axis, Coord, Kind, Match, SwapIntent, MATCH_MIN_LEN};

/// Read-only view of the kinds that take part in matching
pub trait KindView {
    /// Edge length of the square grid
    fn size(&self) -> usize;

    /// Kind of the idle token at (row, col); `None` for empty, busy, kindless or off-grid cells
    fn matchable_kind(&self, row: i32, col: i32) -> Option<Kind>;
}

impl KindView for Grid {
    fn size(&self) -> usize {
        Grid::size(self)
    }

    fn matchable_kind(&self, row: i32, col: i32) -> Option<Kind> {
        self.get(row, col).and_then(|token| token.matchable_kind())
    }
}

/// A view that presents two cells as exchanged
#[derive(Debug, Clone, Copy)]
pub struct SwappedView<'a, V: KindView + ?Sized> {
    inner: &'a V,
    a: Coord,
    b: Coord,
}

impl<'a, V: KindView + ?Sized> SwappedView<'a, V> {
    pub fn new(inner: &'a V, a: Coord, b: Coord) -> Self {
        Self { inner, a, b }
    }
}

impl<V: KindView + ?Sized> KindView for SwappedView<'_, V> {
    fn size(&self) -> usize {
        self.inner.size()
    }

    fn matchable_kind(&self, row: i32, col: i32) -> Option<Kind> {
        let here = Coord::new(row, col);
        let source = if here == self.a {
            self.b
        } else if here == self.b {
            self.a
        } else {
            here
        };
        self.inner.matchable_kind(source.row, source.col)
    }
}

/// Result of one detection pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Matches {
    /// Horizontal runs, ordered by row then column
    pub rows: Vec<Match>,
    /// Vertical runs, ordered by column then row
    pub columns: Vec<Match>,
}

impl Matches {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() && self.columns.is_empty()
    }

    /// Number of match records (not cells)
    pub fn count(&self) -> usize {
        self.rows.len() + self.columns.len()
    }

    /// Every match, rows first
    pub fn iter(&self) -> impl Iterator<Item = &Match> {
        self.rows.iter().chain(self.columns.iter())
    }

    /// Union of all member cells
    pub fn cells(&self) -> BTreeSet<Coord> {
        self.iter().flat_map(|m| m.cells()).collect()
    }

    fn touches(&self, coord: Coord) -> bool {
        self.iter().any(|m| m.contains(coord))
    }
}

/// Run accumulator for a single line scan
#[derive(Debug, Clone, Copy)]
struct Run {
    kind: Kind,
    start: i32,
    length: usize,
}

/// Scan every row and every column for runs of at least [`MATCH_MIN_LEN`]
///
/// # Examples
///
/// ```
/// use gem_grid_core::{matcher, Grid};
/// use gem_grid_core::types::{Axis, Coord};
///
/// let grid = Grid::from_layout(&["AAAB", "BCDA", "CDAB", "DABC"]).unwrap();
/// let found = matcher::detect(&grid);
/// assert_eq!(found.rows.len(), 1);
/// assert_eq!(found.rows[0].origin, Coord::new(0, 0));
/// assert_eq!(found.rows[0].axis, Axis::Row);
/// assert!(found.columns.is_empty());
/// ```
pub fn detect<V: KindView + ?Sized>(view: &V) -> Matches {
    let size = view.size() as i32;
    let mut found = Matches::default();
    for row in 0..size {
        scan_line(view, Axis::Row, row, &mut found.rows);
    }
    for col in 0..size {
        scan_line(view, Axis::Column, col, &mut found.columns);
    }
    found
}

fn scan_line<V: KindView + ?Sized>(view: &V, axis: Axis, line: i32, out: &mut Vec<Match>) {
    let size = view.size() as i32;
    let cell = |pos: i32| match axis {
        Axis::Row => Coord::new(line, pos),
        Axis::Column => Coord::new(pos, line),
    };

    let mut run: Option<Run> = None;
    for pos in 0..size {
        let here = cell(pos);
        let kind = view.matchable_kind(here.row, here.col);
        let extends = matches!((run, kind), (Some(current), Some(kind)) if current.kind == kind);
        if extends {
            if let Some(current) = run.as_mut() {
                current.length += 1;
            }
        } else {
            close_run(run.take(), axis, &cell, out);
            run = kind.map(|kind| Run {
                kind,
                start: pos,
                length: 1,
            });
        }
    }
    close_run(run, axis, &cell, out);
}

fn close_run(run: Option<Run>, axis: Axis, cell: &impl Fn(i32) -> Coord, out: &mut Vec<Match>) {
    if let Some(run) = run {
        if run.length >= MATCH_MIN_LEN {
            out.push(Match::new(cell(run.start), axis, run.length));
        }
    }
}

/// True when exchanging `a` and `b` forms a match through either cell
pub fn swap_creates_match<V: KindView + ?Sized>(view: &V, a: Coord, b: Coord) -> bool {
    let swapped = detect(&SwappedView::new(view, a, b));
    swapped.touches(a) || swapped.touches(b)
}

/// True when the swap is allowed: it forms a match or moves a wildcard
pub fn is_legal_swap(grid: &Grid, a: Coord, b: Coord) -> bool {
    let (Some(first), Some(second)) = (grid.at(a), grid.at(b)) else {
        return false;
    };
    if !a.is_adjacent(b) || !first.is_idle() || !second.is_idle() {
        return false;
    }
    first.is_wildcard() || second.is_wildcard() || swap_creates_match(grid, a, b)
}

/// Every legal swap, rightward and downward from each cell in row-major order
pub fn legal_swaps(grid: &Grid) -> Vec<SwapIntent> {
    let size = grid.size() as i32;
    let mut swaps = Vec::new();
    for row in 0..size {
        for col in 0..size {
            let from = Coord::new(row, col);
            for to in [from.offset(0, 1), from.offset(1, 0)] {
                if is_legal_swap(grid, from, to) {
                    swaps.push(SwapIntent::new(from, to));
                }
            }
        }
    }
    swaps
}

/// No wildcard on the grid and no adjacent swap that forms a match
pub fn is_stalemate(grid: &Grid) -> bool {
    if grid.has_wildcard() {
        return false;
    }
    let size = grid.size() as i32;
    for row in 0..size {
        for col in 0..size {
            let from = Coord::new(row, col);
            if is_legal_swap(grid, from, from.offset(0, 1))
                || is_legal_swap(grid, from, from.offset(1, 0))
            {
                return false;
            }
        }
    }
    true
}
