//! Screen geometry mapping from pointer positions to grid cells.

use crate::types::Coord;

/// Share of the viewport width the board occupies when fitted
const BOARD_FILL: f32 = 0.96;

/// Where the board sits on screen.
///
/// Screen x grows to the right and maps to columns; screen y grows downward and maps
/// to rows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoardGeometry {
    pub cell_size: f32,
    pub offset_x: f32,
    pub offset_y: f32,
    /// Margin added on both axes when the board is centred in its viewport
    pub board_offset: f32,
    pub grid_size: usize,
}

impl BoardGeometry {
    pub fn new(grid_size: usize, cell_size: f32) -> Self {
        Self {
            cell_size,
            offset_x: 0.0,
            offset_y: 0.0,
            board_offset: 0.0,
            grid_size,
        }
    }

    /// Fit a `grid_size` board into a viewport, centred horizontally.
    ///
    /// Cells are whole pixels and the board fills 96% of the width.
    pub fn fit(grid_size: usize, x: f32, y: f32, width: f32) -> Self {
        let mut geometry = Self::new(grid_size, 1.0);
        geometry.resize(x, y, width);
        geometry
    }

    /// Recompute cell size and margins for a new viewport.
    pub fn resize(&mut self, x: f32, y: f32, width: f32) {
        let size = self.grid_size.max(1) as f32;
        self.cell_size = (BOARD_FILL * width / size).floor().max(1.0);
        self.board_offset = ((width - self.cell_size * size) / 2.0).floor();
        self.offset_x = x;
        self.offset_y = y;
    }

    /// Cell index along one axis; may fall outside the grid.
    pub fn coord_to_index(&self, coord: f32, offset: f32) -> i32 {
        ((coord - self.board_offset - offset) / self.cell_size).floor() as i32
    }

    /// Cell under a screen point, whether or not it is on the grid.
    pub fn cell_at(&self, x: f32, y: f32) -> Coord {
        Coord::new(
            self.coord_to_index(y, self.offset_y),
            self.coord_to_index(x, self.offset_x),
        )
    }

    pub fn contains(&self, cell: Coord) -> bool {
        let size = self.grid_size as i32;
        (0..size).contains(&cell.row) && (0..size).contains(&cell.col)
    }

    /// Screen position of a cell's centre.
    pub fn cell_center(&self, cell: Coord) -> (f32, f32) {
        let half = self.cell_size / 2.0;
        (
            self.offset_x + self.board_offset + cell.col as f32 * self.cell_size + half,
            self.offset_y + self.board_offset + cell.row as f32 * self.cell_size + half,
        )
    }
}
