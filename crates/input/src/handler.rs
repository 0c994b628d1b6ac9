//! Pointer gesture handler turning drags into swap intents.
//!
//! A press anchors on a cell; moving far enough away (one cell while dragging, a quarter
//! cell on release) picks the neighbour along the dominant axis.

use crate::map::BoardGeometry;
use crate::types::{Coord, SwapIntent};

/// Share of a cell the pointer must travel before a release counts as a swipe
const RELEASE_THRESHOLD: f32 = 0.25;

/// Raw pointer input in screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Down { x: f32, y: f32 },
    Move { x: f32, y: f32 },
    Up { x: f32, y: f32 },
    Cancel,
}

/// Tracks the pressed anchor between pointer events.
#[derive(Debug, Clone)]
pub struct GestureMapper {
    geometry: BoardGeometry,
    anchor: Option<(f32, f32)>,
}

impl GestureMapper {
    pub fn new(geometry: BoardGeometry) -> Self {
        Self {
            geometry,
            anchor: None,
        }
    }

    pub fn geometry(&self) -> &BoardGeometry {
        &self.geometry
    }

    /// Replace the geometry after a viewport change; any gesture in progress is dropped.
    pub fn set_geometry(&mut self, geometry: BoardGeometry) {
        self.geometry = geometry;
        self.anchor = None;
    }

    pub fn is_pressed(&self) -> bool {
        self.anchor.is_some()
    }

    /// Feed one pointer event; returns a swap intent when a gesture completes.
    ///
    /// `input_accepted` reflects whether the game takes swaps right now; presses made
    /// while it does not are ignored.
    pub fn handle(&mut self, event: PointerEvent, input_accepted: bool) -> Option<SwapIntent> {
        match event {
            PointerEvent::Down { x, y } => {
                if !input_accepted {
                    return None;
                }
                if self.geometry.contains(self.geometry.cell_at(x, y)) {
                    self.anchor = Some((x, y));
                    log::trace!("pointer anchored at ({x}, {y})");
                }
                None
            }
            PointerEvent::Move { x, y } => {
                let (triggered, intent) = self.try_swipe(x, y, self.geometry.cell_size);
                if triggered {
                    self.anchor = None;
                }
                intent
            }
            PointerEvent::Up { x, y } => {
                let (_, intent) = self.try_swipe(x, y, RELEASE_THRESHOLD * self.geometry.cell_size);
                self.anchor = None;
                intent
            }
            PointerEvent::Cancel => {
                self.anchor = None;
                None
            }
        }
    }

    /// Returns whether the travel exceeded `threshold`, and the intent if its target is on the grid.
    fn try_swipe(&self, x: f32, y: f32, threshold: f32) -> (bool, Option<SwapIntent>) {
        let Some((ax, ay)) = self.anchor else {
            return (false, None);
        };
        let dx = x - ax;
        let dy = y - ay;
        if dx.abs() <= threshold && dy.abs() <= threshold {
            return (false, None);
        }

        let from = self.geometry.cell_at(ax, ay);
        let to = if dx.abs() > dy.abs() {
            from.offset(0, if dx > 0.0 { 1 } else { -1 })
        } else {
            from.offset(if dy > 0.0 { 1 } else { -1 }, 0)
        };

        if self.geometry.contains(to) {
            (true, Some(SwapIntent::new(from, to)))
        } else {
            (true, None)
        }
    }
}

/// Pointer events for a straight drag from one cell centre towards a neighbour.
///
/// Used by automated drivers; the drag overshoots one cell so it completes on the move.
pub fn drag_between(geometry: &BoardGeometry, from: Coord, to: Coord) -> [PointerEvent; 3] {
    let (x0, y0) = geometry.cell_center(from);
    let step = geometry.cell_size * 1.5;
    let dx = (to.col - from.col).signum() as f32 * step;
    let dy = (to.row - from.row).signum() as f32 * step;
    [
        PointerEvent::Down { x: x0, y: y0 },
        PointerEvent::Move {
            x: x0 + dx,
            y: y0 + dy,
        },
        PointerEvent::Up {
            x: x0 + dx,
            y: y0 + dy,
        },
    ]
}
