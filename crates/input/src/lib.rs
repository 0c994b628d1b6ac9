//! Pointer input module (engine-facing).
//!
//! This module is intentionally independent of any UI framework. It maps screen
//! positions onto grid cells and turns press/drag/release sequences into
//! [`crate::types::SwapIntent`]s for the game state to validate.

pub mod handler;
pub mod map;

pub use gem_grid_types as types;

pub use handler::{drag_between, GestureMapper, PointerEvent};
pub use map::BoardGeometry;
