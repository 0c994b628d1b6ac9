//! Headless drivers for the gem grid.
//!
//! Nothing here bends the rules: moves are chosen among the legal swaps and delivered
//! as pointer drags through the same gesture mapper a real front end uses.

pub mod autoplay;

pub use gem_grid_types as types;

pub use autoplay::{run_until_ready, AutoPlayer, PlayError};
