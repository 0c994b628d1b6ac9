//! Gem grid (workspace facade crate).
//!
//! Re-exports the engine crates under one roof as `gem_grid::{core,engine,input,types}`
//! while the implementation lives in dedicated crates under `crates/`.

pub use gem_grid_core as core;
pub use gem_grid_engine as engine;
pub use gem_grid_input as input;
pub use gem_grid_types as types;
