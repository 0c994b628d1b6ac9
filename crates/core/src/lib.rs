//! Core engine module - pure, deterministic, and testable
//!
//! This crate contains all the rules of the gem grid: matching, detonation effects,
//! gravity refill, combo scoring and the animation sequencer that orders them.
//! It has **zero dependencies** on rendering, audio, or I/O, making it:
//!
//! - **Deterministic**: Same seed and same swaps produce identical games
//! - **Testable**: Every rule is exercised by unit tests on text layouts
//! - **Portable**: Any host can drive it (terminal, GUI, headless autoplay)
//!
//! # Module Structure
//!
//! - [`grid`]: square grid of tokens with removal and chain collection
//! - [`matcher`]: row/column run detection and swap look-ahead
//! - [`effects`]: area blasts at match intersections
//! - [`gravity`]: one-slot falls and top-row spawning
//! - [`scoring`]: combo multiplier and score
//! - [`animation`]: timed phases that block input
//! - [`game_state`]: the sequencer tying everything to the frame clock
//! - [`rng`]: seedable randomness and token factories
//! - [`events`]: host notifications and sound cues
//! - [`snapshot`]: plain-data capture of the whole state
//!
//! # Game Rules
//!
//! - **Matching**: 3 or more equal idle tokens in a row or column
//! - **Swaps**: adjacent tokens only; a swap must form a match or move a wildcard,
//!   otherwise the tokens bounce back
//! - **Area blast**: the token where a row match crosses a column match clears its 3x3
//!   neighbourhood when it disappears
//! - **Gravity**: tokens fall one cell per step and new ones spawn at the top
//! - **Combo**: tokens cleared by consecutive passes add up and multiply the score
//! - **Stalemate**: with no legal swap left the grid is cleared and refilled
//!
//! # Example
//!
//! ```
//! use gem_grid_core::{GameState, Grid, RandomTokenFactory};
//! use gem_grid_core::types::{Coord, EngineConfig, DEFAULT_TICK_MS};
//!
//! let grid = Grid::from_layout(&["ABCD", "CDAB", "AACD", "CDAB"]).unwrap();
//! let config = EngineConfig::new(4, 4).unwrap();
//! let mut game = GameState::from_grid(config, grid, RandomTokenFactory::new(1, 4)).unwrap();
//!
//! game.tick(DEFAULT_TICK_MS);
//! assert!(game.can_move());
//!
//! game.request_swap(Coord::new(2, 2), Coord::new(3, 2)).unwrap();
//! while !game.can_move() {
//!     game.tick(DEFAULT_TICK_MS);
//! }
//! assert!(game.score() > 0);
//! ```
//!
//! # Timing
//!
//! Call [`GameState::tick`](game_state::GameState::tick) every frame with elapsed time.
//! Falls take 67ms per cell, disappearing 167ms and swaps 150ms (see
//! [`EngineConfig`](types::EngineConfig)).

pub mod animation;
pub mod effects;
pub mod events;
pub mod game_state;
pub mod gravity;
pub mod grid;
pub mod matcher;
pub mod rng;
pub mod scoring;
pub mod snapshot;

pub use gem_grid_types as types;

// Re-export commonly used types for convenience
pub use animation::{Animation, AnimationKind, DisappearCause};
pub use events::{GameEvent, SoundCue};
pub use game_state::{GameState, GameStats, SwapError, SwapOutcome};
pub use grid::{Grid, GridError};
pub use matcher::{detect, KindView, Matches, SwappedView};
pub use rng::{RandomSource, RandomTokenFactory, SimpleRng, TokenFactory};
pub use scoring::ComboScorer;
pub use snapshot::{GameSnapshot, TokenSnapshot};
