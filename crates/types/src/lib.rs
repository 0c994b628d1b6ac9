//! Core types module - shared data structures and constants
//!
//! This module defines the fundamental types used throughout the engine.
//! All types are plain data with no behaviour beyond small helpers, making them
//! usable in any context (core logic, gesture mapping, renderers, replay tools).
//!
//! # Grid Coordinates
//!
//! - **Rows**: `0..size`, row 0 is the top row; gravity pulls toward `size - 1`
//! - **Columns**: `0..size`, left to right
//! - Coordinates are `i32` so neighbour probing may step off the grid; reads outside the
//!   grid simply return nothing.
//!
//! # Timing Constants
//!
//! Animation durations are in milliseconds:
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `DEFAULT_TICK_MS` | 16 | Frame interval used by headless drivers (~60 FPS) |
//! | `FALL_MS` | 67 | One slot of gravity movement |
//! | `DISAPPEAR_MS` | 167 | Shrink-out of matched or detonated tokens |
//! | `SWAP_MS` | 150 | Two tokens trading places (or bouncing back) |
//!
//! # Rules Constants
//!
//! - `MATCH_MIN_LEN`: 3 equal tokens in a line form a match
//! - `AREA_RADIUS`: 1, an area blast clears the 3x3 neighbourhood
//!
//! # Examples
//!
//! ```
//! use gem_grid_types::{Coord, EngineConfig, Kind, Token, Effect};
//!
//! let config = EngineConfig::new(8, 6).unwrap();
//! assert_eq!(config.grid_size, 8);
//!
//! let gem = Token::new(Kind(2));
//! assert_eq!(gem.kind, Some(Kind(2)));
//! assert_eq!(gem.effect, Effect::None);
//!
//! let wild = Token::wildcard();
//! assert!(wild.kind.is_none());
//!
//! assert!(Coord::new(0, 0).is_adjacent(Coord::new(0, 1)));
//! ```

use thiserror::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Default grid edge length (8x8 board)
pub const DEFAULT_GRID_SIZE: usize = 8;

/// Default number of gem kinds
pub const DEFAULT_KINDS: u8 = 6;

/// Largest supported grid edge length
pub const MAX_GRID_SIZE: usize = 64;

/// Largest supported kinds count (one letter per kind in text layouts)
pub const MAX_KINDS: u8 = 26;

/// Minimum run length that counts as a match
pub const MATCH_MIN_LEN: usize = 3;

/// Chebyshev radius of an area blast
pub const AREA_RADIUS: i32 = 1;

/// Points granted per removed token before the combo multiplier
pub const DEFAULT_POINTS_PER_TOKEN: u32 = 1;

/// Frame interval used by headless drivers (16ms ≈ 60 FPS)
pub const DEFAULT_TICK_MS: u32 = 16;

/// Duration of one gravity step animation
pub const FALL_MS: u32 = 67;

/// Duration of the disappear animation
pub const DISAPPEAR_MS: u32 = 167;

/// Duration of the swap animation
pub const SWAP_MS: u32 = 150;


/// Gem kind (colour) index in `[0, kinds_count)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Kind(pub u8);

impl Kind {
    /// Letter used in text layouts: kind 0 is `A`, kind 1 is `B`, ...
    ///
    /// # Examples
    ///
    /// ```
    /// use gem_grid_types::Kind;
    ///
    /// assert_eq!(Kind(1).letter(), 'B');
    /// ```
    pub fn letter(self) -> char {
        char::from(b'A' + self.0.min(MAX_KINDS - 1))
    }

    /// Parse a layout letter (case-insensitive)
    pub fn from_letter(c: char) -> Option<Self> {
        let upper = c.to_ascii_uppercase();
        if upper.is_ascii_uppercase() {
            Some(Kind(upper as u8 - b'A'))
        } else {
            None
        }
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Special detonation behaviour carried by a token
///
/// - **None**: plain gem
/// - **RowClear**: clears every idle token in its row when removed
/// - **ColumnClear**: clears every idle token in its column when removed
/// - **AreaBlast**: clears the 3x3 neighbourhood when removed
/// - **Wildcard**: clears every idle token of a randomly chosen kind when removed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Effect {
    #[default]
    None,
    RowClear,
    ColumnClear,
    AreaBlast,
    Wildcard,
}

impl Effect {
    pub fn as_str(&self) -> &'static str {
        match self {
            Effect::None => "none",
            Effect::RowClear => "rowClear",
            Effect::ColumnClear => "columnClear",
            Effect::AreaBlast => "areaBlast",
            Effect::Wildcard => "wildcard",
        }
    }
}

/// What a token is currently doing
///
/// Only `Idle` tokens take part in matching and chain collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Activity {
    #[default]
    Idle,
    Falling,
    Disappearing,
    Swapping,
}

/// Stable identity of a token, assigned by the grid when the token is placed
///
/// Renderers key their presentation state (position, scale) by this id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TokenId(pub u32);

/// Grid-occupying unit: kind, effect and activity, nothing presentational
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Token {
    /// `None` only for wildcard tokens
    pub kind: Option<Kind>,
    pub effect: Effect,
    pub activity: Activity,
}

impl Token {
    /// Plain idle gem of the given kind
    pub fn new(kind: Kind) -> Self {
        Self {
            kind: Some(kind),
            effect: Effect::None,
            activity: Activity::Idle,
        }
    }

    /// Kindless token that clears a random kind when detonated
    pub fn wildcard() -> Self {
        Self {
            kind: None,
            effect: Effect::Wildcard,
            activity: Activity::Idle,
        }
    }

    /// Same gem carrying a detonation effect
    ///
    /// # Panics
    ///
    /// A kindless token may only carry [`Effect::Wildcard`]; giving it any other
    /// effect panics.
    pub fn with_effect(mut self, effect: Effect) -> Self {
        assert!(
            self.kind.is_some() || effect == Effect::Wildcard,
            "kindless token cannot carry {}",
            effect.as_str()
        );
        self.effect = effect;
        self
    }

    /// A kindless token carries the wildcard effect and nothing else
    pub fn is_consistent(&self) -> bool {
        self.kind.is_some() || self.effect == Effect::Wildcard
    }

    pub fn is_idle(&self) -> bool {
        self.activity == Activity::Idle
    }

    pub fn is_wildcard(&self) -> bool {
        self.effect == Effect::Wildcard
    }

    /// Kind used for matching: present only for idle tokens that have a kind
    pub fn matchable_kind(&self) -> Option<Kind> {
        if self.is_idle() {
            self.kind
        } else {
            None
        }
    }
}

/// Grid coordinate (row, column); may lie outside the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Coord {
    pub row: i32,
    pub col: i32,
}

impl Coord {
    pub const fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    pub fn offset(self, d_row: i32, d_col: i32) -> Self {
        Self::new(self.row + d_row, self.col + d_col)
    }

    /// True when the two coordinates share an edge
    pub fn is_adjacent(self, other: Coord) -> bool {
        (self.row - other.row).abs() + (self.col - other.col).abs() == 1
    }

    /// Chebyshev distance
    pub fn distance(self, other: Coord) -> i32 {
        (self.row - other.row).abs().max((self.col - other.col).abs())
    }
}

/// Line direction of a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Axis {
    /// Horizontal run within one row
    Row,
    /// Vertical run within one column
    Column,
}

/// One maximal run of equal idle tokens
///
/// `origin` is the first cell of the run (leftmost for rows, topmost for columns).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Match {
    pub origin: Coord,
    pub axis: Axis,
    pub length: usize,
}

impl Match {
    pub fn new(origin: Coord, axis: Axis, length: usize) -> Self {
        Self {
            origin,
            axis,
            length,
        }
    }

    /// Member cells in line order
    pub fn cells(&self) -> impl Iterator<Item = Coord> + '_ {
        (0..self.length as i32).map(move |d| match self.axis {
            Axis::Row => self.origin.offset(0, d),
            Axis::Column => self.origin.offset(d, 0),
        })
    }

    pub fn contains(&self, coord: Coord) -> bool {
        let len = self.length as i32;
        match self.axis {
            Axis::Row => {
                coord.row == self.origin.row
                    && coord.col >= self.origin.col
                    && coord.col < self.origin.col + len
            }
            Axis::Column => {
                coord.col == self.origin.col
                    && coord.row >= self.origin.row
                    && coord.row < self.origin.row + len
            }
        }
    }

    /// Shared cell of a row match and a column match, if they cross
    pub fn intersection(&self, other: &Match) -> Option<Coord> {
        let (row_match, col_match) = match (self.axis, other.axis) {
            (Axis::Row, Axis::Column) => (self, other),
            (Axis::Column, Axis::Row) => (other, self),
            _ => return None,
        };
        let cross = Coord::new(row_match.origin.row, col_match.origin.col);
        (row_match.contains(cross) && col_match.contains(cross)).then_some(cross)
    }
}

/// Player request to exchange two adjacent cells
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SwapIntent {
    pub from: Coord,
    pub to: Coord,
}

impl SwapIntent {
    pub fn new(from: Coord, to: Coord) -> Self {
        Self { from, to }
    }
}

/// Invalid engine construction parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("grid size must be at least 1")]
    EmptyGrid,
    #[error("grid size {size} cannot hold a match of {min}", min = MATCH_MIN_LEN)]
    GridTooSmall { size: usize },
    #[error("grid size {size} exceeds the maximum of {max}", max = MAX_GRID_SIZE)]
    GridTooLarge { size: usize },
    #[error("kinds count {kinds} is below the match length of {min}", min = MATCH_MIN_LEN)]
    TooFewKinds { kinds: u8 },
    #[error("kinds count {kinds} exceeds the maximum of {max}", max = MAX_KINDS)]
    TooManyKinds { kinds: u8 },
    #[error("animation duration `{name}` must be non-zero")]
    ZeroDuration { name: &'static str },
}

/// Engine construction parameters, fixed for the lifetime of a game
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EngineConfig {
    pub grid_size: usize,
    pub kinds_count: u8,
    /// Seed for token spawning and wildcard targeting
    pub seed: u32,
    pub points_per_token: u32,
    pub fall_ms: u32,
    pub disappear_ms: u32,
    pub swap_ms: u32,
}

impl EngineConfig {
    /// Validated config with default seed, scoring and timings
    pub fn new(grid_size: usize, kinds_count: u8) -> Result<Self, ConfigError> {
        let config = Self {
            grid_size,
            kinds_count,
            ..Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    pub fn with_seed(mut self, seed: u32) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_points_per_token(mut self, points: u32) -> Self {
        self.points_per_token = points;
        self
    }

    /// Check every field; the engine refuses to start on an invalid config
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.grid_size == 0 {
            return Err(ConfigError::EmptyGrid);
        }
        if self.grid_size < MATCH_MIN_LEN {
            return Err(ConfigError::GridTooSmall {
                size: self.grid_size,
            });
        }
        if self.grid_size > MAX_GRID_SIZE {
            return Err(ConfigError::GridTooLarge {
                size: self.grid_size,
            });
        }
        if (self.kinds_count as usize) < MATCH_MIN_LEN {
            return Err(ConfigError::TooFewKinds {
                kinds: self.kinds_count,
            });
        }
        if self.kinds_count > MAX_KINDS {
            return Err(ConfigError::TooManyKinds {
                kinds: self.kinds_count,
            });
        }
        for (name, value) in [
            ("fall_ms", self.fall_ms),
            ("disappear_ms", self.disappear_ms),
            ("swap_ms", self.swap_ms),
        ] {
            if value == 0 {
                return Err(ConfigError::ZeroDuration { name });
            }
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            grid_size: DEFAULT_GRID_SIZE,
            kinds_count: DEFAULT_KINDS,
            seed: 1,
            points_per_token: DEFAULT_POINTS_PER_TOKEN,
            fall_ms: FALL_MS,
            disappear_ms: DISAPPEAR_MS,
            swap_ms: SWAP_MS,
        }
    }
}
