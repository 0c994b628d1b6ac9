use crate::animation::Animation;
use crate::types::{Coord, Effect, Token, TokenId};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Cell code for an empty cell
pub const CELL_EMPTY: u8 = 0;

/// Cell code for a wildcard; kinds use `kind + 1`
pub const CELL_WILDCARD: u8 = 0xFF;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TokenSnapshot {
    pub id: TokenId,
    pub coord: Coord,
    pub token: Token,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GameSnapshot {
    pub grid_size: usize,
    /// Row-major cell codes (see [`cell_code`])
    pub board: Vec<u8>,
    /// Row-major effect codes (see [`effect_code`])
    pub effects: Vec<u8>,
    /// FNV-1a 64 over `board` then `effects`
    pub board_hash: u64,
    pub tokens: Vec<TokenSnapshot>,
    pub animations: Vec<Animation>,
    pub score: u32,
    pub combo: u32,
    pub stable: bool,
    pub tick: u64,
    pub seed: u32,
}

impl GameSnapshot {
    pub fn clear(&mut self) {
        self.grid_size = 0;
        self.board.clear();
        self.effects.clear();
        self.board_hash = 0;
        self.tokens.clear();
        self.animations.clear();
        self.score = 0;
        self.combo = 0;
        self.stable = false;
        self.tick = 0;
        self.seed = 0;
    }

    /// Input would be accepted in the captured state
    pub fn playable(&self) -> bool {
        self.stable && self.animations.is_empty()
    }

    pub fn cell(&self, row: i32, col: i32) -> Option<u8> {
        let size = self.grid_size as i32;
        if row < 0 || row >= size || col < 0 || col >= size {
            return None;
        }
        self.board.get(row as usize * self.grid_size + col as usize).copied()
    }

    pub fn recompute_hash(&mut self) {
        self.board_hash = fnv1a64(self.board.iter().chain(self.effects.iter()).copied());
    }
}

pub fn cell_code(token: Option<&Token>) -> u8 {
    match token {
        None => CELL_EMPTY,
        Some(token) => match token.kind {
            Some(kind) => kind.0.saturating_add(1),
            None => CELL_WILDCARD,
        },
    }
}

pub fn effect_code(effect: Effect) -> u8 {
    match effect {
        Effect::None => 0,
        Effect::RowClear => 1,
        Effect::ColumnClear => 2,
        Effect::AreaBlast => 3,
        Effect::Wildcard => 4,
    }
}

/// FNV-1a 64-bit
pub fn fnv1a64(bytes: impl Iterator<Item = u8>) -> u64 {
    let mut h: u64 = 0xcbf29ce484222325;
    for b in bytes {
        h ^= b as u64;
        h = h.wrapping_mul(0x00000100000001B3);
    }
    h
}
