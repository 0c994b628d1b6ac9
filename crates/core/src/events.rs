//! Game events - what the host hears about after each tick
//!
//! Events are queued on the game state and drained by the host. The core never plays
//! audio; [`GameEvent::sound_cue`] tells the host which cue an event deserves.

use crate::types::Coord;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Highest match cue tier
pub const MAX_SOUND_TIER: u8 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum GameEvent {
    /// A swap started; `accepted == false` means the tokens bounce back
    Swapped {
        from: Coord,
        to: Coord,
        accepted: bool,
    },
    /// Falling tokens came to rest
    Settled,
    /// A resolution pass started removing tokens
    ///
    /// `streak` counts consecutive passes that found something, starting at 1.
    Matched {
        matches: usize,
        tokens: usize,
        streak: u32,
    },
    /// Tokens were removed and scored
    Cleared {
        removed: usize,
        combo: u32,
        points: u32,
    },
    /// Removed tokens detonated others
    ChainTriggered { tokens: usize },
    /// No legal swap was left; the grid is being cleared and refilled
    Reshuffled,
    /// The grid is stable and input is accepted
    Ready,
}

/// Audio hint for the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SoundCue {
    /// Tokens landed
    Knock,
    /// Match sound, tier `0..=MAX_SOUND_TIER` rising with the streak
    Match(u8),
}

impl GameEvent {
    pub fn sound_cue(&self) -> Option<SoundCue> {
        match *self {
            GameEvent::Settled => Some(SoundCue::Knock),
            GameEvent::Matched { streak, .. } => Some(SoundCue::Match(sound_tier(streak))),
            _ => None,
        }
    }
}

/// Cue tier for the `streak`-th consecutive pass
pub fn sound_tier(streak: u32) -> u8 {
    streak.saturating_sub(1).min(MAX_SOUND_TIER as u32) as u8
}
