//! Animations - timed phases that gate the sequencer
//!
//! The engine never moves pixels. An animation only records which tokens are busy and
//! how far along the phase is; renderers read [`Animation::progress`] and interpolate
//! their own per-token visuals.

use std::collections::BTreeSet;

use crate::types::{Activity, Coord, TokenId};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Why tokens are disappearing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum DisappearCause {
    /// Tokens of a detection pass
    Match,
    /// Tokens caught by a detonation chain
    Cascade,
    /// Whole grid cleared after a stalemate
    Reshuffle,
}

/// What happens when the animation completes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum AnimationKind {
    Falling,
    Disappearing(DisappearCause),
    /// Two tokens trading places; `reverts` when the swap was illegal and they bounce back
    Swapping { from: Coord, to: Coord, reverts: bool },
}

impl AnimationKind {
    /// Activity of the tokens while this animation runs
    pub fn activity(&self) -> Activity {
        match self {
            AnimationKind::Falling => Activity::Falling,
            AnimationKind::Disappearing(_) => Activity::Disappearing,
            AnimationKind::Swapping { .. } => Activity::Swapping,
        }
    }
}

/// One active animation over a set of tokens
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Animation {
    pub kind: AnimationKind,
    pub tokens: BTreeSet<TokenId>,
    pub elapsed_ms: u32,
    pub duration_ms: u32,
}

impl Animation {
    pub fn new(kind: AnimationKind, tokens: BTreeSet<TokenId>, duration_ms: u32) -> Self {
        Self {
            kind,
            tokens,
            elapsed_ms: 0,
            duration_ms,
        }
    }

    /// Accumulate time; returns true once the animation has finished
    pub fn advance(&mut self, elapsed_ms: u32) -> bool {
        self.elapsed_ms = self.elapsed_ms.saturating_add(elapsed_ms);
        self.is_finished()
    }

    pub fn is_finished(&self) -> bool {
        self.elapsed_ms >= self.duration_ms
    }

    /// Completion fraction in [0, 1]
    pub fn progress(&self) -> f32 {
        if self.duration_ms == 0 {
            return 1.0;
        }
        (self.elapsed_ms as f32 / self.duration_ms as f32).min(1.0)
    }

    pub fn remaining_ms(&self) -> u32 {
        self.duration_ms.saturating_sub(self.elapsed_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance_finishes_at_duration() {
        let mut anim = Animation::new(AnimationKind::Falling, BTreeSet::new(), 67);
        assert!(!anim.advance(16));
        assert!(!anim.advance(50));
        assert_eq!(anim.remaining_ms(), 1);
        assert!(anim.advance(1));
        assert!(anim.is_finished());
    }

    #[test]
    fn test_progress_is_clamped() {
        let mut anim = Animation::new(
            AnimationKind::Disappearing(DisappearCause::Match),
            BTreeSet::new(),
            100,
        );
        assert_eq!(anim.progress(), 0.0);
        anim.advance(25);
        assert!((anim.progress() - 0.25).abs() < f32::EPSILON);
        anim.advance(500);
        assert_eq!(anim.progress(), 1.0);
    }

    #[test]
    fn test_kind_activity() {
        let swap = AnimationKind::Swapping {
            from: Coord::new(0, 0),
            to: Coord::new(0, 1),
            reverts: true,
        };
        assert_eq!(swap.activity(), Activity::Swapping);
        assert_eq!(
            AnimationKind::Disappearing(DisappearCause::Cascade).activity(),
            Activity::Disappearing
        );
    }
}
