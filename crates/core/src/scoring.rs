//! Scoring module - combo tracking and score accumulation
//!
//! Rules:
//! - Each resolution pass registers how many tokens it removed.
//! - A pass that removes nothing resets the combo to 0; otherwise the count is added.
//! - Points awarded are multiplied by the combo, with a floor of 1.

/// Combo multiplier and running score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ComboScorer {
    combo: u32,
    score: u32,
}

impl ComboScorer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one resolution pass that cleared `count` tokens
    pub fn register_match_pass(&mut self, count: u32) {
        self.combo = if count == 0 {
            0
        } else {
            self.combo.saturating_add(count)
        };
    }

    /// Add `points` scaled by the combo; returns the delta
    pub fn award(&mut self, points: u32) -> u32 {
        let delta = combo_multiplier(self.combo).saturating_mul(points);
        self.score = self.score.saturating_add(delta);
        delta
    }

    pub fn combo(&self) -> u32 {
        self.combo
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Multiplier applied to awarded points (the combo, at least 1)
pub fn combo_multiplier(combo: u32) -> u32 {
    combo.max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_combo_sequence() {
        let mut scorer = ComboScorer::new();
        let mut seen = Vec::new();
        for count in [3, 2, 0, 4] {
            scorer.register_match_pass(count);
            seen.push(scorer.combo());
        }
        assert_eq!(seen, vec![3, 5, 0, 4]);
    }

    #[test]
    fn test_award_uses_combo_floor() {
        let mut scorer = ComboScorer::new();
        assert_eq!(scorer.award(7), 7); // combo 0 counts as 1

        scorer.register_match_pass(3);
        assert_eq!(scorer.award(3), 9);
        assert_eq!(scorer.score(), 16);
    }

    #[test]
    fn test_award_saturates() {
        let mut scorer = ComboScorer::new();
        scorer.register_match_pass(u32::MAX);
        scorer.award(2);
        assert_eq!(scorer.score(), u32::MAX);
    }

    #[test]
    fn test_multiplier() {
        assert_eq!(combo_multiplier(0), 1);
        assert_eq!(combo_multiplier(1), 1);
        assert_eq!(combo_multiplier(5), 5);
    }
}
