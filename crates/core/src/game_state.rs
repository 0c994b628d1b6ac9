//! Game state module - the animation sequencer
//!
//! Ties together the grid, detection, effects, gravity and scoring, and drives them
//! from a single frame clock. Every transition happens inside [`GameState::tick`]:
//!
//! 1. Active animations advance; finished ones are dispatched by kind.
//! 2. With nothing animating, exactly one step is evaluated: gravity, then match
//!    detection, then the stalemate check. Each step that finds work starts an
//!    animation and stops; when none does the grid is stable and input is accepted.

use std::collections::{BTreeSet, VecDeque};

use thiserror::Error;

use crate::animation::{Animation, AnimationKind, DisappearCause};
use crate::effects;
use crate::events::GameEvent;
use crate::gravity;
use crate::grid::Grid;
use crate::matcher;
use crate::rng::{RandomTokenFactory, SimpleRng, TokenFactory};
use crate::scoring::ComboScorer;
use crate::snapshot::{cell_code, effect_code, GameSnapshot, TokenSnapshot};
use crate::types::{Activity, ConfigError, Coord, EngineConfig, SwapIntent, TokenId};

/// Mixed into the seed so wildcard targeting does not mirror token spawning
const WILDCARD_STREAM: u32 = 0x9E37_79B9;

/// Result of a swap request that passed validation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SwapOutcome {
    /// Tokens exchanged; resolution follows
    Accepted,
    /// No match would form; tokens bounce back and the grid is unchanged
    Rejected,
}

/// Swap requests the engine refuses outright
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum SwapError {
    #[error("input is not accepted while the grid is resolving")]
    NotReady,
    #[error("swap coordinate is outside the grid")]
    OutOfBounds,
    #[error("swap cells are not orthogonally adjacent")]
    NotAdjacent,
    #[error("swap cell is empty")]
    EmptyCell,
}

impl SwapError {
    pub fn code(&self) -> &'static str {
        match self {
            SwapError::NotReady => "not_ready",
            SwapError::OutOfBounds => "out_of_bounds",
            SwapError::NotAdjacent => "not_adjacent",
            SwapError::EmptyCell => "empty_cell",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            SwapError::NotReady => "wait for the grid to settle",
            SwapError::OutOfBounds => "both cells must be on the grid",
            SwapError::NotAdjacent => "cells must share an edge",
            SwapError::EmptyCell => "both cells must hold a token",
        }
    }
}

/// Session counters for drivers and summaries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct GameStats {
    /// Accepted swaps
    pub moves: u32,
    /// Rejected swaps
    pub rejected: u32,
    /// Detonation chains started
    pub cascades: u32,
    pub reshuffles: u32,
    /// Tokens removed by matches and chains
    pub cleared: u32,
}

/// Complete game state
#[derive(Debug, Clone)]
pub struct GameState<F: TokenFactory = RandomTokenFactory> {
    config: EngineConfig,
    grid: Grid,
    factory: F,
    /// Wildcard target kinds
    wild_rng: SimpleRng,
    scorer: ComboScorer,
    animations: Vec<Animation>,
    events: VecDeque<GameEvent>,
    /// No pending work was found on the last evaluation
    stable: bool,
    /// Tokens fell since the last landing cue
    landing_owed: bool,
    /// Consecutive passes that found something
    streak: u32,
    tick_count: u64,
    stats: GameStats,
}

impl GameState<RandomTokenFactory> {
    /// New game with a freshly filled grid
    ///
    /// Matches present in the initial fill resolve on the first ticks.
    ///
    /// # Examples
    ///
    /// ```
    /// use gem_grid_core::GameState;
    /// use gem_grid_core::types::{EngineConfig, DEFAULT_TICK_MS};
    ///
    /// let mut game = GameState::new(EngineConfig::default().with_seed(7)).unwrap();
    /// while !game.can_move() {
    ///     game.tick(DEFAULT_TICK_MS);
    /// }
    /// assert!(game.grid().is_full());
    /// assert!(!game.legal_swaps().is_empty());
    /// ```
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut factory = RandomTokenFactory::new(config.seed, config.kinds_count);
        let grid = Grid::filled(config.grid_size, &mut factory);
        Ok(Self::assemble(config, grid, factory))
    }
}

impl<F: TokenFactory> GameState<F> {
    /// Game over an existing grid; `config.grid_size` is taken from the grid
    pub fn from_grid(config: EngineConfig, grid: Grid, factory: F) -> Result<Self, ConfigError> {
        let config = EngineConfig {
            grid_size: grid.size(),
            ..config
        };
        config.validate()?;
        Ok(Self::assemble(config, grid, factory))
    }

    fn assemble(config: EngineConfig, grid: Grid, factory: F) -> Self {
        log::debug!(
            "new game: {}x{} grid, {} kinds, seed {}",
            config.grid_size,
            config.grid_size,
            config.kinds_count,
            config.seed
        );
        Self {
            wild_rng: SimpleRng::new(config.seed ^ WILDCARD_STREAM),
            config,
            grid,
            factory,
            scorer: ComboScorer::new(),
            animations: Vec::new(),
            events: VecDeque::new(),
            stable: false,
            landing_owed: false,
            streak: 0,
            tick_count: 0,
            stats: GameStats::default(),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    #[cfg(test)]
    pub(crate) fn grid_mut(&mut self) -> &mut Grid {
        &mut self.grid
    }

    pub fn score(&self) -> u32 {
        self.scorer.score()
    }

    pub fn combo(&self) -> u32 {
        self.scorer.combo()
    }

    pub fn animations(&self) -> &[Animation] {
        &self.animations
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn stats(&self) -> GameStats {
        self.stats
    }

    pub fn is_stable(&self) -> bool {
        self.stable
    }

    /// Input is accepted: stable and nothing animating
    pub fn can_move(&self) -> bool {
        self.stable && self.animations.is_empty()
    }

    /// Oldest queued event
    pub fn take_event(&mut self) -> Option<GameEvent> {
        self.events.pop_front()
    }

    /// All queued events, oldest first
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        self.events.drain(..).collect()
    }

    pub fn drain_events(&mut self) -> impl Iterator<Item = GameEvent> + '_ {
        self.events.drain(..)
    }

    /// Every legal swap on the current grid
    pub fn legal_swaps(&self) -> Vec<SwapIntent> {
        matcher::legal_swaps(&self.grid)
    }

    pub fn is_stalemate(&self) -> bool {
        matcher::is_stalemate(&self.grid)
    }

    pub fn snapshot_into(&self, out: &mut GameSnapshot) {
        let size = self.grid.size();
        out.grid_size = size;
        out.board.clear();
        out.effects.clear();
        for row in 0..size as i32 {
            for col in 0..size as i32 {
                let token = self.grid.get(row, col);
                out.board.push(cell_code(token));
                out.effects.push(token.map_or(0, |t| effect_code(t.effect)));
            }
        }
        out.recompute_hash();

        out.tokens.clear();
        out.tokens.extend(
            self.grid
                .iter()
                .map(|(coord, id, token)| TokenSnapshot {
                    id,
                    coord,
                    token: *token,
                }),
        );
        out.animations.clear();
        out.animations.extend(self.animations.iter().cloned());
        out.score = self.scorer.score();
        out.combo = self.scorer.combo();
        out.stable = self.stable;
        out.tick = self.tick_count;
        out.seed = self.config.seed;
    }

    pub fn snapshot(&self) -> GameSnapshot {
        let mut s = GameSnapshot::default();
        self.snapshot_into(&mut s);
        s
    }

    /// Forward a gesture intent
    pub fn apply_intent(&mut self, intent: SwapIntent) -> Result<SwapOutcome, SwapError> {
        self.request_swap(intent.from, intent.to)
    }

    /// Ask to exchange two adjacent tokens
    ///
    /// A legal swap (it forms a match, or moves a wildcard) updates the grid at once and
    /// animates the exchange. An illegal one leaves the grid untouched and animates a
    /// bounce. Both block input until the animation and its consequences finish.
    pub fn request_swap(&mut self, from: Coord, to: Coord) -> Result<SwapOutcome, SwapError> {
        if !self.can_move() {
            return Err(SwapError::NotReady);
        }
        if !self.grid.contains(from) || !self.grid.contains(to) {
            return Err(SwapError::OutOfBounds);
        }
        if !from.is_adjacent(to) {
            return Err(SwapError::NotAdjacent);
        }
        let (Some(a), Some(b)) = (self.grid.id_at(from.row, from.col), self.grid.id_at(to.row, to.col))
        else {
            return Err(SwapError::EmptyCell);
        };

        let legal = matcher::is_legal_swap(&self.grid, from, to);
        if legal {
            self.grid.swap(from, to);
            self.stats.moves += 1;
        } else {
            self.stats.rejected += 1;
        }
        log::debug!(
            "swap ({}, {}) <-> ({}, {}) {}",
            from.row,
            from.col,
            to.row,
            to.col,
            if legal { "accepted" } else { "rejected" }
        );

        self.stable = false;
        self.start_animation(
            AnimationKind::Swapping {
                from,
                to,
                reverts: !legal,
            },
            BTreeSet::from([a, b]),
        );
        self.events.push_back(GameEvent::Swapped {
            from,
            to,
            accepted: legal,
        });

        Ok(if legal {
            SwapOutcome::Accepted
        } else {
            SwapOutcome::Rejected
        })
    }

    /// Advance the simulation by `elapsed_ms`
    ///
    /// Returns true when anything changed: an animation finished or a new one started.
    pub fn tick(&mut self, elapsed_ms: u32) -> bool {
        self.tick_count = self.tick_count.wrapping_add(1);
        let mut changed = false;

        if !self.animations.is_empty() {
            for animation in &mut self.animations {
                animation.advance(elapsed_ms);
            }
            let (finished, active): (Vec<_>, Vec<_>) = std::mem::take(&mut self.animations)
                .into_iter()
                .partition(Animation::is_finished);
            self.animations = active;
            for animation in finished {
                self.complete(animation);
                changed = true;
            }
        }

        if self.animations.is_empty() && !self.stable {
            changed |= self.evaluate();
        }
        changed
    }

    fn start_animation(&mut self, kind: AnimationKind, tokens: BTreeSet<TokenId>) {
        let duration_ms = match kind {
            AnimationKind::Falling => self.config.fall_ms,
            AnimationKind::Disappearing(_) => self.config.disappear_ms,
            AnimationKind::Swapping { .. } => self.config.swap_ms,
        };
        self.grid.mark(&tokens, kind.activity());
        self.animations
            .push(Animation::new(kind, tokens, duration_ms));
    }

    fn complete(&mut self, animation: Animation) {
        self.grid.mark(&animation.tokens, Activity::Idle);
        match animation.kind {
            AnimationKind::Falling => {}
            AnimationKind::Disappearing(DisappearCause::Match | DisappearCause::Cascade) => {
                self.clear_tokens(&animation.tokens);
            }
            AnimationKind::Disappearing(DisappearCause::Reshuffle) => {
                self.grid.clear();
            }
            // the grid already holds the outcome; swapping alone never removes a token
            AnimationKind::Swapping { .. } => {}
        }
    }

    /// Remove a disappearing set, score it and start any chain it triggers
    fn clear_tokens(&mut self, tokens: &BTreeSet<TokenId>) {
        let before = self.grid.len();
        let chain =
            self.grid
                .remove_and_collect_chain(tokens, self.config.kinds_count, &mut self.wild_rng);
        let removed = before - self.grid.len();

        self.scorer.register_match_pass(removed as u32);
        let points = self
            .scorer
            .award((removed as u32).saturating_mul(self.config.points_per_token));
        self.stats.cleared = self.stats.cleared.saturating_add(removed as u32);
        self.events.push_back(GameEvent::Cleared {
            removed,
            combo: self.scorer.combo(),
            points,
        });

        if !chain.is_empty() {
            log::debug!("chain caught {} tokens", chain.len());
            self.stats.cascades += 1;
            self.events
                .push_back(GameEvent::ChainTriggered { tokens: chain.len() });
            self.start_animation(AnimationKind::Disappearing(DisappearCause::Cascade), chain);
        }
    }

    /// One idle evaluation; returns true when it started an animation or became stable
    fn evaluate(&mut self) -> bool {
        let moved = gravity::step(&mut self.grid, &mut self.factory);
        if !moved.is_empty() {
            self.landing_owed = true;
            self.start_animation(AnimationKind::Falling, moved);
            return true;
        }

        if std::mem::take(&mut self.landing_owed) {
            self.events.push_back(GameEvent::Settled);
        }

        let matches = matcher::detect(&self.grid);
        if !matches.is_empty() {
            let tokens = effects::resolve(&mut self.grid, &matches);
            self.streak += 1;
            log::debug!(
                "{} matches over {} tokens (streak {})",
                matches.count(),
                tokens.len(),
                self.streak
            );
            self.events.push_back(GameEvent::Matched {
                matches: matches.count(),
                tokens: tokens.len(),
                streak: self.streak,
            });
            self.start_animation(AnimationKind::Disappearing(DisappearCause::Match), tokens);
            return true;
        }
        self.scorer.register_match_pass(0);
        self.streak = 0;

        if self.is_stalemate() {
            log::debug!("stalemate, reshuffling");
            self.stats.reshuffles += 1;
            let everything = self.grid.token_ids();
            self.events.push_back(GameEvent::Reshuffled);
            self.start_animation(
                AnimationKind::Disappearing(DisappearCause::Reshuffle),
                everything,
            );
            return true;
        }

        log::debug!("grid stable after {} ticks", self.tick_count);
        self.stable = true;
        self.events.push_back(GameEvent::Ready);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Effect, Kind, Token};

    /// Spawns kinds from a fixed cycle
    #[derive(Debug, Clone)]
    struct Cycle {
        kinds: Vec<u8>,
        next: usize,
    }

    impl Cycle {
        fn new(kinds: &[u8]) -> Self {
            Self {
                kinds: kinds.to_vec(),
                next: 0,
            }
        }
    }

    impl TokenFactory for Cycle {
        fn new_token(&mut self, _row: i32, _col: i32) -> Token {
            let kind = self.kinds[self.next % self.kinds.len()];
            self.next += 1;
            Token::new(Kind(kind))
        }
    }

    fn config() -> EngineConfig {
        EngineConfig::new(4, 4).unwrap()
    }

    fn game(rows: &[&str], spawn: &[u8]) -> GameState<Cycle> {
        let grid = Grid::from_layout(rows).unwrap();
        GameState::from_grid(config(), grid, Cycle::new(spawn)).unwrap()
    }

    fn run_until_ready<F: TokenFactory>(game: &mut GameState<F>) {
        for _ in 0..10_000 {
            if game.can_move() {
                return;
            }
            game.tick(16);
        }
        panic!("game never settled");
    }

    #[test]
    fn test_stable_grid_becomes_ready_on_first_tick() {
        let mut g = game(&["ABCD", "CDAB", "AACD", "CDAB"], &[0]);
        assert!(!g.can_move());
        g.tick(16);
        assert!(g.can_move());
        assert_eq!(g.take_events(), vec![GameEvent::Ready]);
    }

    #[test]
    fn test_request_swap_validation() {
        let mut g = game(&["ABCD", "CDAB", "AACD", "CDAB"], &[0]);
        assert_eq!(g.request_swap(Coord::new(0, 0), Coord::new(0, 1)), Err(SwapError::NotReady));
        g.tick(16);

        assert_eq!(
            g.request_swap(Coord::new(0, 3), Coord::new(0, 4)),
            Err(SwapError::OutOfBounds)
        );
        assert_eq!(
            g.request_swap(Coord::new(0, 0), Coord::new(1, 1)),
            Err(SwapError::NotAdjacent)
        );
        g.grid_mut().take(Coord::new(0, 0));
        assert_eq!(
            g.request_swap(Coord::new(0, 0), Coord::new(0, 1)),
            Err(SwapError::EmptyCell)
        );
        assert_eq!(SwapError::NotAdjacent.code(), "not_adjacent");
    }

    #[test]
    fn test_rejected_swap_leaves_grid_and_blocks_input() {
        let mut g = game(&["ABCD", "CDAB", "AACD", "CDAB"], &[0]);
        g.tick(16);
        g.take_events();
        let before = g.grid().to_string();

        let outcome = g.request_swap(Coord::new(0, 0), Coord::new(0, 1));
        assert_eq!(outcome, Ok(SwapOutcome::Rejected));
        assert_eq!(g.grid().to_string(), before);
        assert!(!g.can_move());
        assert_eq!(g.grid().get(0, 0).map(|t| t.activity), Some(Activity::Swapping));

        run_until_ready(&mut g);
        assert_eq!(g.grid().to_string(), before);
        assert_eq!(g.stats().rejected, 1);
        assert_eq!(g.grid().get(0, 0).map(|t| t.activity), Some(Activity::Idle));
    }

    #[test]
    fn test_accepted_swap_clears_and_scores() {
        // (3, 2) A swaps up into row 2: A A A D
        let mut g = game(&["ABCD", "CDAB", "AACD", "CDAB"], &[2, 0, 1]);
        g.tick(16);
        g.take_events();

        assert_eq!(
            g.request_swap(Coord::new(2, 2), Coord::new(3, 2)),
            Ok(SwapOutcome::Accepted)
        );
        assert_eq!(g.grid().get(2, 2).and_then(|t| t.kind), Some(Kind(0)));

        run_until_ready(&mut g);
        assert_eq!(
            g.take_events(),
            vec![
                GameEvent::Swapped {
                    from: Coord::new(2, 2),
                    to: Coord::new(3, 2),
                    accepted: true,
                },
                GameEvent::Matched {
                    matches: 1,
                    tokens: 3,
                    streak: 1,
                },
                GameEvent::Cleared {
                    removed: 3,
                    combo: 3,
                    points: 9,
                },
                GameEvent::Settled,
                GameEvent::Ready,
            ]
        );
        assert_eq!(g.score(), 9);
        assert_eq!(g.combo(), 0);
        assert_eq!(g.grid().to_string(), "CABD\nABCB\nCDAD\nCDCB");
    }

    #[test]
    fn test_new_animations_wait_for_next_tick() {
        let mut g = game(&["ABCD", "CDAB", "AACD", "CDAB"], &[1]);
        g.tick(16);
        g.request_swap(Coord::new(2, 2), Coord::new(3, 2)).unwrap();

        // swap finishes, match starts in the same tick but is not advanced
        g.tick(crate::types::SWAP_MS);
        let anim = &g.animations()[0];
        assert_eq!(anim.kind, AnimationKind::Disappearing(DisappearCause::Match));
        assert_eq!(anim.elapsed_ms, 0);
    }

    #[test]
    fn test_row_clear_chain() {
        let mut g = game(&["ABCD", "CDAB", "AACD", "BDAB"], &[1, 2, 3]);
        g.grid_mut().set_effect(Coord::new(2, 1), Effect::RowClear);
        g.tick(16);
        g.take_events();

        g.request_swap(Coord::new(2, 2), Coord::new(3, 2)).unwrap();
        g.tick(crate::types::SWAP_MS);
        g.tick(crate::types::DISAPPEAR_MS);

        let events = g.take_events();
        assert!(events.contains(&GameEvent::ChainTriggered { tokens: 1 }));
        assert_eq!(g.score(), 9);

        // the caught (2, 3) token scores as its own pass
        g.tick(crate::types::DISAPPEAR_MS);
        assert_eq!(g.combo(), 4);
        assert_eq!(g.score(), 13);
        assert_eq!(g.stats().cascades, 1);
        assert_eq!(g.stats().cleared, 4);
    }

    #[test]
    fn test_stalemate_reshuffles() {
        let mut g = game(&["ABCD", "CDAB", "ABCD", "CDAB"], &[0, 1, 2, 3, 2, 1]);
        assert!(g.is_stalemate());
        g.tick(16);
        assert_eq!(g.take_events(), vec![GameEvent::Reshuffled]);
        assert_eq!(g.animations().len(), 1);

        g.tick(crate::types::DISAPPEAR_MS);
        assert!(g.grid().len() < 16);
        assert_eq!(g.score(), 0, "reshuffle never scores");
        assert_eq!(g.stats().reshuffles, 1);
    }

    #[test]
    fn test_swapped_wildcard_survives_the_swap() {
        // (2, 1) <-> (1, 1) moves the wildcard up and forms no run
        let mut g = game(&["ABCD", "CDAB", "A*CD", "CDAB"], &[1, 2, 3]);
        assert!(!g.is_stalemate());
        g.tick(16);
        g.take_events();
        let wild = g.grid().id_at(2, 1).unwrap();

        assert_eq!(
            g.request_swap(Coord::new(2, 1), Coord::new(1, 1)),
            Ok(SwapOutcome::Accepted)
        );
        g.tick(crate::types::SWAP_MS);
        g.tick(crate::types::DISAPPEAR_MS);

        assert!(g.can_move());
        assert_eq!(g.grid().locate(wild), Some(Coord::new(1, 1)));
        assert!(g.grid().has_wildcard());
        assert_eq!(g.grid().len(), 16);
        assert_eq!(g.score(), 0);
        assert_eq!(g.stats().cleared, 0);
        assert!(!g
            .take_events()
            .iter()
            .any(|e| matches!(e, GameEvent::Matched { .. } | GameEvent::Cleared { .. })));
    }

    #[test]
    fn test_snapshot_tracks_state() {
        let mut g = game(&["ABCD", "CDAB", "AACD", "CDAB"], &[0]);
        g.tick(16);
        let snap = g.snapshot();
        assert_eq!(snap.grid_size, 4);
        assert_eq!(snap.cell(0, 0), Some(1));
        assert_eq!(snap.tokens.len(), 16);
        assert!(snap.playable());

        let again = g.snapshot();
        assert_eq!(snap.board_hash, again.board_hash);
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let bad = EngineConfig {
            kinds_count: 1,
            ..EngineConfig::default()
        };
        assert!(GameState::new(bad).is_err());
    }
}
