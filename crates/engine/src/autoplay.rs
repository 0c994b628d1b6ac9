use gem_grid_core::{GameState, SimpleRng, SwapError, SwapOutcome, TokenFactory};
use gem_grid_input::{drag_between, BoardGeometry, GestureMapper};

use crate::types::SwapIntent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayError {
    NotReady,
    NoLegalMove,
    GestureLost,
    Refused(SwapError),
    Rejected,
    Timeout,
}

impl PlayError {
    pub fn code(self) -> &'static str {
        match self {
            PlayError::NotReady => "not_ready",
            PlayError::NoLegalMove => "no_legal_move",
            PlayError::GestureLost | PlayError::Refused(_) | PlayError::Rejected => "invalid_move",
            PlayError::Timeout => "timeout",
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            PlayError::NotReady => "game is not accepting input",
            PlayError::NoLegalMove => "no legal swap on the grid",
            PlayError::GestureLost => "drag did not map to a swap",
            PlayError::Refused(err) => err.message(),
            PlayError::Rejected => "swap formed no match",
            PlayError::Timeout => "grid did not settle within the tick limit",
        }
    }
}

/// Plays seeded random legal swaps through synthetic pointer drags.
#[derive(Debug, Clone)]
pub struct AutoPlayer {
    rng: SimpleRng,
    mapper: GestureMapper,
}

impl AutoPlayer {
    pub fn new(seed: u32, geometry: BoardGeometry) -> Self {
        Self {
            rng: SimpleRng::new(seed),
            mapper: GestureMapper::new(geometry),
        }
    }

    /// Player for a `grid_size` board laid out on 32px cells.
    pub fn for_grid(seed: u32, grid_size: usize) -> Self {
        Self::new(seed, BoardGeometry::new(grid_size, 32.0))
    }

    /// Pick a legal swap and perform it as a drag.
    pub fn play_move<F: TokenFactory>(
        &mut self,
        state: &mut GameState<F>,
    ) -> Result<SwapIntent, PlayError> {
        if !state.can_move() {
            return Err(PlayError::NotReady);
        }
        let swaps = state.legal_swaps();
        if swaps.is_empty() {
            return Err(PlayError::NoLegalMove);
        }
        let pick = swaps[self.rng.next_range(swaps.len() as u32) as usize];
        // Either token may be the one dragged.
        let (from, to) = if self.rng.next_range(2) == 0 {
            (pick.from, pick.to)
        } else {
            (pick.to, pick.from)
        };

        let mut intent = None;
        for event in drag_between(self.mapper.geometry(), from, to) {
            if let Some(found) = self.mapper.handle(event, state.can_move()) {
                intent = Some(found);
            }
        }
        let intent = intent.ok_or(PlayError::GestureLost)?;

        match state.apply_intent(intent) {
            Ok(SwapOutcome::Accepted) => {
                log::debug!(
                    "autoplay swapped ({}, {}) <-> ({}, {})",
                    intent.from.row,
                    intent.from.col,
                    intent.to.row,
                    intent.to.col
                );
                Ok(intent)
            }
            Ok(SwapOutcome::Rejected) => Err(PlayError::Rejected),
            Err(err) => Err(PlayError::Refused(err)),
        }
    }
}

/// Tick until the game accepts input again; returns the ticks spent.
pub fn run_until_ready<F: TokenFactory>(
    state: &mut GameState<F>,
    tick_ms: u32,
    max_ticks: u32,
) -> Result<u32, PlayError> {
    for ticks in 0..max_ticks {
        if state.can_move() {
            return Ok(ticks);
        }
        state.tick(tick_ms);
    }
    if state.can_move() {
        Ok(max_ticks)
    } else {
        Err(PlayError::Timeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gem_grid_core::{Grid, RandomTokenFactory};

    use crate::types::{Coord, EngineConfig, DEFAULT_TICK_MS};

    fn ready_game(seed: u32) -> GameState {
        let mut state = GameState::new(EngineConfig::default().with_seed(seed)).unwrap();
        run_until_ready(&mut state, DEFAULT_TICK_MS, 100_000).unwrap();
        state
    }

    #[test]
    fn test_play_move_accepts_and_blocks_input() {
        let mut state = ready_game(11);
        let mut player = AutoPlayer::for_grid(3, state.grid().size());

        let intent = player.play_move(&mut state).unwrap();
        assert!(intent.from.is_adjacent(intent.to));
        assert!(!state.can_move());
        assert_eq!(player.play_move(&mut state), Err(PlayError::NotReady));
        assert_eq!(state.stats().moves, 1);
    }

    #[test]
    fn test_single_legal_move_is_found() {
        let grid = Grid::from_layout(&["ABCD", "CDAB", "AACD", "CDAB"]).unwrap();
        let config = EngineConfig::new(4, 4).unwrap();
        let mut state = GameState::from_grid(config, grid, RandomTokenFactory::new(5, 4)).unwrap();
        run_until_ready(&mut state, DEFAULT_TICK_MS, 10).unwrap();

        let mut player = AutoPlayer::for_grid(1, 4);
        let intent = player.play_move(&mut state).unwrap();
        // every legal swap on this grid moves the C at (2, 2)
        assert!([intent.from, intent.to].contains(&Coord::new(2, 2)));
    }

    #[test]
    fn test_timeout_reported() {
        let mut state = GameState::new(EngineConfig::default()).unwrap();
        assert_eq!(
            run_until_ready(&mut state, DEFAULT_TICK_MS, 0),
            Err(PlayError::Timeout)
        );
        assert_eq!(PlayError::Timeout.code(), "timeout");
    }

    #[test]
    fn test_same_seed_same_moves() {
        let mut a = ready_game(21);
        let mut b = ready_game(21);
        let mut pa = AutoPlayer::for_grid(9, 8);
        let mut pb = AutoPlayer::for_grid(9, 8);
        for _ in 0..5 {
            assert_eq!(pa.play_move(&mut a), pb.play_move(&mut b));
            run_until_ready(&mut a, DEFAULT_TICK_MS, 100_000).unwrap();
            run_until_ready(&mut b, DEFAULT_TICK_MS, 100_000).unwrap();
            assert_eq!(a.snapshot().board_hash, b.snapshot().board_hash);
        }
        assert_eq!(a.score(), b.score());
    }
}
