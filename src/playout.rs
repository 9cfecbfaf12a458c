//! Monte Carlo playouts (random game simulation).
//!
//! A playout plays uniformly random legal moves for alternating sides until
//! the game ends, then scores the result. No heuristics are applied.

use fastrand::Rng;

use crate::constants::REWARD_DRAW;
use crate::movegen::candidates;
use crate::position::{BoardState, Move};

/// Pick a uniformly random legal move for the side to move.
///
/// Candidates are visited in a random order and the first legal one is
/// taken, which is uniform over the legal moves without validating all of
/// them. Returns `None` when the game is over or no move is legal.
pub fn random_move(state: &BoardState, rng: &mut Rng) -> Option<(Move, BoardState)> {
    if state.is_terminal() {
        return None;
    }

    let mut candidates = candidates(state, state.turn());
    let n = candidates.len();
    for i in 0..n {
        // Pick a random remaining candidate
        let j = i + rng.usize(..n - i);
        candidates.swap(i, j);

        if let Ok(next) = state.play(&candidates[i]) {
            return Some((candidates.swap_remove(i), next));
        }
    }

    None
}

/// Play random moves from `state` until the game ends.
///
/// The result is scored for the player who moved *into* `state` (the
/// opponent of `state.turn()`): 1 for a win, 0 for a loss. A game still
/// running after `max_plies` half-moves, or one where the side to move is
/// stuck, scores 0.5.
pub fn playout(state: &BoardState, rng: &mut Rng, max_plies: usize) -> f64 {
    let mut pos = state.clone();
    // The terminal reward is for the player to move there; flip it on every
    // ply so it ends up on the side of whoever moved into `state`.
    let mut invert = true;
    let mut plies = 0;

    loop {
        if let Some(reward) = pos.reward() {
            return if invert { 1.0 - reward } else { reward };
        }
        if plies >= max_plies {
            return REWARD_DRAW;
        }
        match random_move(&pos, rng) {
            Some((_, next)) => pos = next,
            None => return REWARD_DRAW,
        }
        invert = !invert;
        plies += 1;
    }
}
