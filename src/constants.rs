//! Constants for board geometry, marble counts, and search parameters.
//!
//! The hexagonal board is embedded in a 9x9 grid indexed by `(row, col)`.
//! A grid cell belongs to the hexagon when `|row - col| <= RADIUS`; the
//! remaining 20 cells are permanently out of board.

// =============================================================================
// Board Geometry
// =============================================================================

/// Side length of the square grid the hexagon is embedded in.
pub const N: usize = 9;

/// Distance from the centre cell to any corner of the hexagon.
pub const RADIUS: i8 = 4;

/// Number of playable cells (a hexagon with 5 cells per side).
pub const CELL_COUNT: usize = 61;

/// Largest group of marbles that may move together.
pub const MAX_GROUP: usize = 3;

// =============================================================================
// Marble Counts
// =============================================================================

/// Marbles each side starts with.
pub const STARTING_MARBLES: usize = 14;

/// A side left with this many marbles (or fewer) has lost.
pub const ELIMINATION_THRESHOLD: usize = 8;

// =============================================================================
// MCTS (Monte Carlo Tree Search) Parameters
// =============================================================================

/// Default number of rollouts per move decision.
pub const N_ROLLOUTS: usize = 50;

/// Default UCT exploration coefficient.
pub const EXPLORATION: f64 = 1.0;

/// Half-moves after which a random playout is scored as a draw.
pub const MAX_PLAYOUT_PLIES: usize = 1000;

// =============================================================================
// Rewards (from the perspective of the player to move)
// =============================================================================

pub const REWARD_WIN: f64 = 1.0;

pub const REWARD_LOSS: f64 = 0.0;

/// Only produced by playouts cut off at `MAX_PLAYOUT_PLIES`.
pub const REWARD_DRAW: f64 = 0.5;
