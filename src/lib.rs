//! Abalone-MCTS: an Abalone move engine with a Monte Carlo Tree Search player.
//!
//! The engine validates and applies moves on the 61-cell hexagonal board
//! (solo, inline with sumito pushes, and broadside moves) and detects the end
//! of the game. The search player picks moves with UCT-guided tree descent and
//! uniformly random playouts.
//!
//! ## Modules
//!
//! - [`constants`] - Board geometry and engine parameters
//! - [`board`] - Players, squares, cells and directions
//! - [`chain`] - Alignment of marble groups
//! - [`position`] - Board state, move validation and win detection
//! - [`movegen`] - Legal move generation
//! - [`playout`] - Random move selection and game simulation
//! - [`mcts`] - Monte Carlo Tree Search
//!
//! ## Example
//!
//! ```
//! use abalone_mcts::board::{Cell, Direction, Player};
//! use abalone_mcts::{apply_move, choose_move, new_game};
//!
//! // Create a new game and move a pair of marbles sideways
//! let pos = new_game();
//! let group = [Cell::new(1, 4), Cell::new(1, 5)];
//! let pos = apply_move(&pos, &group, Direction::SE, Player::One).unwrap();
//!
//! // Let MCTS pick the reply
//! let reply = choose_move(&pos, 20).unwrap();
//! println!("Reply: {reply}");
//! ```

pub mod board;
pub mod chain;
pub mod constants;
pub mod mcts;
pub mod movegen;
pub mod playout;
pub mod position;

use board::{Cell, Direction, Player};
use position::{BoardState, MoveError};

pub use mcts::{Mcts, SearchConfig, SearchError, choose_move};
pub use movegen::legal_moves;
pub use position::Move;

/// The standard starting position.
pub fn new_game() -> BoardState {
    BoardState::new()
}

/// Apply a move for `player`; `state` is left untouched.
pub fn apply_move(
    state: &BoardState,
    group: &[Cell],
    direction: Direction,
    player: Player,
) -> Result<BoardState, MoveError> {
    state.apply_move(group, direction, player)
}

pub fn is_terminal(state: &BoardState) -> bool {
    state.is_terminal()
}

pub fn winner(state: &BoardState) -> Option<Player> {
    state.winner()
}
