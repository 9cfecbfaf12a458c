//! Legal move generation.
//!
//! Every straight chain of one to three friendly marbles is paired with each
//! of the six directions and checked by the move validator. Whatever the
//! validator accepts is legal; rejections are simply dropped.

use crate::board::{Cell, Direction, Player};
use crate::constants::MAX_GROUP;
use crate::position::{BoardState, Move};

/// The three directions that point "forward" in row-major order.
///
/// Every straight chain has a unique lowest cell and extends from it along
/// exactly one of these, so building chains this way yields each one once.
const FORWARD_AXES: [Direction; 3] = [Direction::E, Direction::SW, Direction::SE];

/// All straight chains of `player`'s marbles, each listed once.
pub fn chains(state: &BoardState, player: Player) -> Vec<Vec<Cell>> {
    let mut out = Vec::new();
    for root in state.marbles(player) {
        out.push(vec![root]);
        for axis in FORWARD_AXES {
            let mut chain = vec![root];
            let mut next = root.step(axis);
            while chain.len() < MAX_GROUP && state.square(next).holds(player) {
                chain.push(next);
                out.push(chain.clone());
                next = next.step(axis);
            }
        }
    }
    out
}

/// Every candidate `(group, direction)` pair for `player`, legal or not.
pub(crate) fn candidates(state: &BoardState, player: Player) -> Vec<Move> {
    chains(state, player)
        .into_iter()
        .flat_map(|chain| {
            Direction::ALL
                .into_iter()
                .map(move |dir| Move::new(chain.clone(), dir))
        })
        .collect()
}

/// All legal moves for `player`. Empty once the game is over.
pub fn legal_moves(state: &BoardState, player: Player) -> Vec<Move> {
    candidates(state, player)
        .into_iter()
        .filter(|mv| state.apply_move(&mv.group, mv.direction, player).is_ok())
        .collect()
}

/// Legal moves for the side to move, paired with the positions they lead to.
pub fn successors(state: &BoardState) -> Vec<(Move, BoardState)> {
    let player = state.turn();
    candidates(state, player)
        .into_iter()
        .filter_map(|mv| {
            state
                .apply_move(&mv.group, mv.direction, player)
                .ok()
                .map(|next| (mv, next))
        })
        .collect()
}
