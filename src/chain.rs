//! Alignment analysis for marble groups.
//!
//! A group of two or three marbles may only move together when it forms a
//! straight line along one of the hexagon's three axes. The axis then decides
//! whether a move is inline (along the line) or broadside (across it).

use crate::board::{Cell, Direction};
use crate::constants::MAX_GROUP;
use crate::position::MoveError;

/// Check that `cells` form a straight chain of at most three marbles.
///
/// Returns `Ok(None)` for a single cell, which is aligned with every direction,
/// and `Ok(Some(axis))` for a longer chain, where `axis` points from the lowest
/// cell (in row-major order) towards the highest. The result does not depend on
/// the order of `cells`.
///
/// # Errors
/// `MoveError::InvalidGroup` when the group is empty, longer than three,
/// contains a repeated cell, or is not collinear with unit spacing.
pub fn validate_alignment(cells: &[Cell]) -> Result<Option<Direction>, MoveError> {
    if cells.is_empty() || cells.len() > MAX_GROUP {
        return Err(MoveError::InvalidGroup);
    }
    if cells.len() == 1 {
        return Ok(None);
    }

    let mut sorted = cells.to_vec();
    sorted.sort_unstable();

    let mut axis = None;
    for pair in sorted.windows(2) {
        let step = unit_step(pair[0], pair[1]).ok_or(MoveError::InvalidGroup)?;
        match axis {
            None => axis = Some(step),
            Some(a) if a == step => {}
            Some(_) => return Err(MoveError::InvalidGroup),
        }
    }
    Ok(axis)
}

/// Direction leading from `from` to the adjacent cell `to`, if they are
/// neighbours. Differences are taken in `i16`; any coordinates are accepted.
fn unit_step(from: Cell, to: Cell) -> Option<Direction> {
    let dr = i8::try_from(i16::from(to.row) - i16::from(from.row)).ok()?;
    let dc = i8::try_from(i16::from(to.col) - i16::from(from.col)).ok()?;
    Direction::from_vector((dr, dc))
}

/// Whether a move along `movement` is parallel to a chain lying on `axis`.
#[inline]
pub fn aligned(movement: Direction, axis: Direction) -> bool {
    let (mr, mc) = movement.vector();
    let (ar, ac) = axis.vector();
    movement == axis || (mr + ar, mc + ac) == (0, 0)
}

/// The member of a straight group that leads when moving along `dir`.
///
/// For an inline move this is the marble whose next cell is the target.
pub(crate) fn front(cells: &[Cell], dir: Direction) -> Option<Cell> {
    let (dr, dc) = dir.vector();
    cells
        .iter()
        .copied()
        .max_by_key(|c| i16::from(c.row) * i16::from(dr) + i16::from(c.col) * i16::from(dc))
}
