//! Grid primitives: players, squares, cells, and the six hex directions.

use std::fmt;
use std::str::FromStr;

use crate::constants::{N, RADIUS};
use crate::position::MoveError;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Player {
    One,
    Two,
}

impl Player {
    pub fn opponent(self) -> Self {
        match self {
            Player::One => Player::Two,
            Player::Two => Player::One,
        }
    }

    /// Character used for this player's marbles in layouts and rendering.
    pub fn symbol(self) -> char {
        match self {
            Player::One => 'X',
            Player::Two => 'O',
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Player::One => write!(f, "player one"),
            Player::Two => write!(f, "player two"),
        }
    }
}

/// Contents of one grid square.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Square {
    Empty,
    Marble(Player),
    /// Grid corner outside the hexagon. Never occupiable.
    OutOfBoard,
}

impl Square {
    #[inline]
    pub fn is_empty(self) -> bool {
        self == Square::Empty
    }

    #[inline]
    pub fn holds(self, player: Player) -> bool {
        self == Square::Marble(player)
    }
}

/// A `(row, col)` coordinate in the 9x9 embedding.
///
/// Coordinates are signed so that stepping off the edge of the grid yields a
/// representable (off-board) cell instead of wrapping.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Cell {
    pub row: i8,
    pub col: i8,
}

impl Cell {
    pub const fn new(row: i8, col: i8) -> Self {
        Self { row, col }
    }

    /// Whether this cell lies inside the hexagon.
    #[inline]
    pub fn is_on_board(self) -> bool {
        let n = N as i8;
        (0..n).contains(&self.row)
            && (0..n).contains(&self.col)
            && (self.row - self.col).abs() <= RADIUS
    }

    /// The neighbouring cell one step along `dir`. May be off the board.
    ///
    /// Saturates at the limits of `i8`; such cells are off the board anyway.
    #[inline]
    pub fn step(self, dir: Direction) -> Self {
        let (dr, dc) = dir.vector();
        Self::new(self.row.saturating_add(dr), self.col.saturating_add(dc))
    }

    /// Grid indices, or `None` for cells outside the 9x9 embedding.
    #[inline]
    pub(crate) fn index(self) -> Option<(usize, usize)> {
        let n = N as i8;
        if (0..n).contains(&self.row) && (0..n).contains(&self.col) {
            Some((self.row as usize, self.col as usize))
        } else {
            None
        }
    }

    /// Iterate over all 61 on-board cells in row-major order.
    pub fn all() -> impl Iterator<Item = Cell> {
        (0..N as i8)
            .flat_map(|r| (0..N as i8).map(move |c| Cell::new(r, c)))
            .filter(|c| c.is_on_board())
    }
}

impl From<[i8; 2]> for Cell {
    fn from([row, col]: [i8; 2]) -> Self {
        Self::new(row, col)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.row, self.col)
    }
}

impl FromStr for Cell {
    type Err = MoveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (row, col) = s.trim().split_once(',').ok_or(MoveError::BadCoordinate)?;
        let row = row.trim().parse().map_err(|_| MoveError::BadCoordinate)?;
        let col = col.trim().parse().map_err(|_| MoveError::BadCoordinate)?;
        Ok(Self::new(row, col))
    }
}

/// One of the six unit steps between adjacent hex cells.
///
/// In `(row, col)` deltas the hexagon's axes are the row axis `(0, 1)`, the
/// column axis `(1, 0)` and the diagonal `(1, 1)`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Direction {
    NW,
    NE,
    E,
    SE,
    SW,
    W,
}

impl Direction {
    pub const ALL: [Direction; 6] = [
        Direction::NW,
        Direction::NE,
        Direction::E,
        Direction::SE,
        Direction::SW,
        Direction::W,
    ];

    /// `(row, col)` delta for one step.
    pub const fn vector(self) -> (i8, i8) {
        match self {
            Direction::NW => (-1, -1),
            Direction::NE => (-1, 0),
            Direction::E => (0, 1),
            Direction::SE => (1, 1),
            Direction::SW => (1, 0),
            Direction::W => (0, -1),
        }
    }

    pub const fn opposite(self) -> Self {
        match self {
            Direction::NW => Direction::SE,
            Direction::NE => Direction::SW,
            Direction::E => Direction::W,
            Direction::SE => Direction::NW,
            Direction::SW => Direction::NE,
            Direction::W => Direction::E,
        }
    }

    /// Inverse of [`Direction::vector`].
    pub fn from_vector(v: (i8, i8)) -> Option<Self> {
        Self::ALL.into_iter().find(|d| d.vector() == v)
    }

    pub fn name(self) -> &'static str {
        match self {
            Direction::NW => "NW",
            Direction::NE => "NE",
            Direction::E => "E",
            Direction::SE => "SE",
            Direction::SW => "SW",
            Direction::W => "W",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Direction {
    type Err = MoveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|d| d.name().eq_ignore_ascii_case(s))
            .ok_or(MoveError::UnknownDirection)
    }
}
