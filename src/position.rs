//! Abalone position representation and move validation.
//!
//! This module provides the core game logic:
//! - [`BoardState`], an immutable position value (grid, side to move, result)
//! - the move validator, which classifies a group move as solo, inline
//!   (including sumito pushes) or broadside and produces the next position
//! - terminal detection once a side is down to `ELIMINATION_THRESHOLD` marbles
//!
//! Validation never mutates the position it is called on; a successful move
//! returns a fresh [`BoardState`].

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::board::{Cell, Direction, Player, Square};
use crate::chain::{aligned, front, validate_alignment};
use crate::constants::{
    ELIMINATION_THRESHOLD, MAX_GROUP, N, REWARD_DRAW, REWARD_LOSS, REWARD_WIN,
};

/// Grid contents indexed by `[row][col]`.
pub type Grid = [[Square; N]; N];

/// Reason a move attempt was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum MoveError {
    /// A group cell does not hold one of the mover's marbles
    #[error("Illegal move: group contains a cell without one of your marbles")]
    Color,
    #[error("Illegal move: unknown direction")]
    UnknownDirection,
    /// A cell in move notation is not written as `row,col`
    #[error("Illegal move: malformed coordinate, expected row,col")]
    BadCoordinate,
    /// Group is empty, too long, or not a straight line
    #[error("Illegal move: group must be 1 to 3 marbles in a straight line")]
    InvalidGroup,
    #[error("Illegal move: target is outside the board")]
    OutOfBoard,
    #[error("Illegal move: target holds one of your own marbles")]
    OccupiedBySelf,
    /// No room to push, too many to push, or broadside target occupied
    #[error("Illegal move: blocked")]
    Blocked,
    /// A broadside group would step over the edge of the board
    #[error("Illegal move: group would leave the board")]
    OutOfLimit,
    #[error("Illegal move: the game is over")]
    GameOver,
}

/// Failure to parse a textual board layout.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    #[error("expected 9 rows, found {0}")]
    RowCount(usize),
    #[error("row {row} needs {expected} cells, found {found}")]
    RowLength {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("row {row}: unknown cell '{token}'")]
    UnknownToken { row: usize, token: char },
}

/// Shape of a validated move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MoveKind {
    Solo,
    Inline,
    /// Inline move that displaces an opposing line
    Sumito,
    Broadside,
}

/// A group of marbles and the direction it moves in.
///
/// The group is kept in canonical (row-major) order so equal moves compare
/// equal regardless of how the group was listed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Move {
    pub group: Vec<Cell>,
    pub direction: Direction,
}

impl Move {
    pub fn new(mut group: Vec<Cell>, direction: Direction) -> Self {
        group.sort_unstable();
        Self { group, direction }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, cell) in self.group.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{cell}")?;
        }
        write!(f, "] {}", self.direction)
    }
}

impl FromStr for Move {
    type Err = MoveError;

    /// Parse `"r,c r,c DIR"`; brackets around the group are optional.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let cleaned = s.replace(['[', ']'], " ");
        let mut tokens: Vec<&str> = cleaned.split_whitespace().collect();
        let direction = tokens.pop().ok_or(MoveError::UnknownDirection)?.parse()?;
        let group = tokens
            .into_iter()
            .map(str::parse)
            .collect::<Result<Vec<Cell>, _>>()?;
        Ok(Self::new(group, direction))
    }
}

/// Outcome of a successful move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    /// Position after the move, with the opponent to play
    pub state: BoardState,
    pub kind: MoveKind,
    /// Cells the pushed opposing marbles occupied before a sumito
    pub pushed: Vec<Cell>,
    /// Cell of the opposing marble that was pushed off the board, if any
    pub eliminated: Option<Cell>,
}

/// An Abalone position.
///
/// Immutable: every move yields a new value, which makes positions safe to
/// share between search nodes and usable as hash-map keys.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct BoardState {
    grid: Grid,
    turn: Player,
    terminal: bool,
    winner: Option<Player>,
}

impl Default for BoardState {
    fn default() -> Self {
        Self::new()
    }
}

impl BoardState {
    /// The standard starting position, 14 marbles per side, player one to move.
    pub fn new() -> Self {
        let mut grid = blank_grid();
        let one = [(0, 0..=4), (1, 0..=5), (2, 2..=4)];
        let two = [(6, 4..=6), (7, 3..=8), (8, 4..=8)];
        for (row, cols) in one {
            for col in cols {
                put(&mut grid, Cell::new(row, col), Square::Marble(Player::One));
            }
        }
        for (row, cols) in two {
            for col in cols {
                put(&mut grid, Cell::new(row, col), Square::Marble(Player::Two));
            }
        }
        Self::settle(grid, Player::One)
    }

    /// A board with no marbles.
    pub fn empty(turn: Player) -> Self {
        Self::settle(blank_grid(), turn)
    }

    /// Parse a layout of nine rows holding only the on-board cells.
    ///
    /// `X` is a player one marble, `O` a player two marble and `.` an empty
    /// cell; whitespace is ignored, so the output of `Display` parses back.
    /// Terminal status is derived from the marble counts.
    pub fn from_layout(text: &str, turn: Player) -> Result<Self, LayoutError> {
        let rows: Vec<&str> = text
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .collect();
        if rows.len() != N {
            return Err(LayoutError::RowCount(rows.len()));
        }

        let mut grid = blank_grid();
        for (r, line) in rows.iter().enumerate() {
            let cells: Vec<Cell> = row_cells(r).collect();
            let tokens: Vec<char> = line.chars().filter(|c| !c.is_whitespace()).collect();
            if tokens.len() != cells.len() {
                return Err(LayoutError::RowLength {
                    row: r,
                    expected: cells.len(),
                    found: tokens.len(),
                });
            }
            for (cell, token) in cells.into_iter().zip(tokens) {
                let square = match token {
                    '.' => Square::Empty,
                    t if t == Player::One.symbol() => Square::Marble(Player::One),
                    t if t == Player::Two.symbol() => Square::Marble(Player::Two),
                    t => return Err(LayoutError::UnknownToken { row: r, token: t }),
                };
                put(&mut grid, cell, square);
            }
        }
        Ok(Self::settle(grid, turn))
    }

    /// Build a state from a grid, deciding the result from the marble counts.
    ///
    /// If both sides are at or below the threshold, player two wins. Play
    /// never reaches that state, since a move removes at most one marble and
    /// only from the opponent; it arises only from hand-made layouts such as
    /// [`BoardState::empty`].
    fn settle(grid: Grid, turn: Player) -> Self {
        let count = |p: Player| grid.iter().flatten().filter(|s| s.holds(p)).count();
        let winner = if count(Player::One) <= ELIMINATION_THRESHOLD {
            Some(Player::Two)
        } else if count(Player::Two) <= ELIMINATION_THRESHOLD {
            Some(Player::One)
        } else {
            None
        };
        Self {
            grid,
            turn,
            terminal: winner.is_some(),
            winner,
        }
    }

    /// Contents of `cell`; anything outside the hexagon reads as `OutOfBoard`.
    #[inline]
    pub fn square(&self, cell: Cell) -> Square {
        cell.index()
            .map_or(Square::OutOfBoard, |(r, c)| self.grid[r][c])
    }

    /// Read-only view of the grid, for rendering.
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Side to move.
    pub fn turn(&self) -> Player {
        self.turn
    }

    pub fn is_terminal(&self) -> bool {
        self.terminal
    }

    pub fn winner(&self) -> Option<Player> {
        self.winner
    }

    /// Cells holding `player`'s marbles, in row-major order.
    pub fn marbles(&self, player: Player) -> impl Iterator<Item = Cell> + '_ {
        Cell::all().filter(move |&c| self.square(c).holds(player))
    }

    pub fn marble_count(&self, player: Player) -> usize {
        self.marbles(player).count()
    }

    pub fn total_marbles(&self) -> usize {
        self.marble_count(Player::One) + self.marble_count(Player::Two)
    }

    /// Reward of a finished game for the player to move in it: 1 for a win,
    /// 0 for a loss, 0.5 for a draw. `None` while the game is still running.
    pub fn reward(&self) -> Option<f64> {
        if !self.terminal {
            return None;
        }
        Some(match self.winner {
            Some(w) if w == self.turn => REWARD_WIN,
            Some(_) => REWARD_LOSS,
            None => REWARD_DRAW,
        })
    }

    /// Apply a move for `player`, returning the resulting position.
    ///
    /// # Errors
    /// The first rule the move violates; `self` is never modified.
    pub fn apply_move(
        &self,
        group: &[Cell],
        direction: Direction,
        player: Player,
    ) -> Result<BoardState, MoveError> {
        self.validate_move(group, direction, player).map(|t| t.state)
    }

    /// Apply a move whose direction is given by name (`"NW"`, `"E"`, ...).
    ///
    /// Colours are checked before the direction name, so a group with a
    /// foreign marble reports `Color` even when the name is also invalid.
    pub fn apply_named_move(
        &self,
        group: &[Cell],
        direction: &str,
        player: Player,
    ) -> Result<BoardState, MoveError> {
        if self.terminal {
            return Err(MoveError::GameOver);
        }
        self.check_colors(group, player)?;
        let direction = direction.parse()?;
        self.apply_move(group, direction, player)
    }

    /// Play `mv` for the side to move.
    pub fn play(&self, mv: &Move) -> Result<BoardState, MoveError> {
        self.apply_move(&mv.group, mv.direction, self.turn)
    }

    /// Validate a move and describe its effect.
    ///
    /// Checks run in order (game over, colours, group shape, then the rules
    /// for the shape) and the first failure is returned.
    pub fn validate_move(
        &self,
        group: &[Cell],
        direction: Direction,
        player: Player,
    ) -> Result<Transition, MoveError> {
        if self.terminal {
            return Err(MoveError::GameOver);
        }
        self.check_colors(group, player)?;
        match validate_alignment(group)? {
            None => self.solo_move(group[0], direction, player),
            Some(axis) if aligned(direction, axis) => self.inline_move(group, direction, player),
            Some(_) => self.broadside_move(group, direction, player),
        }
    }

    fn check_colors(&self, group: &[Cell], player: Player) -> Result<(), MoveError> {
        if group.iter().all(|&c| self.square(c).holds(player)) {
            Ok(())
        } else {
            Err(MoveError::Color)
        }
    }

    fn solo_move(&self, from: Cell, dir: Direction, player: Player) -> Result<Transition, MoveError> {
        match self.square(from.step(dir)) {
            Square::OutOfBoard => Err(MoveError::OutOfBoard),
            Square::Marble(p) if p == player => Err(MoveError::OccupiedBySelf),
            // A lone marble never pushes
            Square::Marble(_) => Err(MoveError::Blocked),
            Square::Empty => Ok(self.relocate(&[from], &[], dir, player, MoveKind::Solo)),
        }
    }

    fn inline_move(
        &self,
        group: &[Cell],
        dir: Direction,
        player: Player,
    ) -> Result<Transition, MoveError> {
        let lead = front(group, dir).ok_or(MoveError::InvalidGroup)?;
        let target = lead.step(dir);
        match self.square(target) {
            Square::OutOfBoard => Err(MoveError::OutOfBoard),
            Square::Marble(p) if p == player => Err(MoveError::OccupiedBySelf),
            Square::Empty => Ok(self.relocate(group, &[], dir, player, MoveKind::Inline)),
            Square::Marble(_) => self.sumito(group, target, dir, player),
        }
    }

    /// Push the opposing line that starts at `target`.
    ///
    /// The pushing group must outnumber the opposing run, and the cell behind
    /// the run must be empty or off the board.
    fn sumito(
        &self,
        group: &[Cell],
        target: Cell,
        dir: Direction,
        player: Player,
    ) -> Result<Transition, MoveError> {
        let opponent = player.opponent();
        let mut run = Vec::with_capacity(MAX_GROUP - 1);
        let mut cursor = target;
        while self.square(cursor).holds(opponent) {
            if run.len() + 1 >= group.len() {
                return Err(MoveError::Blocked);
            }
            run.push(cursor);
            cursor = cursor.step(dir);
        }

        match self.square(cursor) {
            Square::Empty | Square::OutOfBoard => {
                Ok(self.relocate(group, &run, dir, player, MoveKind::Sumito))
            }
            Square::Marble(_) => Err(MoveError::Blocked),
        }
    }

    fn broadside_move(
        &self,
        group: &[Cell],
        dir: Direction,
        player: Player,
    ) -> Result<Transition, MoveError> {
        for &cell in group {
            match self.square(cell.step(dir)) {
                Square::Empty => {}
                Square::OutOfBoard => return Err(MoveError::OutOfLimit),
                Square::Marble(_) => return Err(MoveError::Blocked),
            }
        }
        Ok(self.relocate(group, &[], dir, player, MoveKind::Broadside))
    }

    /// Shift `group` and the pushed `run` one step along `dir`.
    ///
    /// Pushed marbles that land off the board are removed.
    fn relocate(
        &self,
        group: &[Cell],
        run: &[Cell],
        dir: Direction,
        player: Player,
        kind: MoveKind,
    ) -> Transition {
        let opponent = player.opponent();
        let mut grid = self.grid;

        for &cell in group.iter().chain(run) {
            put(&mut grid, cell, Square::Empty);
        }
        for &cell in group {
            put(&mut grid, cell.step(dir), Square::Marble(player));
        }

        let mut eliminated = None;
        for &cell in run {
            let dest = cell.step(dir);
            if dest.is_on_board() {
                put(&mut grid, dest, Square::Marble(opponent));
            } else {
                eliminated = Some(cell);
            }
        }

        Transition {
            state: Self::settle(grid, opponent),
            kind,
            pushed: run.to_vec(),
            eliminated,
        }
    }
}

/// Grid with every hexagon cell empty and the corners out of board.
fn blank_grid() -> Grid {
    let mut grid = [[Square::OutOfBoard; N]; N];
    for cell in Cell::all() {
        put(&mut grid, cell, Square::Empty);
    }
    grid
}

#[inline]
fn put(grid: &mut Grid, cell: Cell, square: Square) {
    if let Some((r, c)) = cell.index() {
        grid[r][c] = square;
    }
}

/// On-board cells of grid row `row`, left to right.
fn row_cells(row: usize) -> impl Iterator<Item = Cell> {
    Cell::all().filter(move |c| c.row as usize == row)
}

impl fmt::Display for BoardState {
    /// Rows are indented so the hexagon reads naturally; the output is a
    /// valid layout for [`BoardState::from_layout`].
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..N {
            let indent = (row as isize - (N / 2) as isize).unsigned_abs();
            write!(f, "{:indent$}", "")?;
            for (i, cell) in row_cells(row).enumerate() {
                let ch = match self.square(cell) {
                    Square::Marble(p) => p.symbol(),
                    _ => '.',
                };
                if i > 0 {
                    write!(f, " ")?;
                }
                write!(f, "{ch}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::STARTING_MARBLES;

    /// Parse a layout, player one to move.
    fn board(rows: [&str; N]) -> BoardState {
        BoardState::from_layout(&rows.join("\n"), Player::One).unwrap()
    }

    /// Eleven X marbles on top, twelve O marbles at the bottom, and `middle`
    /// as row 4.
    fn centre_row(middle: &str) -> BoardState {
        board([
            "X X X X X",
            "X X X X . .",
            ". . . . . . .",
            ". . . . . . . .",
            middle,
            ". . . . . . . .",
            ". . . . . . .",
            "O O O O O O",
            "O O O O O",
        ])
    }

    fn cells(raw: &[[i8; 2]]) -> Vec<Cell> {
        raw.iter().copied().map(Cell::from).collect()
    }

    #[test]
    fn test_new_game() {
        let pos = BoardState::new();
        assert_eq!(pos.marble_count(Player::One), STARTING_MARBLES);
        assert_eq!(pos.marble_count(Player::Two), STARTING_MARBLES);
        assert_eq!(pos.turn(), Player::One);
        assert!(!pos.is_terminal());
        assert_eq!(pos.winner(), None);
        assert_eq!(pos.square(Cell::new(0, 5)), Square::OutOfBoard);
        assert_eq!(pos.square(Cell::new(2, 2)), Square::Marble(Player::One));
        assert_eq!(pos.square(Cell::new(6, 6)), Square::Marble(Player::Two));
        assert_eq!(pos.square(Cell::new(4, 4)), Square::Empty);
    }

    #[test]
    fn test_display_parses_back() {
        let pos = BoardState::new();
        let text = pos.to_string();
        assert!(text.starts_with("    X X X X X\n"));
        assert_eq!(BoardState::from_layout(&text, Player::One), Ok(pos));
    }

    #[test]
    fn test_layout_errors() {
        assert_eq!(
            BoardState::from_layout("X X X", Player::One),
            Err(LayoutError::RowCount(1))
        );
        let mut rows = BoardState::new().to_string();
        rows = rows.replacen("X X X X X", "X X X X", 1);
        assert_eq!(
            BoardState::from_layout(&rows, Player::One),
            Err(LayoutError::RowLength {
                row: 0,
                expected: 5,
                found: 4
            })
        );
        let rows = BoardState::new().to_string().replacen('.', "?", 1);
        assert!(matches!(
            BoardState::from_layout(&rows, Player::One),
            Err(LayoutError::UnknownToken { token: '?', .. })
        ));
    }

    #[test]
    fn test_solo_move() {
        let pos = centre_row(". . . X . . . . .");
        let next = pos
            .apply_move(&cells(&[[4, 3]]), Direction::SE, Player::One)
            .unwrap();
        assert_eq!(next.square(Cell::new(4, 3)), Square::Empty);
        assert_eq!(next.square(Cell::new(5, 4)), Square::Marble(Player::One));
        assert_eq!(next.turn(), Player::Two);
        // The source position is untouched
        assert_eq!(pos.square(Cell::new(4, 3)), Square::Marble(Player::One));
    }

    #[test]
    fn test_solo_cannot_push() {
        let pos = centre_row(". . . X O . . . .");
        assert_eq!(
            pos.apply_move(&cells(&[[4, 3]]), Direction::E, Player::One),
            Err(MoveError::Blocked)
        );
    }

    #[test]
    fn test_solo_into_own_marble() {
        let pos = centre_row(". . . X X . . . .");
        assert_eq!(
            pos.apply_move(&cells(&[[4, 3]]), Direction::E, Player::One),
            Err(MoveError::OccupiedBySelf)
        );
    }

    #[test]
    fn test_inline_translation() {
        let pos = centre_row(". . X X . . . . .");
        let t = pos
            .validate_move(&cells(&[[4, 2], [4, 3]]), Direction::E, Player::One)
            .unwrap();
        assert_eq!(t.kind, MoveKind::Inline);
        assert_eq!(t.state.square(Cell::new(4, 2)), Square::Empty);
        assert_eq!(t.state.square(Cell::new(4, 3)), Square::Marble(Player::One));
        assert_eq!(t.state.square(Cell::new(4, 4)), Square::Marble(Player::One));
        assert_eq!(t.state.total_marbles(), pos.total_marbles());
    }

    #[test]
    fn test_inline_into_own_marble() {
        let pos = centre_row(". . X X X . . . .");
        assert_eq!(
            pos.apply_move(&cells(&[[4, 2], [4, 3]]), Direction::E, Player::One),
            Err(MoveError::OccupiedBySelf)
        );
    }

    #[test]
    fn test_inline_off_the_edge() {
        let pos = centre_row(". . . . . . . X X");
        assert_eq!(
            pos.apply_move(&cells(&[[4, 7], [4, 8]]), Direction::E, Player::One),
            Err(MoveError::OutOfBoard)
        );
    }

    #[test]
    fn test_two_push_one() {
        let pos = centre_row(". . X X O . . . .");
        let t = pos
            .validate_move(&cells(&[[4, 2], [4, 3]]), Direction::E, Player::One)
            .unwrap();
        assert_eq!(t.kind, MoveKind::Sumito);
        assert_eq!(t.pushed, vec![Cell::new(4, 4)]);
        assert_eq!(t.eliminated, None);
        assert_eq!(t.state.square(Cell::new(4, 4)), Square::Marble(Player::One));
        assert_eq!(t.state.square(Cell::new(4, 5)), Square::Marble(Player::Two));
        assert_eq!(t.state.total_marbles(), pos.total_marbles());
    }

    #[test]
    fn test_two_cannot_push_two() {
        let pos = centre_row(". . X X O O . . .");
        assert_eq!(
            pos.apply_move(&cells(&[[4, 2], [4, 3]]), Direction::E, Player::One),
            Err(MoveError::Blocked)
        );
    }

    #[test]
    fn test_three_push_two() {
        let pos = centre_row(". X X X O O . . .");
        let next = pos
            .apply_move(&cells(&[[4, 1], [4, 2], [4, 3]]), Direction::E, Player::One)
            .unwrap();
        assert_eq!(next.square(Cell::new(4, 1)), Square::Empty);
        assert_eq!(next.square(Cell::new(4, 4)), Square::Marble(Player::One));
        assert_eq!(next.square(Cell::new(4, 5)), Square::Marble(Player::Two));
        assert_eq!(next.square(Cell::new(4, 6)), Square::Marble(Player::Two));
    }

    #[test]
    fn test_three_cannot_push_three() {
        let pos = board([
            "X X X X X",
            "X X X X . .",
            ". . . . . . .",
            ". . . . . . . .",
            "X X X O O O . . .",
            ". . . . . . . .",
            ". . . . . . .",
            "O O O O O O",
            "O O O O O",
        ]);
        assert_eq!(
            pos.apply_move(&cells(&[[4, 0], [4, 1], [4, 2]]), Direction::E, Player::One),
            Err(MoveError::Blocked)
        );
    }

    #[test]
    fn test_push_blocked_by_marble_behind() {
        let pos = centre_row(". X X X O X . . .");
        assert_eq!(
            pos.apply_move(&cells(&[[4, 1], [4, 2], [4, 3]]), Direction::E, Player::One),
            Err(MoveError::Blocked)
        );
        let pos = centre_row(". X X X O O O . .");
        assert_eq!(
            pos.apply_move(&cells(&[[4, 1], [4, 2], [4, 3]]), Direction::E, Player::One),
            Err(MoveError::Blocked)
        );
    }

    #[test]
    fn test_push_off_the_edge() {
        let pos = centre_row(". . . . . X X X O");
        let t = pos
            .validate_move(&cells(&[[4, 5], [4, 6], [4, 7]]), Direction::E, Player::One)
            .unwrap();
        assert_eq!(t.eliminated, Some(Cell::new(4, 8)));
        assert_eq!(t.state.marble_count(Player::Two), pos.marble_count(Player::Two) - 1);
        assert_eq!(t.state.square(Cell::new(4, 8)), Square::Marble(Player::One));
        assert_eq!(t.state.square(Cell::new(4, 5)), Square::Empty);
    }

    #[test]
    fn test_broadside() {
        let pos = centre_row(". . X X . . . . .");
        let t = pos
            .validate_move(&cells(&[[4, 2], [4, 3]]), Direction::SE, Player::One)
            .unwrap();
        assert_eq!(t.kind, MoveKind::Broadside);
        assert_eq!(t.state.square(Cell::new(5, 3)), Square::Marble(Player::One));
        assert_eq!(t.state.square(Cell::new(5, 4)), Square::Marble(Player::One));
        assert_eq!(t.state.square(Cell::new(4, 2)), Square::Empty);
        assert_eq!(t.state.square(Cell::new(4, 3)), Square::Empty);
    }

    #[test]
    fn test_broadside_never_pushes() {
        let pos = board([
            "X X X X X",
            "X X X X . .",
            ". . . . . . .",
            ". . . . . . . .",
            ". . X X . . . . .",
            ". . . O . . . .",
            ". . . . . . .",
            "O O O O O O",
            "O O O O O",
        ]);
        // (4,3) + SE = (5,4), held by O
        assert_eq!(
            pos.apply_move(&cells(&[[4, 2], [4, 3]]), Direction::SE, Player::One),
            Err(MoveError::Blocked)
        );
    }

    #[test]
    fn test_broadside_blocked_by_own_marble() {
        let pos = board([
            "X X X X X",
            "X X X X . .",
            ". . . . . . .",
            ". . . . . . . .",
            ". . X X . . . . .",
            ". . X . . . . .",
            ". . . . . . .",
            "O O O O O O",
            "O O O O O",
        ]);
        // (4,2) + SE = (5,3), held by X; (4,3) + SE = (5,4) is free
        assert_eq!(pos.square(Cell::new(5, 3)), Square::Marble(Player::One));
        assert_eq!(pos.square(Cell::new(5, 4)), Square::Empty);
        assert_eq!(
            pos.apply_move(&cells(&[[4, 2], [4, 3]]), Direction::SE, Player::One),
            Err(MoveError::Blocked)
        );
    }

    #[test]
    fn test_three_marble_broadside() {
        let pos = centre_row(". . X X X . . . .");
        let line = cells(&[[4, 2], [4, 3], [4, 4]]);
        let t = pos.validate_move(&line, Direction::SW, Player::One).unwrap();
        assert_eq!(t.kind, MoveKind::Broadside);
        for &c in &line {
            assert_eq!(t.state.square(c), Square::Empty);
            assert_eq!(t.state.square(c.step(Direction::SW)), Square::Marble(Player::One));
        }
        assert_eq!(t.state.total_marbles(), pos.total_marbles());
        assert!(t.pushed.is_empty());
    }

    #[test]
    fn test_three_marble_broadside_is_all_or_nothing() {
        let pos = board([
            "X X X X X",
            "X X X X . .",
            ". . . . . . .",
            ". . . . . . . .",
            ". . X X X . . . .",
            ". . . . O . . .",
            ". . . . . . .",
            "O O O O O O",
            "O O O O O",
        ]);
        // Only the last member's target (5,5) is occupied
        let line = cells(&[[4, 2], [4, 3], [4, 4]]);
        assert_eq!(
            pos.apply_move(&line, Direction::SE, Player::One),
            Err(MoveError::Blocked)
        );
        // The same move without the blocked member is legal
        assert!(pos
            .apply_move(&cells(&[[4, 2], [4, 3]]), Direction::SE, Player::One)
            .is_ok());
    }

    #[test]
    fn test_broadside_off_the_edge() {
        let pos = centre_row(". . . . . . . . .");
        assert_eq!(
            pos.apply_move(&cells(&[[0, 0], [0, 1]]), Direction::NE, Player::One),
            Err(MoveError::OutOfLimit)
        );
    }

    #[test]
    fn test_color_checked_first() {
        let pos = BoardState::new();
        assert_eq!(
            pos.apply_named_move(&cells(&[[6, 4]]), "UP", Player::One),
            Err(MoveError::Color)
        );
        assert_eq!(
            pos.apply_named_move(&cells(&[[4, 4]]), "E", Player::One),
            Err(MoveError::Color)
        );
        assert_eq!(
            pos.apply_named_move(&cells(&[[2, 2]]), "UP", Player::One),
            Err(MoveError::UnknownDirection)
        );
    }

    #[test]
    fn test_invalid_groups() {
        let pos = BoardState::new();
        assert_eq!(
            pos.apply_move(&cells(&[[1, 0], [1, 2]]), Direction::SE, Player::One),
            Err(MoveError::InvalidGroup)
        );
        assert_eq!(
            pos.apply_move(&cells(&[[1, 1], [1, 2], [1, 3], [1, 4]]), Direction::SE, Player::One),
            Err(MoveError::InvalidGroup)
        );
        assert_eq!(
            pos.apply_move(&[], Direction::SE, Player::One),
            Err(MoveError::InvalidGroup)
        );
    }

    #[test]
    fn test_reward_requires_terminal() {
        assert_eq!(BoardState::new().reward(), None);
        let pos = BoardState::empty(Player::One);
        // Both sides have nothing left; player two is declared the winner
        assert!(pos.is_terminal());
        assert_eq!(pos.winner(), Some(Player::Two));
        assert_eq!(pos.reward(), Some(REWARD_LOSS));
    }

    #[test]
    fn test_both_sides_eliminated_favours_player_two() {
        let text = [
            "X X X . .",
            ". . . . . .",
            ". . . . . . .",
            ". . . . . . . .",
            ". . . . . . . . .",
            ". . . . . . . .",
            ". . . . . . .",
            ". . . . . .",
            "O O O . .",
        ]
        .join("\n");
        for turn in [Player::One, Player::Two] {
            let pos = BoardState::from_layout(&text, turn).unwrap();
            assert!(pos.is_terminal());
            assert_eq!(pos.winner(), Some(Player::Two));
        }
    }

    #[test]
    fn test_no_moves_after_game_over() {
        let pos = BoardState::empty(Player::One);
        assert_eq!(
            pos.apply_move(&cells(&[[4, 4]]), Direction::E, Player::One),
            Err(MoveError::GameOver)
        );
    }

    #[test]
    fn test_move_text_roundtrip() {
        let mv = Move::new(cells(&[[1, 5], [0, 4]]), Direction::SE);
        assert_eq!(mv.group, cells(&[[0, 4], [1, 5]]));
        assert_eq!(mv.to_string(), "[0,4 1,5] SE");
        assert_eq!("[0,4 1,5] SE".parse::<Move>(), Ok(mv.clone()));
        assert_eq!("1,5 0,4 se".parse::<Move>(), Ok(mv));
        assert_eq!("0,4 1,5 UP".parse::<Move>(), Err(MoveError::UnknownDirection));
        assert_eq!("0;4 1,5 SE".parse::<Move>(), Err(MoveError::BadCoordinate));
    }
}
