use serde::{Deserialize, Serialize};
use std::fmt;

pub const BOARD_SIZE: usize = 8;
const LAST_INDEX: u8 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Player {
    White,
    Black,
}

impl Player {
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::White => Self::Black,
            Self::Black => Self::White,
        }
    }

    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::White => 0,
            Self::Black => 1,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::White => "white",
            Self::Black => "black",
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PieceKind {
    Man,
    King,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Piece {
    pub kind: PieceKind,
    pub player: Player,
}

impl Piece {
    #[must_use]
    pub const fn man(player: Player) -> Self {
        Self {
            kind: PieceKind::Man,
            player,
        }
    }

    #[must_use]
    pub const fn king(player: Player) -> Self {
        Self {
            kind: PieceKind::King,
            player,
        }
    }

    /// Single-letter symbol, lowercase for men and uppercase for kings.
    #[must_use]
    pub const fn symbol(self) -> char {
        match (self.player, self.kind) {
            (Player::White, PieceKind::Man) => 'w',
            (Player::White, PieceKind::King) => 'W',
            (Player::Black, PieceKind::Man) => 'b',
            (Player::Black, PieceKind::King) => 'B',
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Cell {
    #[default]
    Empty,
    Occupied(Piece),
}

impl Cell {
    #[must_use]
    pub const fn piece(self) -> Option<Piece> {
        match self {
            Self::Empty => None,
            Self::Occupied(piece) => Some(piece),
        }
    }

    #[must_use]
    pub const fn is_empty(self) -> bool {
        matches!(self, Self::Empty)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PositionError {
    #[error("position ({col}, {row}) is off the board")]
    OutOfBounds { col: u8, row: u8 },
}

/// Zero-based board coordinate, `col` and `row` both in `0..8`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "(u8, u8)", into = "(u8, u8)")]
pub struct Position {
    col: u8,
    row: u8,
}

impl Position {
    #[must_use]
    pub const fn new(col: u8, row: u8) -> Option<Self> {
        if col <= LAST_INDEX && row <= LAST_INDEX {
            Some(Self { col, row })
        } else {
            None
        }
    }

    #[must_use]
    pub const fn col(self) -> u8 {
        self.col
    }

    #[must_use]
    pub const fn row(self) -> u8 {
        self.row
    }

    /// Iterates every square, row by row.
    pub fn all() -> impl Iterator<Item = Self> {
        (0..=LAST_INDEX).flat_map(|row| (0..=LAST_INDEX).map(move |col| Self { col, row }))
    }
}

impl TryFrom<(u8, u8)> for Position {
    type Error = PositionError;

    fn try_from((col, row): (u8, u8)) -> Result<Self, Self::Error> {
        Self::new(col, row).ok_or(PositionError::OutOfBounds { col, row })
    }
}

impl From<Position> for (u8, u8) {
    fn from(pos: Position) -> Self {
        (pos.col, pos.row)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.col, self.row)
    }
}

pub type Row = [Cell; BOARD_SIZE];

/// Renderable 8x8 snapshot of a board, indexed `rows[row][col]`.
///
/// A board is a value: every change yields a new board and the old one is
/// left untouched.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct GameBoard {
    rows: [Row; BOARD_SIZE],
}

impl GameBoard {
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            rows: [[Cell::Empty; BOARD_SIZE]; BOARD_SIZE],
        }
    }

    #[must_use]
    pub const fn from_rows(rows: [Row; BOARD_SIZE]) -> Self {
        Self { rows }
    }

    /// Standard opening layout: twelve men per side on the dark squares,
    /// white on rows 0-2 and black on rows 5-7.
    #[must_use]
    pub fn standard() -> Self {
        let mut rows = [[Cell::Empty; BOARD_SIZE]; BOARD_SIZE];
        for (r, row) in rows.iter_mut().enumerate() {
            let owner = match r {
                0..=2 => Player::White,
                5..=7 => Player::Black,
                _ => continue,
            };
            for (c, cell) in row.iter_mut().enumerate() {
                if (r + c) % 2 == 1 {
                    *cell = Cell::Occupied(Piece::man(owner));
                }
            }
        }
        Self { rows }
    }

    #[must_use]
    pub const fn rows(&self) -> &[Row; BOARD_SIZE] {
        &self.rows
    }

    #[must_use]
    pub fn cell_at(&self, pos: Position) -> Cell {
        self.rows
            .get(usize::from(pos.row))
            .and_then(|row| row.get(usize::from(pos.col)))
            .copied()
            .unwrap_or_default()
    }

    #[must_use]
    pub fn with_cell(&self, pos: Position, cell: Cell) -> Self {
        let mut next = self.clone();
        if let Some(slot) = next
            .rows
            .get_mut(usize::from(pos.row))
            .and_then(|row| row.get_mut(usize::from(pos.col)))
        {
            *slot = cell;
        }
        next
    }

    /// Relocates whatever occupies `from` onto `to`, leaving `from` empty.
    /// No rules are checked; engines use this to build resulting boards.
    #[must_use]
    pub fn with_piece_moved(&self, from: Position, to: Position) -> Self {
        let occupant = self.cell_at(from);
        self.with_cell(from, Cell::Empty).with_cell(to, occupant)
    }

    pub fn pieces(&self) -> impl Iterator<Item = (Position, Piece)> + '_ {
        Position::all().filter_map(|pos| self.cell_at(pos).piece().map(|piece| (pos, piece)))
    }

    #[must_use]
    pub fn count(&self, player: Player) -> usize {
        self.pieces().filter(|(_, piece)| piece.player == player).count()
    }
}
