use crate::logic::board::Position;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque reference to a board owned by the engine.
///
/// Only the engine mints handles. A handle is trusted by identity as it was
/// returned; callers never derive one from board contents.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BoardHandle(u64);

impl BoardHandle {
    #[must_use]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn raw(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for BoardHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "board#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Move {
    from: Position,
    to: Position,
    resulting_handle: BoardHandle,
}

impl Move {
    #[must_use]
    pub const fn new(from: Position, to: Position, resulting_handle: BoardHandle) -> Self {
        Self {
            from,
            to,
            resulting_handle,
        }
    }

    #[must_use]
    pub const fn from(&self) -> Position {
        self.from
    }

    #[must_use]
    pub const fn to(&self) -> Position {
        self.to
    }

    #[must_use]
    pub const fn resulting_handle(&self) -> &BoardHandle {
        &self.resulting_handle
    }

    /// Consumes the move, handing over ownership of the board it leads to.
    #[must_use]
    pub const fn into_resulting_handle(self) -> BoardHandle {
        self.resulting_handle
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.from, self.to)
    }
}

/// Search result. The meaning of `score` is up to the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredMove {
    pub mv: Move,
    pub score: f64,
}
