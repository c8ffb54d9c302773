//! Presentation adapter: the frame handed to the renderer after every state
//! change, and the events the UI feeds back into the session.

use checkers_core::logic::board::{GameBoard, Player, Position};
use serde::{Deserialize, Serialize};
use std::fmt;

pub mod board;
pub mod controls;

pub use controls::{Button, Controls, SearchTimes};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UiEvent {
    SquareClicked(Position),
    BestMoveRequested(Player),
}

/// Non-fatal message shown alongside a frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    NoLegalMove(Player),
    EngineUnavailable(String),
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoLegalMove(player) => write!(f, "No plays for {player}"),
            Self::EngineUnavailable(reason) => write!(f, "Engine unavailable: {reason}"),
        }
    }
}

/// Immutable snapshot of everything the renderer needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderFrame {
    pub board: GameBoard,
    /// False while the board still shows the position before the last
    /// committed move because its snapshot has not arrived yet.
    pub board_synced: bool,
    pub origin: Option<Position>,
    pub destinations: Vec<Position>,
    pub searching: Option<Player>,
    /// Whether a best-move request would be accepted right now.
    pub can_search: bool,
    pub took: SearchTimes,
    pub notice: Option<Notice>,
}

impl RenderFrame {
    #[must_use]
    pub fn controls(&self) -> Controls {
        Controls::new(self.searching, self.can_search, self.took)
    }

    #[must_use]
    pub fn is_destination(&self, pos: Position) -> bool {
        self.destinations.contains(&pos)
    }
}

/// Render hook, called synchronously after each state change.
pub trait Presenter: Send + Sync {
    fn render(&self, frame: RenderFrame);
}

impl<F> Presenter for F
where
    F: Fn(RenderFrame) + Send + Sync,
{
    fn render(&self, frame: RenderFrame) {
        self(frame);
    }
}
