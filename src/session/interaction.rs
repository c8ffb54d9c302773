use checkers_core::logic::board::{Player, Position};
use checkers_core::logic::moves::Move;

/// What the session is waiting for. Exactly one state is current.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum InteractionState {
    #[default]
    Idle,
    /// Idle, with a `moves_from` request for `origin` in flight.
    SelectionPending { origin: Position },
    /// Every candidate starts at `origin`.
    SelectionActive {
        origin: Position,
        candidate_moves: Vec<Move>,
    },
    SearchPending { player: Player },
}

impl InteractionState {
    #[must_use]
    pub const fn origin(&self) -> Option<Position> {
        match self {
            Self::SelectionPending { origin } | Self::SelectionActive { origin, .. } => {
                Some(*origin)
            }
            Self::Idle | Self::SearchPending { .. } => None,
        }
    }

    #[must_use]
    pub fn destinations(&self) -> Vec<Position> {
        match self {
            Self::SelectionActive {
                candidate_moves, ..
            } => candidate_moves.iter().map(Move::to).collect(),
            _ => Vec::new(),
        }
    }

    #[must_use]
    pub const fn searching(&self) -> Option<Player> {
        match self {
            Self::SearchPending { player } => Some(*player),
            _ => None,
        }
    }

    /// Candidate landing on `to`, if a selection is active.
    #[must_use]
    pub fn candidate_to(&self, to: Position) -> Option<&Move> {
        match self {
            Self::SelectionActive {
                candidate_moves, ..
            } => candidate_moves.iter().find(|mv| mv.to() == to),
            _ => None,
        }
    }

    /// A search may only start from `Idle`; a pending selection counts as idle
    /// and is superseded.
    #[must_use]
    pub const fn accepts_search(&self) -> bool {
        matches!(self, Self::Idle | Self::SelectionPending { .. })
    }
}
