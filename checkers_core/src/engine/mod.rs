use crate::logic::board::{GameBoard, Player, Position};
use crate::logic::moves::{BoardHandle, Move, ScoredMove};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub mod strategy;

pub use strategy::Strategy;

/// Failure of a single engine call. Every variant counts as the engine being
/// unavailable for that request; the caller decides what to roll back.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize, Deserialize)]
pub enum EngineError {
    #[error("engine unavailable: {0}")]
    Unavailable(String),
    #[error("engine worker disconnected")]
    Disconnected,
    #[error("unexpected engine response to {request}")]
    UnexpectedResponse { request: String },
}

/// Asynchronous contract with the move engine.
///
/// Every call is keyed by a handle the engine previously returned. The engine
/// owns board representation, move legality and search.
#[async_trait]
pub trait MoveEngine: Send + Sync {
    /// Produces the starting position. Called once per session.
    ///
    /// # Errors
    ///
    /// Any [`EngineError`]; the session cannot start without a board.
    async fn initialize(&self) -> Result<BoardHandle, EngineError>;

    /// Pure read of the board behind `handle`.
    ///
    /// # Errors
    ///
    /// [`EngineError::Unavailable`] for a handle the engine does not know.
    async fn snapshot(&self, handle: &BoardHandle) -> Result<GameBoard, EngineError>;

    /// Legal moves from `origin`, empty when there are none.
    ///
    /// # Errors
    ///
    /// Any [`EngineError`]. An empty square is not an error.
    async fn moves_from(
        &self,
        handle: &BoardHandle,
        origin: Position,
    ) -> Result<Vec<Move>, EngineError>;

    /// Bounded search for `player`. `None` means the player has no legal move.
    ///
    /// # Errors
    ///
    /// Any [`EngineError`]. Having no legal move is not an error.
    async fn best_move(
        &self,
        handle: &BoardHandle,
        player: Player,
        strategy: Strategy,
        depth: u8,
    ) -> Result<Option<ScoredMove>, EngineError>;
}

#[async_trait]
impl<E: MoveEngine + ?Sized> MoveEngine for Arc<E> {
    async fn initialize(&self) -> Result<BoardHandle, EngineError> {
        (**self).initialize().await
    }

    async fn snapshot(&self, handle: &BoardHandle) -> Result<GameBoard, EngineError> {
        (**self).snapshot(handle).await
    }

    async fn moves_from(
        &self,
        handle: &BoardHandle,
        origin: Position,
    ) -> Result<Vec<Move>, EngineError> {
        (**self).moves_from(handle, origin).await
    }

    async fn best_move(
        &self,
        handle: &BoardHandle,
        player: Player,
        strategy: Strategy,
        depth: u8,
    ) -> Result<Option<ScoredMove>, EngineError> {
        (**self).best_move(handle, player, strategy, depth).await
    }
}
