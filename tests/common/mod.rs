#![allow(dead_code)]

use checkers_core::engine::{EngineError, Strategy};
use checkers_core::logic::board::{GameBoard, Player, Position};
use checkers_core::logic::moves::{BoardHandle, Move, ScoredMove};
use checkers_core::worker::EngineBackend;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn p(col: u8, row: u8) -> Position {
    Position::new(col, row).unwrap()
}

/// Engine backend that answers from a script keyed by board contents. Every
/// produced position gets a fresh handle, like a real engine would.
#[derive(Default)]
pub struct ScriptedBackend {
    boards: HashMap<u64, GameBoard>,
    next: u64,
    moves: HashMap<(GameBoard, Position), Vec<Position>>,
    best: HashMap<(GameBoard, Player), (Position, Position, f64)>,
    pub searches: Arc<Mutex<Vec<(Player, Strategy, u8)>>>,
    pub crash_on_search: bool,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_moves(mut self, board: &GameBoard, origin: Position, to: &[Position]) -> Self {
        self.moves.insert((board.clone(), origin), to.to_vec());
        self
    }

    pub fn with_best(
        mut self,
        board: &GameBoard,
        player: Player,
        (from, to): (Position, Position),
        score: f64,
    ) -> Self {
        self.best.insert((board.clone(), player), (from, to, score));
        self
    }

    fn mint(&mut self, board: GameBoard) -> BoardHandle {
        self.next += 1;
        self.boards.insert(self.next, board);
        BoardHandle::from_raw(self.next)
    }

    fn board(&self, handle: &BoardHandle) -> Result<GameBoard, EngineError> {
        self.boards
            .get(&handle.raw())
            .cloned()
            .ok_or_else(|| EngineError::Unavailable(format!("unknown {handle}")))
    }
}

impl EngineBackend for ScriptedBackend {
    fn initialize(&mut self) -> Result<BoardHandle, EngineError> {
        Ok(self.mint(GameBoard::standard()))
    }

    fn snapshot(&mut self, handle: &BoardHandle) -> Result<GameBoard, EngineError> {
        self.board(handle)
    }

    fn moves_from(
        &mut self,
        handle: &BoardHandle,
        origin: Position,
    ) -> Result<Vec<Move>, EngineError> {
        let board = self.board(handle)?;
        let targets = self
            .moves
            .get(&(board.clone(), origin))
            .cloned()
            .unwrap_or_default();
        Ok(targets
            .into_iter()
            .map(|to| {
                let next = self.mint(board.with_piece_moved(origin, to));
                Move::new(origin, to, next)
            })
            .collect())
    }

    fn best_move(
        &mut self,
        handle: &BoardHandle,
        player: Player,
        strategy: Strategy,
        depth: u8,
    ) -> Result<Option<ScoredMove>, EngineError> {
        if self.crash_on_search {
            panic!("search blew the stack");
        }
        self.searches.lock().unwrap().push((player, strategy, depth));

        let board = self.board(handle)?;
        let Some(&(from, to, score)) = self.best.get(&(board.clone(), player)) else {
            return Ok(None);
        };
        let next = self.mint(board.with_piece_moved(from, to));
        Ok(Some(ScoredMove {
            mv: Move::new(from, to, next),
            score,
        }))
    }
}
