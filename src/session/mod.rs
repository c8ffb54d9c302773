//! The game session orchestrator.
//!
//! A [`Session`] is the only writer of the current board handle, the board
//! snapshot rendered from it and the interaction state. Engine calls are its
//! only suspension points; other events may arrive while one is outstanding,
//! so every response is checked against the commit generation and selection
//! ticket it was issued under before it is applied.

use crate::config::SessionConfig;
use crate::ui::{Notice, Presenter, RenderFrame, SearchTimes, UiEvent};
use checkers_core::engine::{EngineError, MoveEngine};
use checkers_core::logic::board::{GameBoard, Player, Position};
use checkers_core::logic::moves::{BoardHandle, Move, ScoredMove};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

mod interaction;


pub use interaction::InteractionState;

/// Result of one UI event.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The event is not valid in the current interaction state.
    Ignored,
    Selected { origin: Position, candidates: usize },
    /// The selection was cleared; nothing was committed.
    Deselected,
    Committed {
        from: Position,
        to: Position,
        score: Option<f64>,
    },
    NoLegalMove(Player),
    /// The response was computed for a superseded board or selection and was
    /// dropped.
    Stale,
}

enum ClickPlan {
    Ignore,
    Deselect,
    Commit(Move),
    Select,
}

fn plan_click(interaction: &InteractionState, pos: Position) -> ClickPlan {
    match interaction {
        InteractionState::SearchPending { .. } => ClickPlan::Ignore,
        InteractionState::SelectionPending { origin } if *origin == pos => ClickPlan::Ignore,
        InteractionState::SelectionActive { origin, .. } if *origin == pos => ClickPlan::Deselect,
        active @ InteractionState::SelectionActive { .. } => active
            .candidate_to(pos)
            .cloned()
            .map_or(ClickPlan::Select, ClickPlan::Commit),
        InteractionState::Idle | InteractionState::SelectionPending { .. } => ClickPlan::Select,
    }
}

struct SessionState {
    handle: BoardHandle,
    board: GameBoard,
    /// Whether `board` was read from `handle`.
    board_synced: bool,
    /// Bumped on every handle swap.
    generation: u64,
    /// Bumped on every selection request; only the latest may resolve.
    selection_ticket: u64,
    interaction: InteractionState,
    took: SearchTimes,
    last_score: Option<f64>,
    stale_responses: u64,
}

impl SessionState {
    fn new(handle: BoardHandle, board: GameBoard) -> Self {
        Self {
            handle,
            board,
            board_synced: true,
            generation: 0,
            selection_ticket: 0,
            interaction: InteractionState::Idle,
            took: SearchTimes::default(),
            last_score: None,
            stale_responses: 0,
        }
    }

    fn frame(&self, notice: Option<Notice>) -> RenderFrame {
        RenderFrame {
            board: self.board.clone(),
            board_synced: self.board_synced,
            origin: self.interaction.origin(),
            destinations: self.interaction.destinations(),
            searching: self.interaction.searching(),
            can_search: self.interaction.accepts_search(),
            took: self.took,
            notice,
        }
    }

    /// Hands the session over to the board `mv` leads to. The interaction
    /// drops to `Idle` in the same step, so nothing can act on a selection
    /// made against the outgoing board.
    fn swap_handle(&mut self, mv: Move) -> (BoardHandle, u64) {
        self.handle = mv.into_resulting_handle();
        self.generation += 1;
        self.board_synced = false;
        self.interaction = InteractionState::Idle;
        (self.handle.clone(), self.generation)
    }

    fn drop_stale(&mut self, request: &'static str) -> Outcome {
        self.stale_responses += 1;
        tracing::debug!(
            request,
            generation = self.generation,
            total = self.stale_responses,
            "Dropped stale engine response"
        );
        Outcome::Stale
    }
}

pub struct Session<E, P> {
    engine: E,
    presenter: P,
    config: SessionConfig,
    state: Mutex<SessionState>,
}

impl<E: MoveEngine, P: Presenter> Session<E, P> {
    /// Requests the starting position and renders it.
    ///
    /// # Errors
    ///
    /// Any [`EngineError`] from `initialize` or the first `snapshot`; the
    /// session does not start without a board.
    pub async fn start(engine: E, presenter: P, config: SessionConfig) -> Result<Self, EngineError> {
        let handle = engine.initialize().await?;
        let board = engine.snapshot(&handle).await?;
        tracing::info!(
            %handle,
            strategy = %config.strategy,
            depth = config.depth,
            "Session started"
        );

        let session = Self {
            engine,
            presenter,
            config,
            state: Mutex::new(SessionState::new(handle, board)),
        };
        session.render(None);
        Ok(session)
    }

    fn state(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn render(&self, notice: Option<Notice>) {
        let frame = self.state().frame(notice);
        self.presenter.render(frame);
    }

    #[must_use]
    pub const fn config(&self) -> &SessionConfig {
        &self.config
    }

    #[must_use]
    pub const fn engine(&self) -> &E {
        &self.engine
    }

    #[must_use]
    pub fn handle(&self) -> BoardHandle {
        self.state().handle.clone()
    }

    /// Last board read from the engine. See [`Session::is_board_synced`].
    #[must_use]
    pub fn board(&self) -> GameBoard {
        self.state().board.clone()
    }

    #[must_use]
    pub fn is_board_synced(&self) -> bool {
        self.state().board_synced
    }

    #[must_use]
    pub fn interaction(&self) -> InteractionState {
        self.state().interaction.clone()
    }

    /// Number of committed moves so far.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.state().generation
    }

    #[must_use]
    pub fn stale_responses(&self) -> u64 {
        self.state().stale_responses
    }

    #[must_use]
    pub fn last_search_time(&self, player: Player) -> Option<Duration> {
        self.state().took.get(player)
    }

    #[must_use]
    pub fn last_score(&self) -> Option<f64> {
        self.state().last_score
    }

    /// Current frame, as last handed to the presenter minus any notice.
    #[must_use]
    pub fn frame(&self) -> RenderFrame {
        self.state().frame(None)
    }

    /// Routes a UI event to [`Session::on_square_clicked`] or
    /// [`Session::request_best_move`].
    ///
    /// # Errors
    ///
    /// The engine failure that ended the operation, as for the target method.
    pub async fn dispatch(&self, event: UiEvent) -> Result<Outcome, EngineError> {
        match event {
            UiEvent::SquareClicked(pos) => self.on_square_clicked(pos).await,
            UiEvent::BestMoveRequested(player) => self.request_best_move(player).await,
        }
    }

    /// Commits a candidate move, toggles the selection off, or starts a new
    /// selection at `pos`. Ignored while a search is pending, and while the
    /// board on screen is older than the current handle.
    ///
    /// # Errors
    ///
    /// The [`EngineError`] from `moves_from`. The interaction is back to
    /// `Idle` and a notice has been rendered.
    pub async fn on_square_clicked(&self, pos: Position) -> Result<Outcome, EngineError> {
        self.resync_quietly().await;

        let (handle, generation, ticket) = {
            let mut st = self.state();
            if !st.board_synced {
                tracing::debug!(square = %pos, handle = %st.handle, "Click ignored, board out of date");
                return Ok(Outcome::Ignored);
            }
            match plan_click(&st.interaction, pos) {
                ClickPlan::Ignore => {
                    tracing::debug!(square = %pos, interaction = ?st.interaction, "Click ignored");
                    return Ok(Outcome::Ignored);
                }
                ClickPlan::Deselect => {
                    st.interaction = InteractionState::Idle;
                    let frame = st.frame(None);
                    drop(st);
                    tracing::debug!(square = %pos, "Selection cleared");
                    self.presenter.render(frame);
                    return Ok(Outcome::Deselected);
                }
                ClickPlan::Commit(mv) => {
                    let (from, to) = (mv.from(), mv.to());
                    let (handle, generation) = st.swap_handle(mv);
                    drop(st);
                    tracing::info!(%from, %to, %handle, generation, "Move committed");
                    self.finish_commit(&handle, generation).await;
                    return Ok(Outcome::Committed {
                        from,
                        to,
                        score: None,
                    });
                }
                ClickPlan::Select => {
                    st.selection_ticket += 1;
                    st.interaction = InteractionState::SelectionPending { origin: pos };
                    (st.handle.clone(), st.generation, st.selection_ticket)
                }
            }
        };

        tracing::debug!(origin = %pos, %handle, ticket, "Requesting moves");
        let result = self.engine.moves_from(&handle, pos).await;

        let mut st = self.state();
        let still_current = st.generation == generation
            && st.selection_ticket == ticket
            && st.interaction == InteractionState::SelectionPending { origin: pos };
        if !still_current {
            return Ok(st.drop_stale("moves_from"));
        }

        match result {
            Ok(moves) => {
                let (candidate_moves, foreign): (Vec<Move>, Vec<Move>) =
                    moves.into_iter().partition(|mv| mv.from() == pos);
                if !foreign.is_empty() {
                    tracing::warn!(
                        origin = %pos,
                        count = foreign.len(),
                        "Discarded moves that start elsewhere"
                    );
                }

                let outcome = if candidate_moves.is_empty() {
                    st.interaction = InteractionState::Idle;
                    Outcome::Deselected
                } else {
                    let candidates = candidate_moves.len();
                    st.interaction = InteractionState::SelectionActive {
                        origin: pos,
                        candidate_moves,
                    };
                    Outcome::Selected {
                        origin: pos,
                        candidates,
                    }
                };
                let frame = st.frame(None);
                drop(st);
                self.presenter.render(frame);
                Ok(outcome)
            }
            Err(err) => {
                st.interaction = InteractionState::Idle;
                let frame = st.frame(Some(Notice::EngineUnavailable(err.to_string())));
                drop(st);
                tracing::warn!(origin = %pos, error = %err, "Move enumeration failed");
                self.presenter.render(frame);
                Err(err)
            }
        }
    }

    /// Asks the engine to play for `player`. Only one search runs at a time;
    /// requests made while one is pending, or while a selection is active,
    /// are ignored.
    ///
    /// # Errors
    ///
    /// The [`EngineError`] from `best_move`. The interaction is back to
    /// `Idle`, the current board is kept and a notice has been rendered.
    pub async fn request_best_move(&self, player: Player) -> Result<Outcome, EngineError> {
        self.resync_quietly().await;

        let (handle, generation, frame) = {
            let mut st = self.state();
            if !st.interaction.accepts_search() {
                tracing::debug!(%player, interaction = ?st.interaction, "Best move request ignored");
                return Ok(Outcome::Ignored);
            }
            st.interaction = InteractionState::SearchPending { player };
            (st.handle.clone(), st.generation, st.frame(None))
        };
        self.presenter.render(frame);

        let (strategy, depth) = (self.config.strategy, self.config.depth);
        tracing::debug!(%player, %strategy, depth, %handle, "Searching for best move");
        let started = Instant::now();
        let result = self.engine.best_move(&handle, player, strategy, depth).await;
        let took = started.elapsed();

        let mut st = self.state();
        if st.generation != generation
            || st.interaction != (InteractionState::SearchPending { player })
        {
            return Ok(st.drop_stale("best_move"));
        }
        st.took.record(player, took);

        let ScoredMove { mv, score } = match result {
            Ok(Some(scored)) => scored,
            Ok(None) => {
                st.interaction = InteractionState::Idle;
                let frame = st.frame(Some(Notice::NoLegalMove(player)));
                drop(st);
                tracing::info!(%player, ?took, "No legal move");
                self.presenter.render(frame);
                return Ok(Outcome::NoLegalMove(player));
            }
            Err(err) => {
                st.interaction = InteractionState::Idle;
                let frame = st.frame(Some(Notice::EngineUnavailable(err.to_string())));
                drop(st);
                tracing::warn!(%player, error = %err, "Best move search failed");
                self.presenter.render(frame);
                return Err(err);
            }
        };

        let (from, to) = (mv.from(), mv.to());
        st.last_score = Some(score);
        let (handle, generation) = st.swap_handle(mv);
        drop(st);
        tracing::info!(
            %player,
            %from,
            %to,
            score,
            ?took,
            %handle,
            generation,
            "Best move committed"
        );
        self.finish_commit(&handle, generation).await;
        Ok(Outcome::Committed {
            from,
            to,
            score: Some(score),
        })
    }

    /// Retries reading the board behind the current handle after a failed
    /// snapshot. Does nothing when the board is already in sync.
    ///
    /// # Errors
    ///
    /// The [`EngineError`] from `snapshot`; the board stays out of date.
    pub async fn resync(&self) -> Result<(), EngineError> {
        let (handle, generation) = {
            let st = self.state();
            if st.board_synced {
                return Ok(());
            }
            (st.handle.clone(), st.generation)
        };
        tracing::debug!(%handle, generation, "Resyncing board");
        self.sync_board(&handle, generation).await
    }

    async fn resync_quietly(&self) {
        if let Err(err) = self.resync().await {
            tracing::debug!(error = %err, "Resync failed, keeping last board");
        }
    }

    // The handle is already committed; a failed snapshot only defers the
    // render.
    async fn finish_commit(&self, handle: &BoardHandle, generation: u64) {
        if let Err(err) = self.sync_board(handle, generation).await {
            tracing::warn!(%handle, error = %err, "Board snapshot failed, render deferred");
        }
    }

    async fn sync_board(&self, handle: &BoardHandle, generation: u64) -> Result<(), EngineError> {
        let result = self.engine.snapshot(handle).await;

        let mut st = self.state();
        if st.generation != generation {
            st.drop_stale("snapshot");
            return Ok(());
        }

        match result {
            Ok(board) => {
                st.board = board;
                st.board_synced = true;
                let frame = st.frame(None);
                drop(st);
                self.presenter.render(frame);
                Ok(())
            }
            Err(err) => {
                let frame = st.frame(Some(Notice::EngineUnavailable(err.to_string())));
                drop(st);
                self.presenter.render(frame);
                Err(err)
            }
        }
    }
}
