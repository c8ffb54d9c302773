use crate::engine::{EngineError, MoveEngine, Strategy};
use crate::logic::board::{GameBoard, Player, Position};
use crate::logic::moves::{BoardHandle, Move, ScoredMove};
use async_trait::async_trait;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};

pub type RequestId = u64;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Input {
    Initialize,
    Snapshot(BoardHandle),
    MovesFrom(BoardHandle, Position),
    BestMove {
        handle: BoardHandle,
        player: Player,
        strategy: Strategy,
        depth: u8,
    },
}

impl Input {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Initialize => "initialize",
            Self::Snapshot(_) => "snapshot",
            Self::MovesFrom(..) => "moves_from",
            Self::BestMove { .. } => "best_move",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Output {
    Initialized(BoardHandle),
    Board(GameBoard),
    Moves(Vec<Move>),
    BestMove(Option<ScoredMove>),
    Failed(EngineError),
}

impl Output {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Initialized(_) => "initialized",
            Self::Board(_) => "board",
            Self::Moves(_) => "moves",
            Self::BestMove(_) => "best_move",
            Self::Failed(_) => "failed",
        }
    }
}

/// One frame on the wire. Replies carry the id of the request they answer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub id: RequestId,
    pub body: T,
}

#[derive(Deserialize)]
struct Header {
    id: RequestId,
}

/// Engine side of the boundary, implemented by the engine itself.
///
/// Requests are handled one at a time in arrival order. Every method
/// reports failure as an [`EngineError`], which is sent back to the caller.
#[allow(clippy::missing_errors_doc)]
pub trait EngineBackend: Send + 'static {
    fn initialize(&mut self) -> Result<BoardHandle, EngineError>;

    fn snapshot(&mut self, handle: &BoardHandle) -> Result<GameBoard, EngineError>;

    fn moves_from(
        &mut self,
        handle: &BoardHandle,
        origin: Position,
    ) -> Result<Vec<Move>, EngineError>;

    fn best_move(
        &mut self,
        handle: &BoardHandle,
        player: Player,
        strategy: Strategy,
        depth: u8,
    ) -> Result<Option<ScoredMove>, EngineError>;
}

pub struct EngineWorker<B> {
    backend: B,
}

impl<B: EngineBackend> EngineWorker<B> {
    #[must_use]
    pub const fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn received(&mut self, msg: Input) -> Output {
        let result = match msg {
            Input::Initialize => self.backend.initialize().map(Output::Initialized),
            Input::Snapshot(handle) => self.backend.snapshot(&handle).map(Output::Board),
            Input::MovesFrom(handle, origin) => {
                self.backend.moves_from(&handle, origin).map(Output::Moves)
            }
            Input::BestMove {
                handle,
                player,
                strategy,
                depth,
            } => self
                .backend
                .best_move(&handle, player, strategy, depth)
                .map(Output::BestMove),
        };
        result.unwrap_or_else(Output::Failed)
    }

    /// Decodes a request frame and encodes the reply. A frame whose id cannot
    /// be read gets no reply.
    pub fn handle_frame(&mut self, frame: &str) -> Option<String> {
        let (id, body) = match serde_json::from_str::<Envelope<Input>>(frame) {
            Ok(Envelope { id, body }) => {
                tracing::debug!(id, request = body.name(), "Worker received request");
                (id, self.received(body))
            }
            Err(err) => {
                let Ok(Header { id }) = serde_json::from_str::<Header>(frame) else {
                    tracing::warn!(error = %err, "Dropping unreadable request frame");
                    return None;
                };
                let reason = format!("malformed request: {err}");
                (id, Output::Failed(EngineError::Unavailable(reason)))
            }
        };

        match serde_json::to_string(&Envelope { id, body }) {
            Ok(json) => Some(json),
            Err(err) => {
                tracing::warn!(id, error = %err, "Failed to encode reply");
                let failed = Output::Failed(EngineError::Unavailable(err.to_string()));
                serde_json::to_string(&Envelope { id, body: failed }).ok()
            }
        }
    }
}

type Pending = Arc<DashMap<RequestId, oneshot::Sender<Output>>>;

const LATE_REPLY_GRACE: Duration = Duration::from_millis(100);

/// Starts `backend` on a dedicated worker thread and returns the caller side
/// of the boundary.
///
/// # Errors
///
/// [`EngineError::Unavailable`] when called outside a tokio runtime or when
/// the worker thread cannot be started.
pub fn spawn_worker<B: EngineBackend>(backend: B) -> Result<WorkerBridge, EngineError> {
    let runtime = tokio::runtime::Handle::try_current()
        .map_err(|err| EngineError::Unavailable(format!("no async runtime: {err}")))?;

    let (request_tx, mut request_rx) = mpsc::unbounded_channel::<String>();
    let (reply_tx, reply_rx) = mpsc::unbounded_channel::<String>();
    let mut worker = EngineWorker::new(backend);

    thread::Builder::new()
        .name("engine-worker".to_string())
        .spawn(move || {
            while let Some(frame) = request_rx.blocking_recv() {
                let Some(reply) = worker.handle_frame(&frame) else {
                    continue;
                };
                if reply_tx.send(reply).is_err() {
                    break;
                }
            }
            tracing::debug!("Engine worker stopped");
        })
        .map_err(|err| EngineError::Unavailable(format!("failed to start engine worker: {err}")))?;

    let pending: Pending = Arc::new(DashMap::new());
    runtime.spawn(route_replies(reply_rx, Arc::clone(&pending)));

    tracing::info!("Engine worker started");
    Ok(WorkerBridge {
        inner: Arc::new(BridgeInner {
            requests: request_tx,
            pending,
            next_id: AtomicU64::new(1),
        }),
    })
}

async fn route_replies(mut replies: mpsc::UnboundedReceiver<String>, pending: Pending) {
    while let Some(frame) = replies.recv().await {
        let (id, body) = match serde_json::from_str::<Envelope<Output>>(&frame) {
            Ok(Envelope { id, body }) => (id, body),
            Err(err) => {
                let Ok(Header { id }) = serde_json::from_str::<Header>(&frame) else {
                    tracing::warn!(error = %err, "Dropping unreadable engine reply");
                    continue;
                };
                let reason = format!("malformed reply: {err}");
                (id, Output::Failed(EngineError::Unavailable(reason)))
            }
        };

        let Some((_, waiter)) = pending.remove(&id) else {
            tracing::warn!(id, "Reply for unknown engine request");
            continue;
        };
        // The caller may have given up waiting
        let _ = waiter.send(body);
    }

    // Worker is gone; wake everyone still waiting.
    pending.clear();
}

struct BridgeInner {
    requests: mpsc::UnboundedSender<String>,
    pending: Pending,
    next_id: AtomicU64,
}

/// Caller side of the engine boundary. Cheap to clone; all clones share one
/// worker, which stops once every clone is dropped.
#[derive(Clone)]
pub struct WorkerBridge {
    inner: Arc<BridgeInner>,
}

impl WorkerBridge {
    /// Requests sent and not yet answered.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.inner.pending.len()
    }

    async fn call(&self, body: Input) -> Result<Output, EngineError> {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        let request = body.name();
        let frame = serde_json::to_string(&Envelope { id, body }).map_err(|err| {
            EngineError::Unavailable(format!("failed to encode {request}: {err}"))
        })?;

        let (waiter, mut reply) = oneshot::channel();
        self.inner.pending.insert(id, waiter);
        if self.inner.requests.send(frame).is_err() {
            self.inner.pending.remove(&id);
            return Err(EngineError::Disconnected);
        }
        tracing::debug!(id, request, "Sent engine request");

        let output = tokio::select! {
            biased;
            reply = &mut reply => reply.map_err(|_| EngineError::Disconnected),
            () = self.inner.requests.closed() => {
                // The router may still hold a reply sent before the worker stopped
                let late = tokio::time::timeout(LATE_REPLY_GRACE, &mut reply).await;
                self.inner.pending.remove(&id);
                match late {
                    Ok(Ok(output)) => Ok(output),
                    _ => Err(EngineError::Disconnected),
                }
            }
        }?;

        match output {
            Output::Failed(err) => {
                tracing::debug!(id, request, error = %err, "Engine request failed");
                Err(err)
            }
            output => Ok(output),
        }
    }
}

fn unexpected(request: &str, output: &Output) -> EngineError {
    tracing::warn!(request, reply = output.name(), "Mismatched engine reply");
    EngineError::UnexpectedResponse {
        request: request.to_string(),
    }
}

#[async_trait]
impl MoveEngine for WorkerBridge {
    async fn initialize(&self) -> Result<BoardHandle, EngineError> {
        match self.call(Input::Initialize).await? {
            Output::Initialized(handle) => Ok(handle),
            other => Err(unexpected("initialize", &other)),
        }
    }

    async fn snapshot(&self, handle: &BoardHandle) -> Result<GameBoard, EngineError> {
        match self.call(Input::Snapshot(handle.clone())).await? {
            Output::Board(board) => Ok(board),
            other => Err(unexpected("snapshot", &other)),
        }
    }

    async fn moves_from(
        &self,
        handle: &BoardHandle,
        origin: Position,
    ) -> Result<Vec<Move>, EngineError> {
        match self.call(Input::MovesFrom(handle.clone(), origin)).await? {
            Output::Moves(moves) => Ok(moves),
            other => Err(unexpected("moves_from", &other)),
        }
    }

    async fn best_move(
        &self,
        handle: &BoardHandle,
        player: Player,
        strategy: Strategy,
        depth: u8,
    ) -> Result<Option<ScoredMove>, EngineError> {
        let input = Input::BestMove {
            handle: handle.clone(),
            player,
            strategy,
            depth,
        };
        match self.call(input).await? {
            Output::BestMove(found) => Ok(found),
            other => Err(unexpected("best_move", &other)),
        }
    }
}
