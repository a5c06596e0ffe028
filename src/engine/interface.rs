use std::sync::mpsc::Sender;

use crate::table::ActionKind;
use crate::types::Record;

/// Handle to the backend engine held by the UI layer.
///
/// Cheaply cloneable. When the last handle is dropped the sender channel
/// closes, signalling the engine to shut down.
#[derive(Clone)]
pub struct EngineHandle {
    tx: tokio::sync::mpsc::UnboundedSender<Request>,
}

impl EngineHandle {
    pub(super) fn new(tx: tokio::sync::mpsc::UnboundedSender<Request>) -> Self {
        Self { tx }
    }

    /// Send a request to the engine. Non-blocking; returns immediately.
    pub fn send(&self, req: Request) {
        // Ignore errors: if the receiver is gone the engine has already shut down.
        let _ = self.tx.send(req);
    }
}

/// Trait implemented by both `SnapshotEngine` and `StubEngine`.
pub trait Engine: Send + 'static {
    fn start(self) -> EngineHandle;
}

/// All operations the UI layer can send to the engine.
pub enum Request {
    /// Fetch the complete record list for a group scope (empty = root).
    FetchRecords {
        group: String,
        reply_tx: Sender<Event>,
    },
    /// Mutations address a workflow by its definition file.
    StartWorkflow {
        file: String,
        reply_tx: Sender<Event>,
    },
    StopWorkflow {
        file: String,
        reply_tx: Sender<Event>,
    },
    RetryWorkflow {
        file: String,
        request_id: String,
        reply_tx: Sender<Event>,
    },
    Shutdown,
}

impl Request {
    /// Build the mutation request for a row action.
    pub fn for_action(
        kind: ActionKind,
        file: String,
        request_id: String,
        reply_tx: Sender<Event>,
    ) -> Self {
        match kind {
            ActionKind::Start => Self::StartWorkflow { file, reply_tx },
            ActionKind::Stop => Self::StopWorkflow { file, reply_tx },
            ActionKind::Retry => Self::RetryWorkflow {
                file,
                request_id,
                reply_tx,
            },
        }
    }
}

/// All events the engine can push back to the view.
pub enum Event {
    RecordsFetched {
        group: String,
        records: Vec<Record>,
    },
    FetchError {
        context: String,
        message: String,
    },
    MutationOk {
        description: String,
    },
    MutationError {
        description: String,
        message: String,
    },
}
