use tokio::sync::mpsc::UnboundedReceiver;

use crate::types::Record;

use super::interface::{Engine, EngineHandle, Event, Request};

/// A stub engine that serves pre-loaded records without touching the filesystem.
///
/// Useful for integration tests and UI demos.
pub struct StubEngine {
    pub records: Vec<Record>,
}

impl Engine for StubEngine {
    fn start(self) -> EngineHandle {
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel::<Request>();
        std::thread::spawn(move || {
            let rt = tokio::runtime::Runtime::new().expect("stub tokio runtime");
            rt.block_on(self.run_loop(rx));
        });
        EngineHandle::new(tx)
    }
}

impl StubEngine {
    async fn run_loop(self, mut rx: UnboundedReceiver<Request>) {
        while let Some(req) = rx.recv().await {
            match req {
                Request::FetchRecords { group, reply_tx } => {
                    let _ = reply_tx.send(Event::RecordsFetched {
                        group,
                        records: self.records.clone(),
                    });
                }

                // All mutations succeed instantly
                Request::StartWorkflow { reply_tx, .. }
                | Request::StopWorkflow { reply_tx, .. }
                | Request::RetryWorkflow { reply_tx, .. } => {
                    let _ = reply_tx.send(Event::MutationOk {
                        description: "stub ok".into(),
                    });
                }

                Request::Shutdown => break,
            }
        }
    }
}
