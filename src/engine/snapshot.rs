use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;

use chrono::NaiveDateTime;
use indexmap::IndexSet;
use serde::Deserialize;
use thiserror::Error;
use tokio::sync::mpsc::UnboundedReceiver;

use crate::table::ActionKind;
use crate::types::{Record, StatusCode, Workflow, WorkflowStatus};

use super::interface::{Engine, EngineHandle, Event, Request};

/// Format of the `started_at` / `finished_at` strings. Zero-padded so that
/// string order matches time order.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parsing snapshot: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("unknown workflow \"{0}\"")]
    UnknownWorkflow(String),
    #[error("workflow \"{0}\" is already running")]
    AlreadyRunning(String),
    #[error("workflow \"{0}\" is not running")]
    NotRunning(String),
    #[error("workflow \"{0}\" has no previous run to retry")]
    NothingToRetry(String),
}

/// On-disk snapshot: every known workflow, each tagged with its group.
#[derive(Debug, Default, Deserialize)]
struct SnapshotFile {
    #[serde(default)]
    workflows: Vec<Workflow>,
}

pub fn parse_snapshot(json: &str) -> Result<Vec<Workflow>, SnapshotError> {
    let file: SnapshotFile = serde_json::from_str(json)?;
    Ok(file.workflows)
}

pub fn read_snapshot(path: &Path) -> Result<Vec<Workflow>, SnapshotError> {
    let json = std::fs::read_to_string(path).map_err(|source| SnapshotError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_snapshot(&json)
}

/// The records listed under `group`.
///
/// At the root (empty group): one `Group` per distinct group, in order of
/// first appearance, then the ungrouped workflows. Inside a group: that
/// group's workflows.
pub fn records_for_group(workflows: &[Workflow], group: &str) -> Vec<Record> {
    if !group.is_empty() {
        return workflows
            .iter()
            .filter(|w| w.config.group == group)
            .cloned()
            .map(Record::Workflow)
            .collect();
    }

    let groups: IndexSet<&str> = workflows
        .iter()
        .map(|w| w.config.group.as_str())
        .filter(|g| !g.is_empty())
        .collect();
    groups
        .into_iter()
        .map(Record::group)
        .chain(
            workflows
                .iter()
                .filter(|w| w.config.group.is_empty())
                .cloned()
                .map(Record::Workflow),
        )
        .collect()
}

fn workflow_name(workflow: &Workflow) -> &str {
    if workflow.config.name.is_empty() {
        workflow.file_stem()
    } else {
        &workflow.config.name
    }
}

// ---------------------------------------------------------------------------
// Status overlay
// ---------------------------------------------------------------------------

/// Run statuses changed by mutations since the engine started, keyed by
/// definition file. Applied on top of every snapshot read.
#[derive(Debug, Default)]
pub struct StatusOverlay {
    statuses: HashMap<String, WorkflowStatus>,
}

impl StatusOverlay {
    pub fn apply_to(&self, workflows: &mut [Workflow]) {
        for workflow in workflows {
            if let Some(status) = self.statuses.get(&workflow.file) {
                workflow.status = Some(status.clone());
            }
        }
    }

    /// Run `kind` against the workflow defined in `file`. Returns a
    /// description of what happened.
    pub fn mutate(
        &mut self,
        workflows: &[Workflow],
        kind: ActionKind,
        file: &str,
        request_id: &str,
        now: NaiveDateTime,
    ) -> Result<String, SnapshotError> {
        let mut workflow = workflows
            .iter()
            .find(|w| w.file == file)
            .cloned()
            .ok_or_else(|| SnapshotError::UnknownWorkflow(file.to_owned()))?;
        self.apply_to(std::slice::from_mut(&mut workflow));
        let name = workflow_name(&workflow).to_owned();

        let current = workflow.status.clone().unwrap_or_default();
        let stamp = now.format(TIMESTAMP_FORMAT).to_string();
        let next = match kind {
            ActionKind::Start => {
                if workflow.is_running() {
                    return Err(SnapshotError::AlreadyRunning(name));
                }
                WorkflowStatus {
                    code: StatusCode::Running,
                    status_text: StatusCode::Running.label().to_owned(),
                    started_at: stamp,
                    finished_at: String::new(),
                    request_id: format!("req-{}", now.format("%Y%m%d%H%M%S%3f")),
                }
            }
            ActionKind::Stop => {
                if !workflow.is_running() {
                    return Err(SnapshotError::NotRunning(name));
                }
                WorkflowStatus {
                    code: StatusCode::Cancelled,
                    status_text: StatusCode::Cancelled.label().to_owned(),
                    finished_at: stamp,
                    ..current
                }
            }
            ActionKind::Retry => {
                if workflow.is_running() {
                    return Err(SnapshotError::AlreadyRunning(name));
                }
                if current.request_id.is_empty()
                    || (!request_id.is_empty() && request_id != current.request_id)
                {
                    return Err(SnapshotError::NothingToRetry(name));
                }
                WorkflowStatus {
                    code: StatusCode::Running,
                    status_text: StatusCode::Running.label().to_owned(),
                    started_at: stamp,
                    finished_at: String::new(),
                    request_id: current.request_id,
                }
            }
        };

        self.statuses.insert(workflow.file, next);
        Ok(format!("{} {name}", past_tense(kind)))
    }
}

fn past_tense(kind: ActionKind) -> &'static str {
    match kind {
        ActionKind::Start => "started",
        ActionKind::Stop => "stopped",
        ActionKind::Retry => "retried",
    }
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Engine backed by a JSON snapshot file, re-read on every fetch.
pub struct SnapshotEngine {
    path: PathBuf,
}

impl SnapshotEngine {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Engine for SnapshotEngine {
    fn start(self) -> EngineHandle {
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel::<Request>();
        let handle = EngineHandle::new(tx);
        let _ = std::thread::Builder::new()
            .name("wf-engine".to_owned())
            .spawn(move || {
                let rt = tokio::runtime::Runtime::new().expect("tokio runtime init");
                rt.block_on(self.run_loop(rx));
            });
        handle
    }
}

impl SnapshotEngine {
    async fn run_loop(self, mut rx: UnboundedReceiver<Request>) {
        let mut overlay = StatusOverlay::default();
        while let Some(req) = rx.recv().await {
            match req {
                Request::Shutdown => {
                    tracing::debug!("engine: shutting down");
                    break;
                }
                Request::FetchRecords { group, reply_tx } => {
                    self.fetch(group, &overlay, &reply_tx).await;
                }
                Request::StartWorkflow { file, reply_tx } => {
                    self.mutate(&mut overlay, ActionKind::Start, file, String::new(), &reply_tx)
                        .await;
                }
                Request::StopWorkflow { file, reply_tx } => {
                    self.mutate(&mut overlay, ActionKind::Stop, file, String::new(), &reply_tx)
                        .await;
                }
                Request::RetryWorkflow {
                    file,
                    request_id,
                    reply_tx,
                } => {
                    self.mutate(&mut overlay, ActionKind::Retry, file, request_id, &reply_tx)
                        .await;
                }
            }
        }
    }

    async fn load(&self) -> Result<Vec<Workflow>, SnapshotError> {
        let json = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| SnapshotError::Io {
                path: self.path.clone(),
                source,
            })?;
        parse_snapshot(&json)
    }

    async fn fetch(&self, group: String, overlay: &StatusOverlay, reply_tx: &Sender<Event>) {
        match self.load().await {
            Ok(mut workflows) => {
                overlay.apply_to(&mut workflows);
                let records = records_for_group(&workflows, &group);
                tracing::debug!(
                    "engine: sending RecordsFetched[{group:?}] count={}",
                    records.len()
                );
                let _ = reply_tx.send(Event::RecordsFetched { group, records });
            }
            Err(e) => {
                tracing::warn!("engine: FetchRecords[{group:?}] error: {e}");
                let _ = reply_tx.send(Event::FetchError {
                    context: format!("FetchRecords[{group:?}]"),
                    message: e.to_string(),
                });
            }
        }
    }

    async fn mutate(
        &self,
        overlay: &mut StatusOverlay,
        kind: ActionKind,
        file: String,
        request_id: String,
        reply_tx: &Sender<Event>,
    ) {
        let loaded = self.load().await;
        let name = loaded
            .as_ref()
            .ok()
            .and_then(|workflows| workflows.iter().find(|w| w.file == file))
            .map_or(file.as_str(), workflow_name)
            .to_owned();
        let description = format!("{} {name}", kind.label());
        let result = match loaded {
            Ok(workflows) => overlay.mutate(
                &workflows,
                kind,
                &file,
                &request_id,
                chrono::Local::now().naive_local(),
            ),
            Err(e) => Err(e),
        };
        match result {
            Ok(done) => {
                tracing::info!("engine: {done}");
                let _ = reply_tx.send(Event::MutationOk { description: done });
            }
            Err(e) => {
                tracing::warn!("engine: {description} failed: {e}");
                let _ = reply_tx.send(Event::MutationError {
                    description,
                    message: e.to_string(),
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::types::{RecordKind, display_name, variant_of};

    const SNAPSHOT: &str = r#"{
        "workflows": [
            {"file": "load.yaml", "config": {"name": "load", "group": "etl", "tags": ["prod"]}},
            {"file": "backup.yml", "config": {"name": "", "tags": []},
             "status": {"status": 4, "status_text": "finished",
                        "started_at": "2024-01-01 00:00:00", "finished_at": "2024-01-01 00:10:00",
                        "request_id": "req-1"}},
            {"file": "clean.yaml", "config": {"name": "clean", "group": "ops"}},
            {"file": "merge.yaml", "config": {"name": "merge", "group": "etl"}}
        ]
    }"#;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 4)
            .unwrap()
            .and_hms_opt(5, 6, 7)
            .unwrap()
    }

    #[test]
    fn root_lists_groups_then_ungrouped() {
        let workflows = parse_snapshot(SNAPSHOT).unwrap();
        let records = records_for_group(&workflows, "");
        let kinds: Vec<RecordKind> = records.iter().map(variant_of).collect();
        assert_eq!(
            kinds,
            vec![RecordKind::Group, RecordKind::Group, RecordKind::Workflow]
        );
        assert_eq!(display_name(&records[0]), "etl");
        assert_eq!(display_name(&records[1]), "ops");
        assert_eq!(display_name(&records[2]), "backup");
    }

    #[test]
    fn group_scope_lists_members() {
        let workflows = parse_snapshot(SNAPSHOT).unwrap();
        let records = records_for_group(&workflows, "etl");
        let names: Vec<&str> = records.iter().map(display_name).collect();
        assert_eq!(names, vec!["load", "merge"]);
        assert!(records_for_group(&workflows, "nope").is_empty());
    }

    #[test]
    fn empty_snapshot_object_parses() {
        assert!(parse_snapshot("{}").unwrap().is_empty());
        assert!(matches!(
            parse_snapshot("not json"),
            Err(SnapshotError::Parse(_))
        ));
    }

    #[test]
    fn start_then_stop_updates_overlay() {
        let mut workflows = parse_snapshot(SNAPSHOT).unwrap();
        let mut overlay = StatusOverlay::default();

        let done = overlay
            .mutate(&workflows, ActionKind::Start, "load.yaml", "", now())
            .unwrap();
        assert_eq!(done, "started load");
        overlay.apply_to(&mut workflows);
        let status = workflows[0].status.clone().unwrap();
        assert_eq!(status.code, StatusCode::Running);
        assert_eq!(status.started_at, "2024-03-04 05:06:07");

        assert!(matches!(
            overlay.mutate(&workflows, ActionKind::Start, "load.yaml", "", now()),
            Err(SnapshotError::AlreadyRunning(_))
        ));

        overlay
            .mutate(&workflows, ActionKind::Stop, "load.yaml", "", now())
            .unwrap();
        overlay.apply_to(&mut workflows);
        let status = workflows[0].status.clone().unwrap();
        assert_eq!(status.code, StatusCode::Cancelled);
        assert_eq!(status.finished_at, "2024-03-04 05:06:07");
    }

    #[test]
    fn stop_requires_running() {
        let workflows = parse_snapshot(SNAPSHOT).unwrap();
        let mut overlay = StatusOverlay::default();
        assert!(matches!(
            overlay.mutate(&workflows, ActionKind::Stop, "backup.yml", "", now()),
            Err(SnapshotError::NotRunning(_))
        ));
    }

    #[test]
    fn retry_reuses_request_id() {
        let mut workflows = parse_snapshot(SNAPSHOT).unwrap();
        let mut overlay = StatusOverlay::default();
        assert!(matches!(
            overlay.mutate(&workflows, ActionKind::Retry, "clean.yaml", "", now()),
            Err(SnapshotError::NothingToRetry(_))
        ));
        overlay
            .mutate(&workflows, ActionKind::Retry, "backup.yml", "req-1", now())
            .unwrap();
        overlay.apply_to(&mut workflows);
        let status = workflows[1].status.clone().unwrap();
        assert_eq!(status.code, StatusCode::Running);
        assert_eq!(status.request_id, "req-1");
        assert_eq!(status.finished_at, "");
    }

    #[test]
    fn unknown_workflow_is_reported() {
        let workflows = parse_snapshot(SNAPSHOT).unwrap();
        let mut overlay = StatusOverlay::default();
        assert!(matches!(
            overlay.mutate(&workflows, ActionKind::Start, "ghost.yaml", "", now()),
            Err(SnapshotError::UnknownWorkflow(_))
        ));
    }

    #[test]
    fn same_name_in_two_groups_keeps_separate_status() {
        let mut workflows = parse_snapshot(
            r#"{"workflows": [
                {"file": "etl/sync.yaml", "config": {"name": "sync", "group": "etl"}},
                {"file": "ops/sync.yaml", "config": {"name": "sync", "group": "ops"}}
            ]}"#,
        )
        .unwrap();
        let mut overlay = StatusOverlay::default();
        let done = overlay
            .mutate(&workflows, ActionKind::Start, "ops/sync.yaml", "", now())
            .unwrap();
        assert_eq!(done, "started sync");
        overlay.apply_to(&mut workflows);
        assert_eq!(workflows[0].status, None);
        assert_eq!(workflows[1].status_code(), StatusCode::Running);
    }

    #[test]
    fn refusals_name_the_workflow_not_the_file() {
        let workflows = parse_snapshot(SNAPSHOT).unwrap();
        let mut overlay = StatusOverlay::default();
        let err = overlay
            .mutate(&workflows, ActionKind::Stop, "backup.yml", "", now())
            .unwrap_err();
        assert_eq!(err.to_string(), "workflow \"backup\" is not running");
    }
}
