//! Walk sessions.
//!
//! Each started walk runs its `Runner` on a task of its own. A driver task
//! drains the request channel: text requests go to the transcript, halting
//! requests wait in `pending` until a client resolves them. Every change bumps
//! a revision counter that handlers wait on. Cancelling a session aborts its
//! runner and drops any pending request unresolved.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use encounter_content::domain::node::LogId;
use encounter_core::error::EncounterError;
use encounter_runtime::domain::request::{
    ConversationReply, DialogOutcome, EncounterRequest, EventOutcome, TextRequest,
};
use encounter_runtime::{Runner, WalkReport, WalkStatus};
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, watch};
use tokio::task::{AbortHandle, JoinHandle};
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::ApiError;

/// How long a handler waits for a walk to halt or finish before answering
/// with whatever state it is in.
pub const SETTLE_TIMEOUT: Duration = Duration::from_secs(10);

/// A client's answer to the pending request.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Resolution {
    Button {
        edge_id: String,
    },
    Dialog {
        outcome: DialogOutcome,
    },
    Conversation {
        /// `None` moves on without choosing a prompt.
        #[serde(default)]
        prompt_id: Option<String>,
    },
    Bust,
    EncounterEvent {
        outcome: EventOutcome,
    },
}

impl Resolution {
    fn kind(&self) -> &'static str {
        match self {
            Self::Button { .. } => "button",
            Self::Dialog { .. } => "dialog",
            Self::Conversation { .. } => "conversation",
            Self::Bust => "bust",
            Self::EncounterEvent { .. } => "encounter_event",
        }
    }
}

/// A recovered error, as reported to clients.
#[derive(Debug, Clone, Serialize)]
pub struct DiagnosticView {
    pub node_id: Option<String>,
    pub message: String,
    pub occurred_at: DateTime<Utc>,
}

/// How a walk ended.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum WalkOutcome {
    Completed {
        steps: usize,
        visited: Vec<LogId>,
        diagnostics: Vec<DiagnosticView>,
        finished_at: DateTime<Utc>,
    },
    Failed {
        message: String,
    },
}

impl From<WalkReport> for WalkOutcome {
    fn from(report: WalkReport) -> Self {
        Self::Completed {
            steps: report.steps,
            visited: report.visited,
            diagnostics: report
                .diagnostics
                .into_iter()
                .map(|d| DiagnosticView {
                    node_id: d.node_id,
                    message: d.error.to_string(),
                    occurred_at: d.occurred_at,
                })
                .collect(),
            finished_at: report.finished_at,
        }
    }
}

/// Point-in-time view of a walk.
#[derive(Debug, Clone, Serialize)]
pub struct WalkSnapshot {
    pub walk_id: Uuid,
    pub encounter_id: String,
    pub status: WalkStatus,
    /// The request awaiting resolution, without its completion handle.
    pub pending: Option<serde_json::Value>,
    pub transcript: Vec<TextRequest>,
    pub outcome: Option<WalkOutcome>,
}

#[derive(Default)]
struct WalkRecord {
    transcript: Vec<TextRequest>,
    pending: Option<EncounterRequest>,
    outcome: Option<WalkOutcome>,
}

impl WalkRecord {
    fn is_settled(&self) -> bool {
        self.pending.is_some() || self.outcome.is_some()
    }
}

/// One running or finished walk.
pub struct WalkSession {
    id: Uuid,
    encounter_id: String,
    record: Mutex<WalkRecord>,
    revision: watch::Sender<u64>,
    status: watch::Receiver<WalkStatus>,
    walk: AbortHandle,
}

impl std::fmt::Debug for WalkSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WalkSession")
            .field("id", &self.id)
            .field("encounter_id", &self.encounter_id)
            .finish_non_exhaustive()
    }
}

impl WalkSession {
    /// Spawns `runner` and the task that feeds its requests into the session.
    #[must_use]
    pub fn start(id: Uuid, encounter_id: String, runner: Runner) -> Arc<Self> {
        let status = runner.subscribe();
        let (tx, rx) = mpsc::unbounded_channel();
        let (revision, _) = watch::channel(0);
        let walk = tokio::spawn(runner.run(tx));
        let session = Arc::new(Self {
            id,
            encounter_id,
            record: Mutex::new(WalkRecord::default()),
            revision,
            status,
            walk: walk.abort_handle(),
        });

        info!(walk_id = %id, encounter_id = %session.encounter_id, "walk session started");
        tokio::spawn(drive(Arc::clone(&session), rx, walk));
        session
    }

    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    fn record(&self) -> MutexGuard<'_, WalkRecord> {
        self.record.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn update(&self, apply: impl FnOnce(&mut WalkRecord)) {
        apply(&mut self.record());
        self.revision.send_modify(|r| *r += 1);
    }

    /// Waits until the walk has a pending request or has finished, or until
    /// `timeout` elapses.
    pub async fn settled(&self, timeout: Duration) {
        let mut revisions = self.revision.subscribe();
        let settled = revisions.wait_for(|_| self.record().is_settled());
        if tokio::time::timeout(timeout, settled).await.is_err() {
            warn!(walk_id = %self.id, "walk did not settle in time");
        }
    }

    /// Waits until the walk has an outcome.
    pub async fn finished(&self) {
        let mut revisions = self.revision.subscribe();
        // The sender lives in `self`, so the wait cannot fail.
        let _ = revisions
            .wait_for(|_| self.record().outcome.is_some())
            .await;
    }

    /// Aborts the walk. A pending request is dropped unresolved.
    pub fn cancel(&self) {
        self.walk.abort();
        self.update(|record| record.pending = None);
        info!(walk_id = %self.id, "walk session cancelled");
    }

    /// Hands the pending request to the client, moving it to the `Handle`
    /// phase, and returns the resulting view.
    #[must_use]
    pub fn present(&self) -> WalkSnapshot {
        if let Some(pending) = &self.record().pending {
            pending.mark_handling();
        }
        self.snapshot()
    }

    /// Returns the current view.
    #[must_use]
    pub fn snapshot(&self) -> WalkSnapshot {
        let record = self.record();
        WalkSnapshot {
            walk_id: self.id,
            encounter_id: self.encounter_id.clone(),
            status: self.status.borrow().clone(),
            pending: record
                .pending
                .as_ref()
                .and_then(|p| serde_json::to_value(p).ok()),
            transcript: record.transcript.clone(),
            outcome: record.outcome.clone(),
        }
    }

    /// Completes the pending request with `resolution`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NothingPending` if no request waits, and
    /// `ApiError::ResolutionMismatch` if the resolution is for another
    /// request type; the request stays pending in that case.
    pub fn resolve(&self, resolution: Resolution) -> Result<(), ApiError> {
        let mut record = self.record();
        let pending = record
            .pending
            .take()
            .ok_or(ApiError::NothingPending(self.id))?;

        let delivered = match (pending, resolution) {
            (EncounterRequest::Button(request), Resolution::Button { edge_id }) => {
                request.completion.complete(edge_id).is_ok()
            }
            (EncounterRequest::Dialog(request), Resolution::Dialog { outcome }) => {
                request.completion.complete(outcome).is_ok()
            }
            (EncounterRequest::Conversation(request), Resolution::Conversation { prompt_id }) => {
                let reply = prompt_id.map_or(ConversationReply::Continue, ConversationReply::Prompt);
                request.completion.complete(reply).is_ok()
            }
            (EncounterRequest::Bust(request), Resolution::Bust) => {
                request.completion.complete(()).is_ok()
            }
            (EncounterRequest::EncounterEvent(request), Resolution::EncounterEvent { outcome }) => {
                request.completion.complete(outcome).is_ok()
            }
            (pending, resolution) => {
                let expected = pending.kind();
                record.pending = Some(pending);
                return Err(ApiError::ResolutionMismatch {
                    expected,
                    received: resolution.kind(),
                });
            }
        };

        if delivered {
            info!(walk_id = %self.id, "pending request resolved");
        } else {
            warn!(walk_id = %self.id, "walk stopped waiting before resolution arrived");
        }
        Ok(())
    }
}

async fn drive(
    session: Arc<WalkSession>,
    mut requests: mpsc::UnboundedReceiver<EncounterRequest>,
    walk: JoinHandle<Result<WalkReport, EncounterError>>,
) {
    while let Some(request) = requests.recv().await {
        session.update(|record| match request {
            EncounterRequest::Text(text) => record.transcript.push(text),
            halting => record.pending = Some(halting),
        });
    }

    let outcome = match walk.await {
        Ok(Ok(report)) => WalkOutcome::from(report),
        Ok(Err(err)) => WalkOutcome::Failed {
            message: err.to_string(),
        },
        Err(join) if join.is_cancelled() => WalkOutcome::Failed {
            message: "walk cancelled".to_owned(),
        },
        Err(join) => WalkOutcome::Failed {
            message: join.to_string(),
        },
    };
    info!(walk_id = %session.id, "walk session finished");
    session.update(|record| record.outcome = Some(outcome));
}
