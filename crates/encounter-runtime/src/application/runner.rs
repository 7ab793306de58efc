//! Walk orchestration.
//!
//! A `Runner` owns one walk of one graph. It starts at the beginning node,
//! hands each node to its handler, follows the returned continuation and
//! stops after an ending node. Halting handlers suspend the walk inside
//! `run` until the content layer completes their request.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use encounter_content::domain::graph::EncounterGraph;
use encounter_content::domain::node::{LogId, LogNode};
use encounter_core::clock::Clock;
use encounter_core::diagnostic::{Diagnostic, Diagnostics};
use encounter_core::encyclopedia::EncyclopediaRepository;
use encounter_core::error::EncounterError;
use encounter_core::rng::DeterministicRng;
use encounter_core::ship::ShipRepository;
use encounter_core::store::KeyValueStore;
use tokio::sync::{mpsc, watch};
use tracing::{Instrument, debug, info, info_span, warn};

use super::channel::RequestChannel;
use super::handlers::{HandlerContext, handle};
use crate::domain::continuation::Continuation;
use crate::domain::request::EncounterRequest;
use crate::domain::status::{WalkState, WalkStatus};

/// Default step budget.
pub const DEFAULT_MAX_STEPS: usize = 10_000;

/// Walk limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunnerConfig {
    /// Maximum node activations per walk; `None` is unbounded.
    pub max_steps: Option<usize>,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            max_steps: Some(DEFAULT_MAX_STEPS),
        }
    }
}

/// External collaborators of a walk.
#[derive(Clone)]
pub struct EncounterServices {
    pub store: Arc<dyn KeyValueStore>,
    pub ship: Arc<dyn ShipRepository>,
    pub encyclopedia: Arc<dyn EncyclopediaRepository>,
    pub clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for EncounterServices {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncounterServices").finish_non_exhaustive()
    }
}

/// Summary of a finished walk.
#[derive(Debug, Clone)]
pub struct WalkReport {
    pub encounter_id: String,
    /// Activated nodes in order, repeats included.
    pub visited: Vec<LogId>,
    /// Errors recovered during the walk.
    pub diagnostics: Vec<Diagnostic>,
    pub steps: usize,
    pub finished_at: DateTime<Utc>,
}

/// Drives one walk of an encounter graph.
pub struct Runner {
    graph: Arc<EncounterGraph>,
    services: EncounterServices,
    rng: Box<dyn DeterministicRng>,
    config: RunnerConfig,
    status: Arc<watch::Sender<WalkStatus>>,
}

impl std::fmt::Debug for Runner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runner")
            .field("encounter_id", &self.graph.id())
            .field("config", &self.config)
            .field("status", &*self.status.borrow())
            .finish_non_exhaustive()
    }
}

impl Runner {
    /// Creates an idle runner with the default configuration.
    #[must_use]
    pub fn new(
        graph: Arc<EncounterGraph>,
        services: EncounterServices,
        rng: Box<dyn DeterministicRng>,
    ) -> Self {
        let (status, _) = watch::channel(WalkStatus::idle());
        Self {
            graph,
            services,
            rng,
            config: RunnerConfig::default(),
            status: Arc::new(status),
        }
    }

    /// Replaces the configuration.
    #[must_use]
    pub fn with_config(mut self, config: RunnerConfig) -> Self {
        self.config = config;
        self
    }

    /// Observes status transitions of this walk.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<WalkStatus> {
        self.status.subscribe()
    }

    /// Walks the graph to completion, emitting requests on `requests`.
    ///
    /// Recovered errors are collected in the report. The sender is dropped when
    /// the walk ends, which closes the channel for the content layer.
    ///
    /// # Errors
    ///
    /// Returns `EncounterError::RunawayGraph` if the step budget is exhausted.
    pub async fn run(
        self,
        requests: mpsc::UnboundedSender<EncounterRequest>,
    ) -> Result<WalkReport, EncounterError> {
        let span = info_span!("walk", encounter_id = %self.graph.id());
        self.walk(requests).instrument(span).await
    }

    async fn walk(
        self,
        requests: mpsc::UnboundedSender<EncounterRequest>,
    ) -> Result<WalkReport, EncounterError> {
        let Self {
            graph,
            services,
            mut rng,
            config,
            status,
        } = self;
        let channel = RequestChannel::new(requests, Arc::clone(&status));
        let mut diagnostics = Diagnostics::new(Arc::clone(&services.clock));
        let mut visited = Vec::new();
        let mut current: &LogNode = graph.beginning();

        info!(nodes = graph.len(), "walk started");
        loop {
            if config.max_steps.is_some_and(|max| visited.len() >= max) {
                let max_steps = visited.len();
                warn!(max_steps, node_id = %current.id, "step budget exhausted");
                status.send_modify(|s| s.state = WalkState::Finished);
                return Err(EncounterError::RunawayGraph { max_steps });
            }

            visited.push(current.id.clone());
            diagnostics.enter(current.id.as_str());
            status.send_modify(|s| {
                s.state = WalkState::Walking;
                s.current = Some(current.id.clone());
                s.steps = visited.len();
            });
            debug!(node_id = %current.id, kind = current.kind_name(), "activating node");

            let continuation = {
                let mut ctx = HandlerContext {
                    store: services.store.as_ref(),
                    ship: services.ship.as_ref(),
                    encyclopedia: services.encyclopedia.as_ref(),
                    rng: rng.as_mut(),
                    diagnostics: &mut diagnostics,
                    requests: &channel,
                };
                handle(current, &mut ctx).await
            };

            if current.ending {
                break;
            }

            let next = match &continuation {
                Continuation::Linear => current.next_log_id.as_ref(),
                Continuation::Branch(target) => Some(target),
            };
            let Some(next) = next else {
                diagnostics.record(EncounterError::ResolutionFailure(format!(
                    "dead end at node {}",
                    current.id
                )));
                break;
            };
            match graph.node(next.as_str()) {
                Some(node) => current = node,
                None => {
                    diagnostics.record(EncounterError::ResolutionFailure(format!(
                        "node {} continues to unknown node {next}",
                        current.id
                    )));
                    break;
                }
            }
        }

        status.send_modify(|s| s.state = WalkState::Finished);
        let report = WalkReport {
            encounter_id: graph.id().to_owned(),
            steps: visited.len(),
            visited,
            diagnostics: diagnostics.into_entries(),
            finished_at: services.clock.now(),
        };
        info!(
            steps = report.steps,
            diagnostics = report.diagnostics.len(),
            "walk finished"
        );
        Ok(report)
    }
}
