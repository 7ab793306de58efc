//! Per-kind node handlers.
//!
//! `handle` dispatches on the node kind with an exhaustive match. Every
//! handler returns exactly one `Continuation`; errors are recorded in the
//! context's diagnostics and the handler degrades to its no-match path.

mod button;
mod conversation;
mod dialog;
mod encyclopedia;
mod event;
mod key_value;
mod module;
mod portrait;
mod switch;
mod text;

use encounter_content::domain::edge::{Edge, ordered_edges};
use encounter_content::domain::edges::{
    BustEdge, ConversationEdge, DialogEdge, EncounterEventEdge, ModuleEdge, ModuleSwapEdge,
    ModuleTraitEdge, SwitchEdge,
};
use encounter_content::domain::filter::ValueFilterModel;
use encounter_content::domain::node::{LogNode, LogNodeKind};
use encounter_core::diagnostic::Diagnostics;
use encounter_core::encyclopedia::EncyclopediaRepository;
use encounter_core::error::EncounterError;
use encounter_core::rng::DeterministicRng;
use encounter_core::ship::ShipRepository;
use encounter_core::store::KeyValueStore;
use tracing::{debug, instrument};

pub use button::ButtonFlag;

use super::channel::RequestChannel;
use super::filter::evaluate_filter;
use crate::domain::continuation::Continuation;

/// Collaborators available to a handler for one activation.
pub struct HandlerContext<'a> {
    pub store: &'a dyn KeyValueStore,
    pub ship: &'a dyn ShipRepository,
    pub encyclopedia: &'a dyn EncyclopediaRepository,
    pub rng: &'a mut dyn DeterministicRng,
    pub diagnostics: &'a mut Diagnostics,
    pub requests: &'a RequestChannel,
}

impl HandlerContext<'_> {
    /// Evaluates `filter` against the store, recording failures.
    pub async fn passes(&mut self, filter: &ValueFilterModel, empty_default: bool) -> bool {
        evaluate_filter(filter, empty_default, self.store, self.diagnostics).await
    }

    /// Records a recovered error.
    pub fn record(&mut self, error: EncounterError) {
        self.diagnostics.record(error);
    }
}

/// An edge gated by a single filter that passes when empty.
pub(crate) trait FilteredEdge: Edge {
    fn filter(&self) -> &ValueFilterModel;
}

macro_rules! impl_filtered_edge {
    ($($edge:ty),+ $(,)?) => {
        $(
            impl FilteredEdge for $edge {
                fn filter(&self) -> &ValueFilterModel {
                    &self.filter
                }
            }
        )+
    };
}

impl_filtered_edge!(
    SwitchEdge,
    ConversationEdge,
    DialogEdge,
    BustEdge,
    EncounterEventEdge,
    ModuleEdge,
    ModuleSwapEdge,
    ModuleTraitEdge,
);

/// Returns the first edge, in index order, whose filter passes.
pub(crate) async fn first_passing<'e, E: FilteredEdge + Sync>(
    edges: &'e [E],
    ctx: &mut HandlerContext<'_>,
) -> Option<&'e E> {
    for edge in ordered_edges(edges) {
        if ctx.passes(edge.filter(), true).await {
            return Some(edge);
        }
        debug!(edge_id = edge.id(), "edge filtered out");
    }
    None
}

/// Returns every edge, in index order, whose filter passes.
pub(crate) async fn all_passing<'e, E: FilteredEdge + Sync>(
    edges: &'e [E],
    ctx: &mut HandlerContext<'_>,
) -> Vec<&'e E> {
    let mut passing = Vec::new();
    for edge in ordered_edges(edges) {
        if ctx.passes(edge.filter(), true).await {
            passing.push(edge);
        }
    }
    passing
}

/// Handles one activation of `node`.
#[instrument(skip_all, fields(node_id = %node.id, kind = node.kind_name()))]
pub async fn handle(node: &LogNode, ctx: &mut HandlerContext<'_>) -> Continuation {
    match &node.kind {
        LogNodeKind::Text { title, message } => text::handle(node, title, message, ctx),
        LogNodeKind::KeyValue { edges } => key_value::handle(edges, ctx).await,
        LogNodeKind::Switch { edges } => switch::handle(edges, ctx).await,
        LogNodeKind::Button { edges } => button::handle(node, edges, ctx).await,
        LogNodeKind::Conversation { edges } => conversation::handle(node, edges, ctx).await,
        LogNodeKind::Dialog { edges } => dialog::handle(node, edges, ctx).await,
        LogNodeKind::Bust { edges } => portrait::handle(node, edges, ctx).await,
        LogNodeKind::EncounterEvent { edges } => event::handle(node, edges, ctx).await,
        LogNodeKind::Module { edges } => module::install(edges, ctx).await,
        LogNodeKind::ModuleSwap { edges } => module::swap(edges, ctx).await,
        LogNodeKind::ModuleTrait { edges } => module::change_traits(edges, ctx).await,
        LogNodeKind::Encyclopedia { edges } => encyclopedia::handle(edges, ctx).await,
        LogNodeKind::Unknown => {
            ctx.record(EncounterError::unrecognized("node kind", node.id.as_str()));
            Continuation::Linear
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    //! Harness for driving a single handler activation.

    use std::sync::Arc;

    use encounter_content::domain::node::LogNode;
    use encounter_core::diagnostic::Diagnostic;
    use encounter_core::rng::DeterministicRng;
    use encounter_core::ship::ShipModule;
    use encounter_store::{MemoryEncyclopedia, MemoryShipRepository};
    use encounter_test_support::{FixedClock, MockRng, RecordingKeyValueStore};
    use tokio::sync::{mpsc, watch};

    use super::{HandlerContext, handle};
    use crate::application::channel::RequestChannel;
    use crate::domain::continuation::Continuation;
    use crate::domain::request::EncounterRequest;
    use crate::domain::status::WalkStatus;

    pub(crate) struct Harness {
        pub store: RecordingKeyValueStore,
        pub ship: MemoryShipRepository,
        pub encyclopedia: MemoryEncyclopedia,
        pub rng: Box<dyn DeterministicRng>,
    }

    pub(crate) struct Activation {
        pub continuation: Continuation,
        pub diagnostics: Vec<Diagnostic>,
    }

    impl Harness {
        pub(crate) fn new(store: RecordingKeyValueStore) -> Self {
            Self {
                store,
                ship: MemoryShipRepository::default(),
                encyclopedia: MemoryEncyclopedia::new(),
                rng: Box::new(MockRng),
            }
        }

        pub(crate) fn with_ship(mut self, modules: Vec<ShipModule>) -> Self {
            self.ship = MemoryShipRepository::new(modules);
            self
        }

        pub(crate) fn with_rng(mut self, rng: impl DeterministicRng + 'static) -> Self {
            self.rng = Box::new(rng);
            self
        }

        /// Runs `node` while `respond` plays the content layer.
        pub(crate) async fn activate(
            &mut self,
            node: &LogNode,
            respond: impl FnOnce(EncounterRequest) + Send + 'static,
        ) -> Activation {
            let (tx, mut rx) = mpsc::unbounded_channel();
            let (status, _observer) = watch::channel(WalkStatus::idle());
            let channel = RequestChannel::new(tx, Arc::new(status));
            let responder = tokio::spawn(async move {
                let mut respond = Some(respond);
                while let Some(request) = rx.recv().await {
                    if request.is_halting() {
                        if let Some(respond) = respond.take() {
                            respond(request);
                        }
                    }
                }
            });

            let mut diagnostics = encounter_core::diagnostic::Diagnostics::new(Arc::new(
                FixedClock::epoch(),
            ));
            let continuation = {
                let mut ctx = HandlerContext {
                    store: &self.store,
                    ship: &self.ship,
                    encyclopedia: &self.encyclopedia,
                    rng: self.rng.as_mut(),
                    diagnostics: &mut diagnostics,
                    requests: &channel,
                };
                handle(node, &mut ctx).await
            };
            drop(channel);
            responder.await.unwrap();

            Activation {
                continuation,
                diagnostics: diagnostics.into_entries(),
            }
        }
    }

    /// A responder for nodes that must not halt.
    pub(crate) fn no_response(request: EncounterRequest) {
        panic!("unexpected halting request: {request:?}");
    }
}
