//! Button nodes.
//!
//! Each button's state combines an authored filter with a flag stored in the
//! encounter scope under the button's edge id:
//!
//! - used: `used_filtering` (fails when empty) OR `<edge>.auto_used`
//! - interactable: `interactable_filtering` (passes when empty) AND NOT
//!   `<edge>.auto_disable_interactions`
//! - enabled: `enabled_filtering` (passes when empty) AND NOT
//!   `<edge>.auto_disable_enabled`
//!
//! Disabled buttons are not offered at all. Clicking a button sets exactly the
//! flags its edge declares.

use encounter_content::domain::edge::{Edge, ordered_edges};
use encounter_content::domain::edges::ButtonEdge;
use encounter_content::domain::node::LogNode;
use encounter_core::error::EncounterError;
use encounter_core::store::{Scope, StoreError, StoreValue, get_typed};
use tracing::info;

use super::HandlerContext;
use crate::domain::continuation::Continuation;
use crate::domain::request::{ButtonOption, ButtonRequest, EncounterRequest};

/// A store-backed button flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonFlag {
    Used,
    DisableInteractions,
    DisableEnabled,
}

impl ButtonFlag {
    /// Store key of this flag for the button `edge_id`, in `Scope::Encounter`.
    #[must_use]
    pub fn key(self, edge_id: &str) -> String {
        let suffix = match self {
            Self::Used => "auto_used",
            Self::DisableInteractions => "auto_disable_interactions",
            Self::DisableEnabled => "auto_disable_enabled",
        };
        format!("{edge_id}.{suffix}")
    }
}

/// Reads a flag; a missing key reads as unset.
async fn read_flag(flag: ButtonFlag, edge_id: &str, ctx: &mut HandlerContext<'_>) -> bool {
    match get_typed::<bool>(ctx.store, &Scope::Encounter, &flag.key(edge_id)).await {
        Ok(value) => value,
        Err(StoreError::NotFound { .. }) => false,
        Err(err) => {
            ctx.record(err.into());
            false
        }
    }
}

async fn resolve(edge: &ButtonEdge, ctx: &mut HandlerContext<'_>) -> Option<ButtonOption> {
    let edge_id = edge.id();
    let enabled = ctx.passes(&edge.enabled_filtering, true).await
        && !read_flag(ButtonFlag::DisableEnabled, edge_id, ctx).await;
    if !enabled {
        return None;
    }
    let used = ctx.passes(&edge.used_filtering, false).await
        || read_flag(ButtonFlag::Used, edge_id, ctx).await;
    let interactable = ctx.passes(&edge.interactable_filtering, true).await
        && !read_flag(ButtonFlag::DisableInteractions, edge_id, ctx).await;
    Some(ButtonOption {
        edge_id: edge_id.to_owned(),
        message: edge.message.clone(),
        used,
        interactable,
    })
}

async fn write_flags(edge: &ButtonEdge, ctx: &mut HandlerContext<'_>) {
    let declared = [
        (ButtonFlag::Used, edge.auto_used),
        (ButtonFlag::DisableInteractions, edge.auto_disable_interactions),
        (ButtonFlag::DisableEnabled, edge.auto_disable_enabled),
    ];
    for (flag, set) in declared {
        if !set {
            continue;
        }
        let key = flag.key(edge.id());
        if let Err(err) = ctx
            .store
            .set(&Scope::Encounter, &key, StoreValue::Boolean(true))
            .await
        {
            ctx.record(err.into());
        }
    }
}

pub(super) async fn handle(
    node: &LogNode,
    edges: &[ButtonEdge],
    ctx: &mut HandlerContext<'_>,
) -> Continuation {
    let mut candidates: Vec<(&ButtonEdge, ButtonOption)> = Vec::new();
    for edge in ordered_edges(edges) {
        if let Some(option) = resolve(edge, ctx).await {
            candidates.push((edge, option));
        }
    }

    if !candidates.iter().any(|(_, option)| option.interactable) {
        info!(node_id = %node.id, "no interactable button; continuing");
        return Continuation::Linear;
    }

    let buttons: Vec<ButtonOption> = candidates.iter().map(|(_, o)| o.clone()).collect();
    let clicked = match ctx
        .requests
        .halt(|completion| {
            EncounterRequest::Button(ButtonRequest {
                node_id: node.id.clone(),
                buttons,
                completion,
            })
        })
        .await
    {
        Ok(edge_id) => edge_id,
        Err(err) => {
            ctx.record(err);
            return Continuation::Linear;
        }
    };

    let Some((edge, option)) = candidates.iter().find(|(e, _)| e.id() == clicked) else {
        ctx.record(EncounterError::unrecognized("button", clicked));
        return Continuation::Linear;
    };
    if !option.interactable {
        ctx.record(EncounterError::ResolutionFailure(format!(
            "button {clicked} is not interactable"
        )));
        return Continuation::Linear;
    }

    write_flags(edge, ctx).await;
    Continuation::to_target(edge.next_log_id.as_ref())
}
