//! Module, module-swap and module-trait nodes.
//!
//! All three rewrite the ship's module set: the set is loaded once, every
//! passing edge is applied in index order, modules are de-duplicated by type
//! (the last one of a type wins) and the result is committed once. These
//! nodes never branch.

use std::collections::HashSet;

use encounter_content::domain::edge::Edge;
use encounter_content::domain::edges::{ModuleEdge, ModuleSwapEdge, ModuleTraitEdge};
use encounter_content::domain::module::{ModuleBlueprint, TraitOperation};
use encounter_core::error::EncounterError;
use encounter_core::rng::DeterministicRng;
use encounter_core::ship::ShipModule;
use tracing::debug;

use super::{FilteredEdge, HandlerContext, all_passing};
use crate::domain::continuation::Continuation;

fn generate(blueprint: &ModuleBlueprint, rng: &mut dyn DeterministicRng) -> ShipModule {
    ShipModule {
        id: rng.next_uuid(),
        module_type: blueprint.module_type.clone(),
        traits: blueprint.traits.clone(),
    }
}

/// Keeps the last module of each type, preserving the order of survivors.
fn dedupe_by_type(modules: Vec<ShipModule>) -> Vec<ShipModule> {
    let mut seen = HashSet::new();
    let mut kept: Vec<ShipModule> = modules
        .into_iter()
        .rev()
        .filter(|m| seen.insert(m.module_type.clone()))
        .collect();
    kept.reverse();
    kept
}

/// Loads the ship, applies `apply` for every passing edge, and commits.
async fn rewrite_ship<E, F>(edges: &[E], ctx: &mut HandlerContext<'_>, mut apply: F) -> Continuation
where
    E: FilteredEdge + Sync,
    F: FnMut(&E, &mut Vec<ShipModule>, &mut dyn DeterministicRng) -> Result<(), EncounterError>,
{
    let passing = all_passing(edges, ctx).await;
    if passing.is_empty() {
        return Continuation::Linear;
    }

    let mut modules = match ctx.ship.load_modules().await {
        Ok(modules) => modules,
        Err(err) => {
            ctx.record(err);
            return Continuation::Linear;
        }
    };

    for edge in passing {
        debug!(edge_id = edge.id(), "applying module edge");
        if let Err(err) = apply(edge, &mut modules, &mut *ctx.rng) {
            ctx.record(err);
        }
    }

    if let Err(err) = ctx.ship.commit_modules(dedupe_by_type(modules)).await {
        ctx.record(err);
    }
    Continuation::Linear
}

/// Installs a freshly generated module per passing edge.
pub(super) async fn install(edges: &[ModuleEdge], ctx: &mut HandlerContext<'_>) -> Continuation {
    rewrite_ship(edges, ctx, |edge, modules, rng| {
        modules.push(generate(&edge.blueprint, rng));
        Ok(())
    })
    .await
}

/// Regenerates every module of the target type from the replacement blueprint.
pub(super) async fn swap(edges: &[ModuleSwapEdge], ctx: &mut HandlerContext<'_>) -> Continuation {
    rewrite_ship(edges, ctx, |edge, modules, rng| {
        let mut replaced = 0_usize;
        for module in modules.iter_mut() {
            if module.module_type == edge.target_module_type {
                *module = generate(&edge.replacement, rng);
                replaced += 1;
            }
        }
        debug!(module_type = %edge.target_module_type, replaced, "module swap");
        Ok(())
    })
    .await
}

/// Appends or removes traits on the targeted modules.
pub(super) async fn change_traits(
    edges: &[ModuleTraitEdge],
    ctx: &mut HandlerContext<'_>,
) -> Continuation {
    rewrite_ship(edges, ctx, |edge, modules, _rng| {
        let targets = modules.iter_mut().filter(|m| {
            edge.module_type
                .as_ref()
                .is_none_or(|wanted| &m.module_type == wanted)
        });
        match &edge.operation {
            TraitOperation::Append { module_trait } => {
                for module in targets {
                    if !module.traits.iter().any(|t| t.id == module_trait.id) {
                        module.traits.push(module_trait.clone());
                    }
                }
            }
            TraitOperation::RemoveById { trait_id } => {
                for module in targets {
                    module.traits.retain(|t| &t.id != trait_id);
                }
            }
            TraitOperation::RemoveByFamilyId { family_id } => {
                for module in targets {
                    module.traits.retain(|t| &t.family_id != family_id);
                }
            }
            TraitOperation::Unknown => {
                return Err(EncounterError::unrecognized("trait operation", edge.id()));
            }
        }
        Ok(())
    })
    .await
}
