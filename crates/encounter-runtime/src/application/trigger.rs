//! Encounter eligibility.

use encounter_content::application::library::{EncounterLibrary, LibraryEntry};
use encounter_core::diagnostic::Diagnostics;
use encounter_core::store::KeyValueStore;
use tracing::debug;

use super::filter::evaluate_filter;

/// Returns the encounters whose trigger filter currently passes, in load
/// order. An empty trigger always passes.
pub async fn triggered_encounters<'l>(
    library: &'l EncounterLibrary,
    store: &dyn KeyValueStore,
    diagnostics: &mut Diagnostics,
) -> Vec<&'l LibraryEntry> {
    let mut eligible = Vec::new();
    for entry in library.iter() {
        diagnostics.enter(entry.graph.id());
        if evaluate_filter(entry.graph.trigger(), true, store, diagnostics).await {
            eligible.push(entry);
        } else {
            debug!(encounter_id = entry.graph.id(), "encounter not triggered");
        }
    }
    eligible
}
