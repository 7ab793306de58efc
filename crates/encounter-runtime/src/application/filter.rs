//! Value filter evaluation.

use encounter_content::domain::filter::{Comparator, FilterEntry, ValueFilterModel};
use encounter_core::diagnostic::Diagnostics;
use encounter_core::error::EncounterError;
use encounter_core::store::KeyValueStore;

/// Evaluates `filter` as a short-circuiting conjunction.
///
/// An empty filter yields `empty_default`. An entry whose operands cannot be
/// resolved, or whose comparator does not apply to its type, is recorded and
/// counts as not matching.
pub async fn evaluate_filter(
    filter: &ValueFilterModel,
    empty_default: bool,
    store: &dyn KeyValueStore,
    diagnostics: &mut Diagnostics,
) -> bool {
    if filter.is_empty() {
        return empty_default;
    }
    for entry in &filter.entries {
        match evaluate_entry(entry, store).await {
            Ok(true) => {}
            Ok(false) => return false,
            Err(err) => {
                diagnostics.record(err);
                return false;
            }
        }
    }
    true
}

async fn evaluate_entry(
    entry: &FilterEntry,
    store: &dyn KeyValueStore,
) -> Result<bool, EncounterError> {
    match entry {
        FilterEntry::Boolean {
            lhs,
            comparator,
            rhs,
        } => {
            let lhs = lhs.get(store).await?;
            let rhs = rhs.get(store).await?;
            compare_equality(*comparator, &lhs, &rhs, "boolean comparator")
        }
        FilterEntry::Integer {
            lhs,
            comparator,
            rhs,
        } => {
            let lhs = lhs.get(store).await?;
            let rhs = rhs.get(store).await?;
            compare_ordered(*comparator, &lhs, &rhs, "integer comparator")
        }
        FilterEntry::Float {
            lhs,
            comparator,
            rhs,
        } => {
            let lhs = lhs.get(store).await?;
            let rhs = rhs.get(store).await?;
            compare_ordered(*comparator, &lhs, &rhs, "float comparator")
        }
        FilterEntry::String {
            lhs,
            comparator,
            rhs,
        } => {
            let lhs = lhs.get(store).await?;
            let rhs = rhs.get(store).await?;
            match comparator {
                Comparator::Contains => Ok(lhs.contains(rhs.as_str())),
                Comparator::StartsWith => Ok(lhs.starts_with(rhs.as_str())),
                Comparator::EndsWith => Ok(lhs.ends_with(rhs.as_str())),
                other => compare_equality(*other, &lhs, &rhs, "string comparator"),
            }
        }
        FilterEntry::Unknown => Err(EncounterError::unrecognized("filter entry type", "unknown")),
    }
}

fn compare_equality<T: PartialEq>(
    comparator: Comparator,
    lhs: &T,
    rhs: &T,
    category: &'static str,
) -> Result<bool, EncounterError> {
    match comparator {
        Comparator::Equal => Ok(lhs == rhs),
        Comparator::NotEqual => Ok(lhs != rhs),
        other => Err(EncounterError::unrecognized(category, format!("{other:?}"))),
    }
}

fn compare_ordered<T: PartialOrd>(
    comparator: Comparator,
    lhs: &T,
    rhs: &T,
    category: &'static str,
) -> Result<bool, EncounterError> {
    match comparator {
        Comparator::Less => Ok(lhs < rhs),
        Comparator::LessOrEqual => Ok(lhs <= rhs),
        Comparator::Greater => Ok(lhs > rhs),
        Comparator::GreaterOrEqual => Ok(lhs >= rhs),
        other => compare_equality(other, lhs, rhs, category),
    }
}
