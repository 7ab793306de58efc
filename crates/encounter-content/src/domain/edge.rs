//! Edge ordering shared by every edged node kind.
//!
//! Edges are always consumed sorted by `index`, with ignored edges removed
//! before any evaluation takes place.

use serde::{Deserialize, Serialize};

/// Fields common to every edge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeHeader {
    /// Stable edge identifier.
    pub id: String,
    /// Evaluation and display order.
    #[serde(default)]
    pub index: i32,
    /// Excluded from evaluation when set.
    #[serde(default)]
    pub ignore: bool,
}

impl EdgeHeader {
    /// Creates a header for an active edge.
    #[must_use]
    pub fn new(id: impl Into<String>, index: i32) -> Self {
        Self {
            id: id.into(),
            index,
            ignore: false,
        }
    }
}

/// An exit from an edged node.
pub trait Edge {
    /// Returns the shared edge fields.
    fn header(&self) -> &EdgeHeader;

    /// Returns the shared edge fields mutably.
    fn header_mut(&mut self) -> &mut EdgeHeader;

    /// Returns the edge identifier.
    fn id(&self) -> &str {
        &self.header().id
    }
}

macro_rules! impl_edge {
    ($($edge:ty),+ $(,)?) => {
        $(
            impl $crate::domain::edge::Edge for $edge {
                fn header(&self) -> &$crate::domain::edge::EdgeHeader {
                    &self.header
                }

                fn header_mut(&mut self) -> &mut $crate::domain::edge::EdgeHeader {
                    &mut self.header
                }
            }
        )+
    };
}

pub(crate) use impl_edge;

/// Returns the non-ignored edges sorted by `index`.
///
/// The sort is stable: edges sharing an index keep their authored order.
#[must_use]
pub fn ordered_edges<E: Edge>(edges: &[E]) -> Vec<&E> {
    let mut ordered: Vec<&E> = edges.iter().filter(|e| !e.header().ignore).collect();
    ordered.sort_by_key(|e| e.header().index);
    ordered
}

/// Removes the edge with `id` and renumbers the survivors `0..n`.
///
/// Survivors keep their relative order. Returns the removed edge, if any.
pub fn remove_edge<E: Edge>(edges: &mut Vec<E>, id: &str) -> Option<E> {
    let position = edges.iter().position(|e| e.id() == id)?;
    let removed = edges.remove(position);
    reindex(edges);
    Some(removed)
}

/// Renumbers edges `0..n` in their current index order.
#[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
pub fn reindex<E: Edge>(edges: &mut [E]) {
    edges.sort_by_key(|e| e.header().index);
    for (i, edge) in edges.iter_mut().enumerate() {
        edge.header_mut().index = i as i32;
    }
}
