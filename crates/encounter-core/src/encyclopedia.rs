//! Encyclopedia abstractions.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::EncounterError;

/// One encyclopedia entry unlocked by an encounter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncyclopediaArticle {
    /// Entry identifier. Appended copies always receive a fresh one.
    pub id: Uuid,
    /// Grouping shown by the codex UI.
    #[serde(default)]
    pub category: String,
    /// Entry title.
    pub title: String,
    /// Entry body text.
    #[serde(default)]
    pub body: String,
}

/// The player's encyclopedia.
#[async_trait]
pub trait EncyclopediaRepository: Send + Sync {
    /// Appends an article. Duplicates are the caller's concern.
    async fn append(&self, article: EncyclopediaArticle) -> Result<(), EncounterError>;
}
