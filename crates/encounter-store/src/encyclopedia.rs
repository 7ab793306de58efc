//! In-memory `EncyclopediaRepository`.

use std::sync::RwLock;

use async_trait::async_trait;
use encounter_core::encyclopedia::{EncyclopediaArticle, EncyclopediaRepository};
use encounter_core::error::EncounterError;
use tracing::debug;

/// Keeps appended articles in arrival order.
#[derive(Debug, Default)]
pub struct MemoryEncyclopedia {
    articles: RwLock<Vec<EncyclopediaArticle>>,
}

impl MemoryEncyclopedia {
    /// Creates an empty encyclopedia.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns every article appended so far.
    ///
    /// # Errors
    ///
    /// Returns `EncounterError::ResolutionFailure` if the lock is poisoned.
    pub fn articles(&self) -> Result<Vec<EncyclopediaArticle>, EncounterError> {
        self.articles
            .read()
            .map(|a| a.clone())
            .map_err(|_| EncounterError::ResolutionFailure("encyclopedia lock poisoned".into()))
    }
}

#[async_trait]
impl EncyclopediaRepository for MemoryEncyclopedia {
    async fn append(&self, article: EncyclopediaArticle) -> Result<(), EncounterError> {
        debug!(article_id = %article.id, title = %article.title, "encyclopedia article unlocked");
        self.articles
            .write()
            .map_err(|_| EncounterError::ResolutionFailure("encyclopedia lock poisoned".into()))?
            .push(article);
        Ok(())
    }
}
