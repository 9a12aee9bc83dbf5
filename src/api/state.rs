use std::sync::Arc;

use tokio::sync::RwLock;

use crate::{
    error::AppResult,
    services::{catalog::CatalogSnapshot, recommender::RecommendationSettings, sources::CatalogSource},
};

/// Shared application state
///
/// The snapshot sits behind an `Arc` that handlers clone before scoring, so a
/// reload swaps in a new snapshot without disturbing requests already running
/// against the old one.
#[derive(Clone)]
pub struct AppState {
    snapshot: Arc<RwLock<Arc<CatalogSnapshot>>>,
    source: Arc<dyn CatalogSource>,
    pub settings: RecommendationSettings,
}

impl AppState {
    /// Creates state around an already-loaded snapshot
    pub fn new(
        snapshot: CatalogSnapshot,
        source: Arc<dyn CatalogSource>,
        settings: RecommendationSettings,
    ) -> Self {
        Self {
            snapshot: Arc::new(RwLock::new(Arc::new(snapshot))),
            source,
            settings,
        }
    }

    /// Loads the first snapshot from `source`
    pub async fn load(source: Arc<dyn CatalogSource>, settings: RecommendationSettings) -> AppResult<Self> {
        let snapshot = source.load().await?;
        Ok(Self::new(snapshot, source, settings))
    }

    /// Current snapshot
    pub async fn snapshot(&self) -> Arc<CatalogSnapshot> {
        self.snapshot.read().await.clone()
    }

    /// Loads a new snapshot from the source and makes it current
    ///
    /// On failure the current snapshot stays in place.
    pub async fn reload(&self) -> AppResult<Arc<CatalogSnapshot>> {
        let fresh = Arc::new(self.source.load().await?);
        *self.snapshot.write().await = fresh.clone();

        tracing::info!(
            source = self.source.name(),
            books = fresh.books().len(),
            borrow_records = fresh.records().len(),
            "Catalog snapshot reloaded"
        );
        Ok(fresh)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::models::Book;
    use crate::services::sources::MockCatalogSource;

    fn snapshot_with(titles: &[&str]) -> CatalogSnapshot {
        let books = titles
            .iter()
            .enumerate()
            .map(|(i, title)| Book::new(i.to_string(), *title, "Author", "Fiction"))
            .collect();
        CatalogSnapshot::new(books, vec![]).unwrap()
    }

    #[tokio::test]
    async fn test_reload_swaps_snapshot_but_keeps_held_one() {
        let mut source = MockCatalogSource::new();
        source
            .expect_load()
            .times(1)
            .returning(|| Ok(snapshot_with(&["New A", "New B"])));
        source.expect_name().return_const("mock");

        let state = AppState::new(
            snapshot_with(&["Old"]),
            Arc::new(source),
            RecommendationSettings::default(),
        );

        let held = state.snapshot().await;
        let reloaded = tokio_test::assert_ok!(state.reload().await);

        assert_eq!(held.books().len(), 1);
        assert_eq!(reloaded.books().len(), 2);
        assert_eq!(state.snapshot().await.books().len(), 2);
    }

    #[tokio::test]
    async fn test_failed_reload_keeps_current_snapshot() {
        let mut source = MockCatalogSource::new();
        source
            .expect_load()
            .returning(|| Err(AppError::Internal("source offline".to_string())));

        let state = AppState::new(
            snapshot_with(&["Old"]),
            Arc::new(source),
            RecommendationSettings::default(),
        );

        assert!(state.reload().await.is_err());
        assert_eq!(state.snapshot().await.books()[0].title, "Old");
    }
}
